// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Buffers kept in host memory.

use bytemuck::Pod;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use strand_core::renderer::{
    BoundBuffer, BufferAccess, BufferBindTarget, BufferId, GpuBuffer, MappedBytes,
    PreconditionViolation, ResourceError,
};

static NEXT_BUFFER_ID: AtomicUsize = AtomicUsize::new(1);

/// A buffer whose contents live in a `Vec<u8>`.
///
/// A buffer created with [`HostBuffer::client_side`] reports the address of its
/// storage as its bind base, the way client-memory arrays behave. Otherwise the
/// base is `0`, as for GPU-resident buffers.
#[derive(Debug)]
pub struct HostBuffer {
    id: BufferId,
    data: RefCell<Vec<u8>>,
    client_side: bool,
    bound: Cell<Option<BufferBindTarget>>,
    mapped: Cell<bool>,
    pins: Cell<u32>,
    bind_count: Cell<u32>,
    map_count: Cell<u32>,
}

impl HostBuffer {
    /// Creates a buffer holding `data`.
    pub fn new(data: Vec<u8>) -> Rc<Self> {
        Rc::new(Self::with_storage(data, false))
    }

    /// Creates a buffer holding a copy of `values`.
    pub fn from_pod<T: Pod>(values: &[T]) -> Rc<Self> {
        Self::new(bytemuck::cast_slice(values).to_vec())
    }

    /// Creates a buffer whose bind base is the address of its storage.
    pub fn client_side(data: Vec<u8>) -> Rc<Self> {
        Rc::new(Self::with_storage(data, true))
    }

    fn with_storage(data: Vec<u8>, client_side: bool) -> Self {
        Self {
            id: BufferId(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed)),
            data: RefCell::new(data),
            client_side,
            bound: Cell::new(None),
            mapped: Cell::new(false),
            pins: Cell::new(0),
            bind_count: Cell::new(0),
            map_count: Cell::new(0),
        }
    }

    /// Returns a copy of the contents.
    pub fn contents(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }

    /// Returns the target the buffer is currently bound to, if any.
    pub fn bound_target(&self) -> Option<BufferBindTarget> {
        self.bound.get()
    }

    /// Returns `true` while a mapping is outstanding.
    pub fn is_mapped(&self) -> bool {
        self.mapped.get()
    }

    /// The number of times the buffer has been bound.
    pub fn bind_count(&self) -> u32 {
        self.bind_count.get()
    }

    /// The number of times the buffer has been mapped.
    pub fn map_count(&self) -> u32 {
        self.map_count.get()
    }
}

impl GpuBuffer for HostBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn size(&self) -> usize {
        self.data.borrow().len()
    }

    fn bind(&self, target: BufferBindTarget) -> BoundBuffer {
        if let Some(previous) = self.bound.replace(Some(target)) {
            log::warn!("Buffer {:?} bound to {target:?} while still bound to {previous:?}", self.id);
        }
        self.bind_count.set(self.bind_count.get() + 1);
        let base = if self.client_side {
            self.data.borrow().as_ptr() as u64
        } else {
            0
        };
        BoundBuffer { id: self.id, base }
    }

    fn unbind(&self) {
        if self.bound.take().is_none() {
            log::warn!("Buffer {:?} unbound while not bound", self.id);
        }
    }

    fn map(&self, access: BufferAccess) -> Result<MappedBytes<'_>, ResourceError> {
        if access != BufferAccess::Read {
            return Err(ResourceError::MapFailed {
                reason: format!("{access:?} mappings are not supported by host buffers"),
            });
        }
        if self.mapped.replace(true) {
            return Err(ResourceError::MapFailed {
                reason: format!("buffer {:?} is already mapped", self.id),
            });
        }
        self.map_count.set(self.map_count.get() + 1);
        Ok(Box::new(Ref::map(self.data.borrow(), |data| data.as_slice())))
    }

    fn unmap(&self) {
        self.mapped.set(false);
    }

    fn immutable_ref(&self) {
        self.pins.set(self.pins.get() + 1);
    }

    fn immutable_unref(&self) -> Result<(), PreconditionViolation> {
        let pins = self.pins.get();
        if pins == 0 {
            return Err(PreconditionViolation::ImmutableRefUnderflow {
                name: format!("buffer {}", self.id.0),
            });
        }
        self.pins.set(pins - 1);
        Ok(())
    }

    fn immutable_ref_count(&self) -> u32 {
        self.pins.get()
    }
}
