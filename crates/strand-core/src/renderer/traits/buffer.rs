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

//! The contract of the shared storage behind vertex attributes and indices.

use crate::renderer::api::{BufferAccess, BufferBindTarget};
use crate::renderer::error::{PreconditionViolation, ResourceError};
use std::fmt::Debug;
use std::ops::Deref;

/// An opaque handle identifying a buffer to the graphics driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// The result of binding a buffer: the driver-side handle plus the base address
/// that attribute and index offsets are relative to.
///
/// GPU-resident buffers report a base of `0`; buffers kept in client memory
/// report wherever their storage starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundBuffer {
    /// The buffer that is now bound.
    pub id: BufferId,
    /// The base address of the buffer's contents.
    pub base: u64,
}

/// Bytes exposed by a mapped buffer. Dropping it does not unmap; use [`MappedBuffer`].
pub type MappedBytes<'a> = Box<dyn Deref<Target = [u8]> + 'a>;

/// A buffer of vertex or index data shared between attributes.
///
/// Buffers are shared through `Rc<dyn GpuBuffer>`: every attribute referencing a
/// buffer holds a strong reference, and the storage is released with the last one.
/// All methods take `&self`; implementations keep their counters in cells, since
/// a buffer is only ever used from the thread that owns its context.
pub trait GpuBuffer: Debug {
    /// Returns the driver-side identity of the buffer.
    fn id(&self) -> BufferId;

    /// Returns the size of the buffer's contents in bytes.
    fn size(&self) -> usize;

    /// Binds the buffer to `target` and returns the base that offsets are relative to.
    fn bind(&self, target: BufferBindTarget) -> BoundBuffer;

    /// Undoes the last [`GpuBuffer::bind`].
    fn unbind(&self);

    /// Maps the buffer's contents for CPU access.
    ///
    /// Every successful call must be paired with [`GpuBuffer::unmap`]. Prefer
    /// [`MappedBuffer::new`], which does the pairing.
    fn map(&self, access: BufferAccess) -> Result<MappedBytes<'_>, ResourceError>;

    /// Ends the current mapping.
    fn unmap(&self);

    /// Pins the buffer as in use by an outstanding draw.
    fn immutable_ref(&self);

    /// Releases one pin taken by [`GpuBuffer::immutable_ref`].
    ///
    /// # Errors
    /// Returns [`PreconditionViolation::ImmutableRefUnderflow`] if the buffer is not pinned.
    fn immutable_unref(&self) -> Result<(), PreconditionViolation>;

    /// Returns the number of outstanding pins.
    fn immutable_ref_count(&self) -> u32;
}

/// A scoped mapping of a buffer. The buffer is unmapped when this value is dropped,
/// on every exit path.
pub struct MappedBuffer<'a> {
    buffer: &'a dyn GpuBuffer,
    bytes: MappedBytes<'a>,
}

impl<'a> MappedBuffer<'a> {
    /// Maps `buffer` with the given access.
    pub fn new(buffer: &'a dyn GpuBuffer, access: BufferAccess) -> Result<Self, ResourceError> {
        let bytes = buffer.map(access)?;
        Ok(Self { buffer, bytes })
    }

    /// Returns the mapped bytes in `offset..offset + len`.
    pub fn read(&self, offset: usize, len: usize) -> Result<&[u8], ResourceError> {
        offset
            .checked_add(len)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(ResourceError::OutOfBounds {
                offset,
                len: self.bytes.len(),
            })
    }
}

impl Deref for MappedBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for MappedBuffer<'_> {
    fn drop(&mut self) {
        self.buffer.unmap();
    }
}

impl Debug for MappedBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedBuffer")
            .field("buffer", &self.buffer.id())
            .field("len", &self.bytes.len())
            .finish()
    }
}
