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

//! In-memory collaborators for unit tests.

use crate::math::LinearRgba;
use crate::renderer::{
    AttributePointer, AttributeType, BlendEnable, BoundBuffer, BufferAccess, BufferBindTarget,
    BufferId, EnableFlags, FrontFace, GpuBuffer, GraphicsDriver, IndexFormat, IndexPointer,
    LegacyState, MappedBytes, Pipeline, PipelineFlushOptions, PreconditionViolation,
    PrimitiveTopology, ResourceError, Texture,
};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_BUFFER_ID: AtomicUsize = AtomicUsize::new(1);

#[derive(Debug)]
pub(crate) struct MockBuffer {
    id: BufferId,
    data: RefCell<Vec<u8>>,
    pub base: u64,
    pins: Cell<u32>,
    pub binds: Cell<u32>,
    pub unbinds: Cell<u32>,
    mapped: Cell<bool>,
    pub unmaps: Cell<u32>,
}

impl MockBuffer {
    pub fn from_bytes(data: Vec<u8>) -> Rc<Self> {
        Self::with_base(data, 0)
    }

    pub fn with_base(data: Vec<u8>, base: u64) -> Rc<Self> {
        Rc::new(Self {
            id: BufferId(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed)),
            data: RefCell::new(data),
            base,
            pins: Cell::new(0),
            binds: Cell::new(0),
            unbinds: Cell::new(0),
            mapped: Cell::new(false),
            unmaps: Cell::new(0),
        })
    }

    pub fn with_size(size: usize) -> Rc<Self> {
        Self::from_bytes(vec![0; size])
    }

    pub fn from_floats(values: &[f32]) -> Rc<Self> {
        Self::from_bytes(bytemuck::cast_slice(values).to_vec())
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped.get()
    }
}

impl GpuBuffer for MockBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn size(&self) -> usize {
        self.data.borrow().len()
    }

    fn bind(&self, _target: BufferBindTarget) -> BoundBuffer {
        self.binds.set(self.binds.get() + 1);
        BoundBuffer {
            id: self.id,
            base: self.base,
        }
    }

    fn unbind(&self) {
        self.unbinds.set(self.unbinds.get() + 1);
    }

    fn map(&self, _access: BufferAccess) -> Result<MappedBytes<'_>, ResourceError> {
        if self.mapped.replace(true) {
            return Err(ResourceError::MapFailed {
                reason: "already mapped".to_string(),
            });
        }
        Ok(Box::new(std::cell::Ref::map(self.data.borrow(), |v| {
            v.as_slice()
        })))
    }

    fn unmap(&self) {
        self.mapped.set(false);
        self.unmaps.set(self.unmaps.get() + 1);
    }

    fn immutable_ref(&self) {
        self.pins.set(self.pins.get() + 1);
    }

    fn immutable_unref(&self) -> Result<(), PreconditionViolation> {
        match self.pins.get() {
            0 => Err(PreconditionViolation::ImmutableRefUnderflow {
                name: format!("buffer {}", self.id.0),
            }),
            n => {
                self.pins.set(n - 1);
                Ok(())
            }
        }
    }

    fn immutable_ref_count(&self) -> u32 {
        self.pins.get()
    }
}

/// A texture that may or may not survive migration out of an atlas.
#[derive(Debug, Default)]
pub(crate) struct MockTexture {
    pub repeat: bool,
    pub notified: Cell<u32>,
    pub mip_prepared: Cell<u32>,
}

impl MockTexture {
    pub fn new(repeat: bool) -> Rc<Self> {
        Rc::new(Self {
            repeat,
            ..Default::default()
        })
    }
}

impl Texture for MockTexture {
    fn notify_non_quad_usage(&self) {
        self.notified.set(self.notified.get() + 1);
    }

    fn ensure_mip_preparation(&self) {
        self.mip_prepared.set(self.mip_prepared.get() + 1);
    }

    fn supports_hardware_repeat(&self) -> bool {
        self.repeat
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockPipeline {
    pub layers: Vec<(u32, Option<Rc<dyn Texture>>)>,
    pub blend: BlendEnable,
    pub color: LinearRgba,
    pub overrides: Option<PipelineFlushOptions>,
    pub legacy: Option<LegacyState>,
}

impl MockPipeline {
    pub fn with_blend(blend: BlendEnable) -> Self {
        Self {
            blend,
            ..Default::default()
        }
    }
}

impl Pipeline for MockPipeline {
    fn copy(&self) -> Box<dyn Pipeline> {
        Box::new(self.clone())
    }

    fn foreach_layer(&self, callback: &mut dyn FnMut(u32) -> bool) {
        for (index, _) in &self.layers {
            if !callback(*index) {
                break;
            }
        }
    }

    fn layer_texture(&self, layer_index: u32) -> Option<Rc<dyn Texture>> {
        self.layers
            .iter()
            .find(|(index, _)| *index == layer_index)
            .and_then(|(_, texture)| texture.clone())
    }

    fn real_blend_enabled(&self) -> bool {
        match self.blend {
            BlendEnable::Enabled => true,
            BlendEnable::Disabled => false,
            BlendEnable::Automatic => self.color.is_translucent(),
        }
    }

    fn set_blend_enabled(&mut self, enable: BlendEnable) {
        self.blend = enable;
    }

    fn set_color(&mut self, color: LinearRgba) {
        self.color = color;
    }

    fn apply_overrides(&mut self, options: &PipelineFlushOptions) {
        self.overrides = Some(*options);
    }

    fn apply_legacy_state(&mut self, state: &LegacyState) {
        self.legacy = Some(*state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Address of a pipeline, for identity checks against recorded flushes.
pub(crate) fn pipeline_addr(pipeline: &dyn Pipeline) -> usize {
    pipeline as *const dyn Pipeline as *const () as usize
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    FlushJournal,
    FlushFramebuffer,
    VertexPointer(AttributePointer),
    ColorPointer(AttributePointer),
    NormalPointer(AttributePointer),
    NormalArray(bool),
    TexCoordPointer(u32, AttributePointer),
    TexCoordArray(u32, bool),
    GenericPointer(u32, AttributePointer, bool),
    GenericArray(u32, bool),
    FlushPipeline {
        pipeline: usize,
        skip_color: bool,
        blend: bool,
        overrides: Option<PipelineFlushOptions>,
        legacy: Option<LegacyState>,
    },
    Capability(EnableFlags, bool),
    FrontFace(FrontFace),
    DrawArrays(PrimitiveTopology, u32, u32),
    DrawElements(PrimitiveTopology, u32, IndexFormat, IndexPointer),
    CreatePipeline,
    CreateVertexArray(Vec<u8>),
}

pub(crate) type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Debug, Default)]
pub(crate) struct MockDriver {
    pub calls: CallLog,
    pub default_blend: BlendEnable,
}

impl MockDriver {
    pub fn new() -> (Box<Self>, CallLog) {
        let driver = Box::new(Self::default());
        let calls = Rc::clone(&driver.calls);
        (driver, calls)
    }

    fn push(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl GraphicsDriver for MockDriver {
    fn flush_journal(&mut self) {
        self.push(Call::FlushJournal);
    }

    fn flush_framebuffer_state(&mut self) {
        self.push(Call::FlushFramebuffer);
    }

    fn set_vertex_pointer(&mut self, pointer: &AttributePointer) {
        self.push(Call::VertexPointer(*pointer));
    }

    fn set_color_pointer(&mut self, pointer: &AttributePointer) {
        self.push(Call::ColorPointer(*pointer));
    }

    fn set_normal_pointer(&mut self, pointer: &AttributePointer) {
        self.push(Call::NormalPointer(*pointer));
    }

    fn set_normal_array_enabled(&mut self, enabled: bool) {
        self.push(Call::NormalArray(enabled));
    }

    fn set_tex_coord_pointer(&mut self, unit: u32, pointer: &AttributePointer) {
        self.push(Call::TexCoordPointer(unit, *pointer));
    }

    fn set_tex_coord_array_enabled(&mut self, unit: u32, enabled: bool) {
        self.push(Call::TexCoordArray(unit, enabled));
    }

    fn set_generic_pointer(&mut self, index: u32, pointer: &AttributePointer, normalized: bool) {
        self.push(Call::GenericPointer(index, *pointer, normalized));
    }

    fn set_generic_array_enabled(&mut self, index: u32, enabled: bool) {
        self.push(Call::GenericArray(index, enabled));
    }

    fn flush_pipeline(&mut self, pipeline: &dyn Pipeline, skip_color: bool) {
        let mock = pipeline.as_any().downcast_ref::<MockPipeline>();
        self.push(Call::FlushPipeline {
            pipeline: pipeline_addr(pipeline),
            skip_color,
            blend: pipeline.real_blend_enabled(),
            overrides: mock.and_then(|p| p.overrides),
            legacy: mock.and_then(|p| p.legacy),
        });
    }

    fn set_capability(&mut self, capability: EnableFlags, enabled: bool) {
        self.push(Call::Capability(capability, enabled));
    }

    fn set_front_face(&mut self, front_face: FrontFace) {
        self.push(Call::FrontFace(front_face));
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first_vertex: u32, n_vertices: u32) {
        self.push(Call::DrawArrays(topology, first_vertex, n_vertices));
    }

    fn draw_elements(
        &mut self,
        topology: PrimitiveTopology,
        n_indices: u32,
        format: IndexFormat,
        indices: &IndexPointer,
    ) {
        self.push(Call::DrawElements(topology, n_indices, format, *indices));
    }

    fn create_pipeline(&mut self) -> Box<dyn Pipeline> {
        self.push(Call::CreatePipeline);
        Box::new(MockPipeline::with_blend(self.default_blend))
    }

    fn create_vertex_array(&mut self, data: &[u8]) -> Rc<dyn GpuBuffer> {
        self.push(Call::CreateVertexArray(data.to_vec()));
        MockBuffer::from_bytes(data.to_vec())
    }
}

/// A pointer as the flush engine would build it for a float attribute.
pub(crate) fn float_pointer(
    buffer: &MockBuffer,
    n_components: u8,
    stride: usize,
    offset: u64,
) -> AttributePointer {
    AttributePointer {
        buffer: buffer.id(),
        n_components,
        attribute_type: AttributeType::Float,
        stride,
        offset: buffer.base + offset,
    }
}
