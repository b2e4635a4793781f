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

//! A graphics driver that records every call it receives.

use super::buffer::HostBuffer;
use super::pipeline::BasicPipeline;
use std::cell::RefCell;
use std::rc::Rc;
use strand_core::math::LinearRgba;
use strand_core::renderer::{
    AttributePointer, BufferId, EnableFlags, FrontFace, GpuBuffer, GraphicsDriver, IndexFormat,
    IndexPointer, LegacyState, Pipeline, PipelineFlushOptions, PrimitiveTopology,
};

/// What a pipeline looked like when it was flushed.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSnapshot {
    /// The address of the flushed pipeline, for identity comparisons.
    pub address: usize,
    /// Whether per-vertex colors replaced the constant color.
    pub skip_color: bool,
    /// Whether blending was really enabled.
    pub blend_enabled: bool,
    /// The constant color, for [`BasicPipeline`]s.
    pub color: Option<LinearRgba>,
    /// The overrides applied, for [`BasicPipeline`]s.
    pub overrides: Option<PipelineFlushOptions>,
    /// The legacy state applied, for [`BasicPipeline`]s.
    pub legacy_state: Option<LegacyState>,
}

/// Returns the address of `pipeline`, as recorded in [`PipelineSnapshot::address`].
pub fn pipeline_address(pipeline: &dyn Pipeline) -> usize {
    pipeline as *const dyn Pipeline as *const () as usize
}

/// One call received by a [`RecordingDriver`].
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum DriverCall {
    FlushJournal,
    FlushFramebufferState,
    SetVertexPointer(AttributePointer),
    SetColorPointer(AttributePointer),
    SetNormalPointer(AttributePointer),
    SetNormalArrayEnabled(bool),
    SetTexCoordPointer {
        unit: u32,
        pointer: AttributePointer,
    },
    SetTexCoordArrayEnabled {
        unit: u32,
        enabled: bool,
    },
    SetGenericPointer {
        index: u32,
        pointer: AttributePointer,
        normalized: bool,
    },
    SetGenericArrayEnabled {
        index: u32,
        enabled: bool,
    },
    FlushPipeline(PipelineSnapshot),
    SetCapability {
        capability: EnableFlags,
        enabled: bool,
    },
    SetFrontFace(FrontFace),
    DrawArrays {
        topology: PrimitiveTopology,
        first_vertex: u32,
        n_vertices: u32,
    },
    DrawElements {
        topology: PrimitiveTopology,
        n_indices: u32,
        format: IndexFormat,
        indices: IndexPointer,
    },
    CreatePipeline,
    CreateVertexArray {
        buffer: BufferId,
        data: Vec<u8>,
    },
}

impl DriverCall {
    /// Returns `true` for the two draw calls.
    pub fn is_draw(&self) -> bool {
        matches!(self, DriverCall::DrawArrays { .. } | DriverCall::DrawElements { .. })
    }
}

/// A shared, append-only log of driver calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<DriverCall>>>);

impl CallLog {
    fn push(&self, call: DriverCall) {
        log::trace!("{call:?}");
        self.0.borrow_mut().push(call);
    }

    /// A copy of every call recorded so far.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.0.borrow().clone()
    }

    /// Forgets every call recorded so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// The recorded draw calls.
    pub fn draws(&self) -> Vec<DriverCall> {
        self.filter(DriverCall::is_draw)
    }

    /// The snapshots of every flushed pipeline.
    pub fn flushed_pipelines(&self) -> Vec<PipelineSnapshot> {
        self.0
            .borrow()
            .iter()
            .filter_map(|call| match call {
                DriverCall::FlushPipeline(snapshot) => Some(snapshot.clone()),
                _ => None,
            })
            .collect()
    }

    /// The recorded calls matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&DriverCall) -> bool) -> Vec<DriverCall> {
        self.0
            .borrow()
            .iter()
            .filter(|call| predicate(*call))
            .cloned()
            .collect()
    }

    /// The number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&DriverCall) -> bool) -> usize {
        self.0.borrow().iter().filter(|call| predicate(*call)).count()
    }
}

/// A [`GraphicsDriver`] that executes nothing and records everything.
///
/// Pipelines it creates are [`BasicPipeline`]s and vertex arrays are
/// [`HostBuffer`]s.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    log: CallLog,
}

impl RecordingDriver {
    /// Creates a driver and returns it with a handle to its call log.
    pub fn new() -> (Self, CallLog) {
        let driver = Self::default();
        let log = driver.log.clone();
        (driver, log)
    }
}

impl GraphicsDriver for RecordingDriver {
    fn flush_journal(&mut self) {
        self.log.push(DriverCall::FlushJournal);
    }

    fn flush_framebuffer_state(&mut self) {
        self.log.push(DriverCall::FlushFramebufferState);
    }

    fn set_vertex_pointer(&mut self, pointer: &AttributePointer) {
        self.log.push(DriverCall::SetVertexPointer(*pointer));
    }

    fn set_color_pointer(&mut self, pointer: &AttributePointer) {
        self.log.push(DriverCall::SetColorPointer(*pointer));
    }

    fn set_normal_pointer(&mut self, pointer: &AttributePointer) {
        self.log.push(DriverCall::SetNormalPointer(*pointer));
    }

    fn set_normal_array_enabled(&mut self, enabled: bool) {
        self.log.push(DriverCall::SetNormalArrayEnabled(enabled));
    }

    fn set_tex_coord_pointer(&mut self, unit: u32, pointer: &AttributePointer) {
        self.log.push(DriverCall::SetTexCoordPointer {
            unit,
            pointer: *pointer,
        });
    }

    fn set_tex_coord_array_enabled(&mut self, unit: u32, enabled: bool) {
        self.log
            .push(DriverCall::SetTexCoordArrayEnabled { unit, enabled });
    }

    fn set_generic_pointer(&mut self, index: u32, pointer: &AttributePointer, normalized: bool) {
        self.log.push(DriverCall::SetGenericPointer {
            index,
            pointer: *pointer,
            normalized,
        });
    }

    fn set_generic_array_enabled(&mut self, index: u32, enabled: bool) {
        self.log
            .push(DriverCall::SetGenericArrayEnabled { index, enabled });
    }

    fn flush_pipeline(&mut self, pipeline: &dyn Pipeline, skip_color: bool) {
        let basic = pipeline.as_any().downcast_ref::<BasicPipeline>();
        self.log.push(DriverCall::FlushPipeline(PipelineSnapshot {
            address: pipeline_address(pipeline),
            skip_color,
            blend_enabled: pipeline.real_blend_enabled(),
            color: basic.map(BasicPipeline::color),
            overrides: basic.and_then(|p| p.overrides().copied()),
            legacy_state: basic.and_then(|p| p.legacy_state().copied()),
        }));
    }

    fn set_capability(&mut self, capability: EnableFlags, enabled: bool) {
        self.log.push(DriverCall::SetCapability {
            capability,
            enabled,
        });
    }

    fn set_front_face(&mut self, front_face: FrontFace) {
        self.log.push(DriverCall::SetFrontFace(front_face));
    }

    fn draw_arrays(&mut self, topology: PrimitiveTopology, first_vertex: u32, n_vertices: u32) {
        self.log.push(DriverCall::DrawArrays {
            topology,
            first_vertex,
            n_vertices,
        });
    }

    fn draw_elements(
        &mut self,
        topology: PrimitiveTopology,
        n_indices: u32,
        format: IndexFormat,
        indices: &IndexPointer,
    ) {
        self.log.push(DriverCall::DrawElements {
            topology,
            n_indices,
            format,
            indices: *indices,
        });
    }

    fn create_pipeline(&mut self) -> Box<dyn Pipeline> {
        self.log.push(DriverCall::CreatePipeline);
        Box::new(BasicPipeline::new())
    }

    fn create_vertex_array(&mut self, data: &[u8]) -> Rc<dyn GpuBuffer> {
        let buffer = HostBuffer::new(data.to_vec());
        self.log.push(DriverCall::CreateVertexArray {
            buffer: buffer.id(),
            data: data.to_vec(),
        });
        buffer
    }
}
