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

//! The low-level state interface of a graphics context.

use crate::renderer::api::{
    AttributeType, EnableFlags, FrontFace, IndexFormat, PrimitiveTopology,
};
use crate::renderer::traits::{BufferId, GpuBuffer, Pipeline};
use std::fmt::Debug;
use std::rc::Rc;

/// Where one channel of per-vertex data is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributePointer {
    /// The buffer holding the data.
    pub buffer: BufferId,
    /// Components per vertex.
    pub n_components: u8,
    /// The type of each component.
    pub attribute_type: AttributeType,
    /// Bytes between consecutive vertices. `0` means tightly packed.
    pub stride: usize,
    /// Byte address of the first vertex: the bound buffer's base plus the attribute offset.
    pub offset: u64,
}

/// Where the indices of an indexed draw are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexPointer {
    /// The buffer holding the indices.
    pub buffer: BufferId,
    /// Byte address of the first index to draw.
    pub offset: u64,
}

/// The calls a draw context issues against the underlying graphics API.
///
/// Implementations translate each call directly; all caching of what is currently
/// enabled lives in the draw context, so a driver never has to diff state itself.
pub trait GraphicsDriver: Debug {
    /// Submits any batched geometry recorded ahead of the current draw.
    fn flush_journal(&mut self);

    /// Flushes framebuffer state, including the clip stack.
    ///
    /// Flushing the clip stack may itself draw, so this must run before any
    /// vertex pointer of the next draw is set.
    fn flush_framebuffer_state(&mut self);

    /// Sets the fixed-function position pointer.
    fn set_vertex_pointer(&mut self, pointer: &AttributePointer);

    /// Sets the fixed-function color pointer.
    fn set_color_pointer(&mut self, pointer: &AttributePointer);

    /// Sets the fixed-function normal pointer.
    fn set_normal_pointer(&mut self, pointer: &AttributePointer);

    /// Enables or disables the fixed-function normal array.
    fn set_normal_array_enabled(&mut self, enabled: bool);

    /// Sets the texture coordinate pointer of a texture unit.
    fn set_tex_coord_pointer(&mut self, unit: u32, pointer: &AttributePointer);

    /// Enables or disables the texture coordinate array of a texture unit.
    fn set_tex_coord_array_enabled(&mut self, unit: u32, enabled: bool);

    /// Sets the pointer of a generic attribute array.
    fn set_generic_pointer(&mut self, index: u32, pointer: &AttributePointer, normalized: bool);

    /// Enables or disables a generic attribute array.
    fn set_generic_array_enabled(&mut self, index: u32, enabled: bool);

    /// Flushes the complete state of `pipeline`.
    ///
    /// `skip_color` is `true` when per-vertex colors are supplied, in which case
    /// the pipeline's constant color must not be set.
    fn flush_pipeline(&mut self, pipeline: &dyn Pipeline, skip_color: bool);

    /// Turns a single capability on or off.
    fn set_capability(&mut self, capability: EnableFlags, enabled: bool);

    /// Sets the front-face winding order.
    fn set_front_face(&mut self, front_face: FrontFace);

    /// Draws `n_vertices` vertices starting at `first_vertex`.
    fn draw_arrays(&mut self, topology: PrimitiveTopology, first_vertex: u32, n_vertices: u32);

    /// Draws `n_indices` indices read from `indices`.
    fn draw_elements(
        &mut self,
        topology: PrimitiveTopology,
        n_indices: u32,
        format: IndexFormat,
        indices: &IndexPointer,
    );

    /// Creates a new pipeline with default state.
    fn create_pipeline(&mut self) -> Box<dyn Pipeline>;

    /// Creates a vertex buffer initialized with `data`.
    fn create_vertex_array(&mut self, data: &[u8]) -> Rc<dyn GpuBuffer>;
}
