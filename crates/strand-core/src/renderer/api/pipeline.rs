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

//! Data structures exchanged with pipelines when a draw flushes its state.

use crate::math::LinearRgba;
use crate::strand_bitflags;

/// How a pipeline decides whether alpha blending is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendEnable {
    /// Blending is always on.
    Enabled,
    /// Blending is always off.
    Disabled,
    /// Blending is on only when the pipeline's state can produce translucent output.
    #[default]
    Automatic,
}

strand_bitflags! {
    /// Overrides a draw asks to be applied to a derived copy of the active pipeline.
    pub struct FlushFlags: u32 {
        /// Substitute the fallback texture on the layers in `fallback_layers`.
        const FALLBACK_MASK = 1 << 0;
        /// Disable texturing on the layers in `disable_layers`.
        const DISABLE_MASK = 1 << 1;
    }
}

/// The overrides accumulated for one draw.
///
/// Bit `n` of a layer mask refers to the `n`-th layer of the pipeline in layer
/// order, which is also the texture unit the layer is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PipelineFlushOptions {
    /// Which of the masks below are meaningful.
    pub flags: FlushFlags,
    /// Layers whose texture must be replaced by the fallback texture.
    pub fallback_layers: u32,
    /// Layers whose texturing must be disabled.
    pub disable_layers: u32,
}

impl PipelineFlushOptions {
    /// Returns `true` if no override is requested.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

strand_bitflags! {
    /// Context capabilities toggled around every draw.
    pub struct EnableFlags: u32 {
        /// The fixed-function position array.
        const VERTEX_ARRAY = 1 << 0;
        /// The fixed-function color array.
        const COLOR_ARRAY = 1 << 1;
        /// Back-face culling.
        const BACKFACE_CULLING = 1 << 2;
    }
}

impl EnableFlags {
    /// Every capability, in the order a driver is told about changes.
    pub const ALL_CAPABILITIES: [EnableFlags; 3] = [
        EnableFlags::VERTEX_ARRAY,
        EnableFlags::COLOR_ARRAY,
        EnableFlags::BACKFACE_CULLING,
    ];
}

/// Fog parameters set through the deprecated per-context API.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    /// The fog color.
    pub color: LinearRgba,
    /// The exponential fog density.
    pub density: f32,
}

/// Deprecated per-context state that every pipeline drawn in the context must honour.
///
/// When any field is set the draw has to derive a copy of the active pipeline to
/// apply it, since the caller's pipeline is never modified.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LegacyState {
    /// Forces depth testing on or off.
    pub depth_test: Option<bool>,
    /// Enables fog.
    pub fog: Option<Fog>,
}

impl LegacyState {
    /// Returns `true` if any legacy override is set.
    pub fn is_set(&self) -> bool {
        self.depth_test.is_some() || self.fog.is_some()
    }
}
