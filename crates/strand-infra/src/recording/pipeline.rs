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

//! A plain pipeline object storing its state as data.

use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;
use strand_core::math::LinearRgba;
use strand_core::renderer::{BlendEnable, LegacyState, Pipeline, PipelineFlushOptions, Texture};

/// Pipeline state kept as plain data, with layers ordered by index.
#[derive(Debug, Clone, Default)]
pub struct BasicPipeline {
    layers: BTreeMap<u32, Option<Rc<dyn Texture>>>,
    blend: BlendEnable,
    color: LinearRgba,
    overrides: Option<PipelineFlushOptions>,
    legacy_state: Option<LegacyState>,
}

impl BasicPipeline {
    /// An opaque white pipeline without layers and with automatic blending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the layer with the given index.
    pub fn with_layer(mut self, index: u32, texture: Option<Rc<dyn Texture>>) -> Self {
        self.layers.insert(index, texture);
        self
    }

    /// Sets the blend mode.
    pub fn with_blend(mut self, blend: BlendEnable) -> Self {
        self.blend = blend;
        self
    }

    /// Sets the constant color.
    pub fn with_color(mut self, color: LinearRgba) -> Self {
        self.color = color;
        self
    }

    /// The configured blend mode, before resolving [`BlendEnable::Automatic`].
    pub fn blend(&self) -> BlendEnable {
        self.blend
    }

    /// The constant color.
    pub fn color(&self) -> LinearRgba {
        self.color
    }

    /// The overrides last applied to this pipeline.
    pub fn overrides(&self) -> Option<&PipelineFlushOptions> {
        self.overrides.as_ref()
    }

    /// The legacy state last applied to this pipeline.
    pub fn legacy_state(&self) -> Option<&LegacyState> {
        self.legacy_state.as_ref()
    }

    /// Returns `true` if the layer at `position` (not index) is textured after
    /// overrides are taken into account.
    pub fn layer_enabled_at(&self, position: u32) -> bool {
        let Some(options) = &self.overrides else {
            return true;
        };
        position >= 32 || options.disable_layers & (1 << position) == 0
    }
}

impl Pipeline for BasicPipeline {
    fn copy(&self) -> Box<dyn Pipeline> {
        Box::new(self.clone())
    }

    fn foreach_layer(&self, callback: &mut dyn FnMut(u32) -> bool) {
        for index in self.layers.keys() {
            if !callback(*index) {
                break;
            }
        }
    }

    fn layer_texture(&self, layer_index: u32) -> Option<Rc<dyn Texture>> {
        self.layers.get(&layer_index).cloned().flatten()
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
        self.legacy_state = Some(*state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
