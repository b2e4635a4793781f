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

//! Per-layer validation of a pipeline before a buffer-based draw.

use crate::renderer::{FlushFlags, Pipeline, PipelineFlushOptions};

/// The transient state of validating the layers of one pipeline for one draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerValidation {
    /// The position of the next layer to validate, which is also its texture unit.
    pub unit: u32,
    /// The overrides requested so far.
    pub options: PipelineFlushOptions,
}

impl LayerValidation {
    /// Starts a validation at unit 0 with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every layer of `pipeline` in layer order.
    pub fn validate_layers(pipeline: &dyn Pipeline) -> Self {
        let mut state = Self::new();
        pipeline.foreach_layer(&mut |layer_index| state.validate_layer(pipeline, layer_index));
        state
    }

    /// Validates one layer and always asks to continue with the next one.
    ///
    /// The texture of the layer is told it is about to be used with arbitrary
    /// geometry, which lets atlased textures migrate to a texture of their own.
    /// If the texture still cannot repeat in hardware afterwards, the layer is
    /// marked for fallback substitution.
    pub fn validate_layer(&mut self, pipeline: &dyn Pipeline, layer_index: u32) -> bool {
        if let Some(texture) = pipeline.layer_texture(layer_index) {
            texture.notify_non_quad_usage();
            texture.ensure_mip_preparation();

            if !texture.supports_hardware_repeat() {
                log::warn!(
                    "Disabling layer {layer_index} of the current source pipeline: sliced textures \
                     and textures with waste cannot be drawn from vertex buffers"
                );
                if let Some(bit) = 1u32.checked_shl(self.unit) {
                    self.options.fallback_layers |= bit;
                }
                self.options.flags.insert(FlushFlags::FALLBACK_MASK);
            }
        }

        self.unit += 1;
        true
    }

    /// Returns `true` if any layer asked for a pipeline override.
    pub fn needs_override(&self) -> bool {
        !self.options.is_empty()
    }
}
