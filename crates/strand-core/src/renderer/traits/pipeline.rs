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

//! The contract of a pipeline state object.

use crate::math::LinearRgba;
use crate::renderer::api::{BlendEnable, LegacyState, PipelineFlushOptions};
use crate::renderer::traits::Texture;
use std::any::Any;
use std::fmt::Debug;
use std::rc::Rc;

/// A bundle of shading, texturing and blending state.
///
/// Pipelines are shared as `Rc<dyn Pipeline>` once they have been handed to a
/// context and are never mutated through that handle again. A draw that needs
/// different state calls [`Pipeline::copy`] and mutates the returned box before
/// publishing it.
pub trait Pipeline: Debug {
    /// Returns an independent copy of this pipeline that can be mutated freely.
    fn copy(&self) -> Box<dyn Pipeline>;

    /// Calls `callback` with the index of every layer, in layer order, until it
    /// returns `false`.
    ///
    /// Layer indices are sparse; their position in the iteration is what decides
    /// the texture unit a layer is bound to.
    fn foreach_layer(&self, callback: &mut dyn FnMut(u32) -> bool);

    /// Returns the texture of the layer with the given index, if it has one.
    fn layer_texture(&self, layer_index: u32) -> Option<Rc<dyn Texture>>;

    /// Returns `true` if blending will really be enabled when this pipeline is flushed.
    ///
    /// This resolves [`BlendEnable::Automatic`] against the rest of the state.
    fn real_blend_enabled(&self) -> bool;

    /// Sets how blending is decided.
    fn set_blend_enabled(&mut self, enable: BlendEnable);

    /// Sets the constant color used when no per-vertex color is supplied.
    fn set_color(&mut self, color: LinearRgba);

    /// Applies the overrides a draw accumulated (fallback or disabled layers).
    fn apply_overrides(&mut self, options: &PipelineFlushOptions);

    /// Applies deprecated per-context state.
    fn apply_legacy_state(&mut self, state: &LegacyState);

    /// Returns the pipeline as `Any`, so backends can reach their concrete type.
    fn as_any(&self) -> &dyn Any;
}
