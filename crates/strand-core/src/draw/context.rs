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

//! The per-context state of the draw-submission layer.

use crate::renderer::{
    AttributeType, DrawDiagnostics, DrawSettings, EnableFlags, FrontFace, GpuBuffer,
    GraphicsDriver, InvalidAttributeError, Pipeline, VertexAttribute,
};
use std::rc::Rc;

/// Owns a graphics driver together with everything the draw path caches about it.
///
/// A draw context is bound to the thread that created it. All cached state
/// starts out reset, so two contexts never share warn-once flags, enabled
/// texture units or enable bits.
#[derive(Debug)]
pub struct DrawContext {
    pub(crate) driver: Box<dyn GraphicsDriver>,
    settings: DrawSettings,
    source_stack: Vec<Rc<dyn Pipeline>>,
    default_pipeline: Rc<dyn Pipeline>,
    /// Texture units whose coordinate array is currently enabled, one bit per unit.
    pub(crate) enabled_tex_units: u32,
    pub(crate) enable_flags: EnableFlags,
    /// `None` until a winding has been sent to the driver.
    pub(crate) flushed_front_face: Option<FrontFace>,
    #[cfg(debug_assertions)]
    pub(crate) wire_pipeline: Option<Rc<dyn Pipeline>>,
    diagnostics: DrawDiagnostics,
}

impl DrawContext {
    /// Wraps `driver`, creating the default source pipeline through it.
    pub fn new(mut driver: Box<dyn GraphicsDriver>, settings: DrawSettings) -> Self {
        let default_pipeline: Rc<dyn Pipeline> = Rc::from(driver.create_pipeline());
        log::debug!("Created draw context with {settings:?}");
        Self {
            driver,
            settings,
            source_stack: Vec::new(),
            default_pipeline,
            enabled_tex_units: 0,
            enable_flags: EnableFlags::EMPTY,
            flushed_front_face: None,
            #[cfg(debug_assertions)]
            wire_pipeline: None,
            diagnostics: DrawDiagnostics::new(),
        }
    }

    /// The pipeline draws are currently made with.
    pub fn source(&self) -> Rc<dyn Pipeline> {
        Rc::clone(self.source_stack.last().unwrap_or(&self.default_pipeline))
    }

    /// Makes `pipeline` the source of subsequent draws.
    pub fn push_source(&mut self, pipeline: Rc<dyn Pipeline>) {
        self.source_stack.push(pipeline);
    }

    /// Restores the source that was active before the last [`DrawContext::push_source`].
    ///
    /// Returns `None`, leaving the default pipeline active, if nothing was pushed.
    pub fn pop_source(&mut self) -> Option<Rc<dyn Pipeline>> {
        self.source_stack.pop()
    }

    /// The settings applied to every draw.
    pub fn settings(&self) -> &DrawSettings {
        &self.settings
    }

    /// Mutable access to the settings, e.g. to toggle debug flags.
    pub fn settings_mut(&mut self) -> &mut DrawSettings {
        &mut self.settings
    }

    /// The warn-once flags of this context.
    pub fn diagnostics(&self) -> &DrawDiagnostics {
        &self.diagnostics
    }

    /// The underlying driver.
    pub fn driver(&self) -> &dyn GraphicsDriver {
        self.driver.as_ref()
    }

    /// Mutable access to the underlying driver.
    pub fn driver_mut(&mut self) -> &mut dyn GraphicsDriver {
        self.driver.as_mut()
    }

    /// The texture units whose coordinate arrays are enabled, one bit per unit.
    pub fn enabled_tex_units(&self) -> u32 {
        self.enabled_tex_units
    }

    /// Creates a vertex attribute reporting to this context's diagnostics.
    pub fn new_attribute(
        &self,
        array: Rc<dyn GpuBuffer>,
        name: &str,
        stride: usize,
        offset: usize,
        n_components: u8,
        attribute_type: AttributeType,
    ) -> Result<VertexAttribute, InvalidAttributeError> {
        VertexAttribute::new(
            self.diagnostics.clone(),
            array,
            name,
            stride,
            offset,
            n_components,
            attribute_type,
        )
    }
}
