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

//! The state flush engine: turns an attribute set and the current source
//! pipeline into driver state, deriving a pipeline copy only when needed.

use super::context::DrawContext;
use super::validate::LayerValidation;
use crate::renderer::{
    AttributePointer, AttributeRole, BlendEnable, BufferBindTarget, DebugFlags, EnableFlags,
    FlushFlags, Pipeline, VertexAttribute,
};
use std::rc::Rc;

/// The pipeline a draw's state was flushed with.
///
/// Hand it back to [`DrawContext::disable_attributes`] once the draw has been
/// issued. If the flush had to derive a copy of the source pipeline, dropping
/// this value releases the copy; the source itself is never touched.
#[derive(Debug)]
#[must_use = "the flushed pipeline must be passed to `disable_attributes`"]
pub struct FlushedPipeline {
    pipeline: Rc<dyn Pipeline>,
    derived: bool,
}

impl FlushedPipeline {
    /// The pipeline that was flushed to the driver.
    pub fn pipeline(&self) -> &Rc<dyn Pipeline> {
        &self.pipeline
    }

    /// Returns `true` if the flushed pipeline is a copy derived for this draw.
    pub fn is_derived(&self) -> bool {
        self.derived
    }
}

// Copy-on-write view of the source pipeline for the duration of one flush.
struct Derivation {
    source: Rc<dyn Pipeline>,
    copy: Option<Box<dyn Pipeline>>,
}

impl Derivation {
    fn new(source: Rc<dyn Pipeline>) -> Self {
        Self { source, copy: None }
    }

    fn current(&self) -> &dyn Pipeline {
        match &self.copy {
            Some(copy) => copy.as_ref(),
            None => self.source.as_ref(),
        }
    }

    fn make_mut(&mut self) -> &mut dyn Pipeline {
        let source = &self.source;
        self.copy
            .get_or_insert_with(|| {
                log::trace!("Deriving a copy of the source pipeline for this draw");
                source.copy()
            })
            .as_mut()
    }

    fn finish(self) -> FlushedPipeline {
        match self.copy {
            Some(copy) => FlushedPipeline {
                pipeline: Rc::from(copy),
                derived: true,
            },
            None => FlushedPipeline {
                pipeline: self.source,
                derived: false,
            },
        }
    }
}

impl DrawContext {
    /// Sets up the driver to draw from `attributes` with the current source pipeline.
    ///
    /// Must be paired with exactly one [`DrawContext::disable_attributes`] after
    /// the draw call. Attributes whose component type their channel cannot read
    /// are logged and skipped; the rest of the set is still flushed.
    pub fn enable_attributes(
        &mut self,
        attributes: &[&VertexAttribute],
        validation: &LayerValidation,
    ) -> FlushedPipeline {
        let mut derivation = Derivation::new(self.source());
        let mut enable_flags = EnableFlags::EMPTY;
        let mut skip_color = false;
        let mut used_tex_units = 0u32;
        let mut generic_index = 0u32;

        for attribute in attributes {
            let role = attribute.role();
            if !role.accepts(attribute.attribute_type()) {
                log::warn!(
                    "Skipping {} attribute '{}': the channel cannot read {:?} components",
                    role.label(),
                    attribute.name(),
                    attribute.attribute_type()
                );
                continue;
            }

            let array = attribute.borrow_array();
            let bound = array.bind(BufferBindTarget::VertexArray);
            let pointer = AttributePointer {
                buffer: bound.id,
                n_components: attribute.n_components(),
                attribute_type: attribute.attribute_type(),
                stride: attribute.stride(),
                offset: bound.base + attribute.offset() as u64,
            };

            match role {
                AttributeRole::Color => {
                    enable_flags.insert(EnableFlags::COLOR_ARRAY);
                    self.driver.set_color_pointer(&pointer);
                    if !derivation.current().real_blend_enabled() {
                        derivation
                            .make_mut()
                            .set_blend_enabled(BlendEnable::Enabled);
                    }
                    skip_color = true;
                }
                AttributeRole::Normal => {
                    self.driver.set_normal_array_enabled(true);
                    self.driver.set_normal_pointer(&pointer);
                }
                AttributeRole::TextureCoord { unit } => {
                    let bit = 1u32 << unit;
                    if self.enabled_tex_units & bit == 0 {
                        self.driver.set_tex_coord_array_enabled(unit, true);
                        self.enabled_tex_units |= bit;
                    }
                    self.driver.set_tex_coord_pointer(unit, &pointer);
                    used_tex_units |= bit;
                }
                AttributeRole::Position => {
                    enable_flags.insert(EnableFlags::VERTEX_ARRAY);
                    self.driver.set_vertex_pointer(&pointer);
                }
                AttributeRole::Custom => {
                    self.driver.set_generic_array_enabled(generic_index, true);
                    self.driver
                        .set_generic_pointer(generic_index, &pointer, attribute.normalized());
                    generic_index += 1;
                }
            }

            array.unbind();
        }

        self.disable_unused_tex_units(used_tex_units);

        let debug_flags = self.settings().debug_flags;
        let mut options = validation.options;
        if debug_flags.contains(DebugFlags::DISABLE_TEXTURING) {
            options.flags.insert(FlushFlags::DISABLE_MASK);
            options.disable_layers = !0;
        }
        if !options.is_empty() {
            derivation.make_mut().apply_overrides(&options);
        }
        if debug_flags.contains(DebugFlags::DISABLE_BLENDING) {
            derivation
                .make_mut()
                .set_blend_enabled(BlendEnable::Disabled);
        }
        if let Some(legacy) = self.settings().legacy_state.filter(|state| state.is_set()) {
            derivation.make_mut().apply_legacy_state(&legacy);
        }

        let flushed = derivation.finish();
        self.driver
            .flush_pipeline(flushed.pipeline.as_ref(), skip_color);

        if self.settings().backface_culling {
            enable_flags.insert(EnableFlags::BACKFACE_CULLING);
        }
        self.flush_enable_flags(enable_flags);
        self.flush_front_face();

        flushed
    }

    /// Tears down the state set up by [`DrawContext::enable_attributes`].
    ///
    /// The normal array and the generic arrays are disabled. Position, color and
    /// texture coordinate arrays stay enabled and are reconciled by the next flush.
    pub fn disable_attributes(&mut self, attributes: &[&VertexAttribute], flushed: FlushedPipeline) {
        if flushed.is_derived() {
            log::trace!("Releasing the pipeline derived for this draw");
        }
        drop(flushed);

        let mut generic_index = 0u32;
        for attribute in attributes {
            match attribute.role() {
                AttributeRole::Normal => self.driver.set_normal_array_enabled(false),
                AttributeRole::Custom => {
                    self.driver.set_generic_array_enabled(generic_index, false);
                    generic_index += 1;
                }
                AttributeRole::Color
                | AttributeRole::Position
                | AttributeRole::TextureCoord { .. } => {}
            }
        }
    }

    fn disable_unused_tex_units(&mut self, used: u32) {
        let mut stale = self.enabled_tex_units & !used;
        if stale != 0 {
            log::debug!("Disabling texture coordinate arrays {stale:#b}");
        }
        while stale != 0 {
            let unit = stale.trailing_zeros();
            self.driver.set_tex_coord_array_enabled(unit, false);
            stale &= stale - 1;
        }
        self.enabled_tex_units &= used;
    }

    fn flush_enable_flags(&mut self, flags: EnableFlags) {
        let changed = self.enable_flags ^ flags;
        for capability in EnableFlags::ALL_CAPABILITIES {
            if changed.contains(capability) {
                self.driver
                    .set_capability(capability, flags.contains(capability));
            }
        }
        self.enable_flags = flags;
    }

    fn flush_front_face(&mut self) {
        let front_face = self.settings().front_face;
        if self.flushed_front_face != Some(front_face) {
            self.driver.set_front_face(front_face);
            self.flushed_front_face = Some(front_face);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{
        AttributeType, DrawSettings, FrontFace, LegacyState, COLOR_ATTRIBUTE_NAME,
        NORMAL_ATTRIBUTE_NAME, POSITION_ATTRIBUTE_NAME,
    };
    use crate::testing::{float_pointer, pipeline_addr, Call, CallLog, MockBuffer, MockDriver, MockPipeline};

    fn context_with(blend: BlendEnable, settings: DrawSettings) -> (DrawContext, CallLog, Rc<dyn Pipeline>) {
        let (driver, calls) = MockDriver::new();
        let mut context = DrawContext::new(driver, settings);
        let source: Rc<dyn Pipeline> = Rc::new(MockPipeline::with_blend(blend));
        context.push_source(Rc::clone(&source));
        calls.borrow_mut().clear();
        (context, calls, source)
    }

    fn attr(context: &DrawContext, buffer: &Rc<MockBuffer>, name: &str, n: u8, ty: AttributeType) -> VertexAttribute {
        context
            .new_attribute(buffer.clone(), name, 0, 0, n, ty)
            .unwrap()
    }

    fn flushes(calls: &CallLog) -> Vec<Call> {
        calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::FlushPipeline { .. }))
            .cloned()
            .collect()
    }

    #[test]
    fn test_color_channel_derives_blending_copy() {
        let (mut context, calls, source) = context_with(BlendEnable::Disabled, DrawSettings::default());
        let buffer = MockBuffer::with_size(64);
        let position = attr(&context, &buffer, POSITION_ATTRIBUTE_NAME, 2, AttributeType::Float);
        let color = attr(&context, &buffer, COLOR_ATTRIBUTE_NAME, 4, AttributeType::UnsignedByte);
        let attributes = [&position, &color];

        let flushed = context.enable_attributes(&attributes, &LayerValidation::new());
        assert!(flushed.is_derived());
        assert!(!Rc::ptr_eq(flushed.pipeline(), &source));
        assert!(flushed.pipeline().real_blend_enabled());
        assert!(!source.real_blend_enabled());

        assert_eq!(
            flushes(&calls),
            vec![Call::FlushPipeline {
                pipeline: pipeline_addr(flushed.pipeline().as_ref()),
                skip_color: true,
                blend: true,
                overrides: None,
                legacy: None,
            }]
        );
        context.disable_attributes(&attributes, flushed);
        assert_eq!(buffer.binds.get(), 2);
        assert_eq!(buffer.unbinds.get(), 2);
    }

    #[test]
    fn test_color_channel_with_blending_keeps_source() {
        let (mut context, _calls, source) = context_with(BlendEnable::Enabled, DrawSettings::default());
        let buffer = MockBuffer::with_size(64);
        let color = attr(&context, &buffer, COLOR_ATTRIBUTE_NAME, 3, AttributeType::Float);

        let flushed = context.enable_attributes(&[&color], &LayerValidation::new());
        assert!(!flushed.is_derived());
        assert!(Rc::ptr_eq(flushed.pipeline(), &source));
        context.disable_attributes(&[&color], flushed);
    }

    #[test]
    fn test_pointers_use_bound_base_and_offsets() {
        let (mut context, calls, _) = context_with(BlendEnable::Enabled, DrawSettings::default());
        let buffer = MockBuffer::with_base(vec![0; 64], 0x1000);
        let position = context
            .new_attribute(buffer.clone(), POSITION_ATTRIBUTE_NAME, 20, 8, 3, AttributeType::Float)
            .unwrap();

        let flushed = context.enable_attributes(&[&position], &LayerValidation::new());
        context.disable_attributes(&[&position], flushed);
        assert_eq!(
            calls.borrow()[0],
            Call::VertexPointer(float_pointer(&buffer, 3, 20, 8))
        );
    }

    #[test]
    fn test_custom_attributes_get_sequential_generic_indices() {
        let (mut context, calls, _) = context_with(BlendEnable::Enabled, DrawSettings::default());
        let buffer = MockBuffer::with_size(64);
        let weights = attr(&context, &buffer, "weights", 4, AttributeType::UnsignedByte);
        weights.set_normalized(true);
        let position = attr(&context, &buffer, POSITION_ATTRIBUTE_NAME, 2, AttributeType::Float);
        let velocity = attr(&context, &buffer, "velocity", 3, AttributeType::Float);
        let attributes = [&weights, &position, &velocity];

        let flushed = context.enable_attributes(&attributes, &LayerValidation::new());
        context.disable_attributes(&attributes, flushed);

        let generic: Vec<Call> = calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::GenericArray(..) | Call::GenericPointer(..)))
            .cloned()
            .collect();
        assert_eq!(generic.len(), 6);
        assert_eq!(generic[0], Call::GenericArray(0, true));
        assert!(matches!(generic[1], Call::GenericPointer(0, _, true)));
        assert_eq!(generic[2], Call::GenericArray(1, true));
        assert!(matches!(generic[3], Call::GenericPointer(1, _, false)));
        assert_eq!(generic[4], Call::GenericArray(0, false));
        assert_eq!(generic[5], Call::GenericArray(1, false));
    }

    #[test]
    fn test_normal_array_is_enabled_then_disabled() {
        let (mut context, calls, _) = context_with(BlendEnable::Enabled, DrawSettings::default());
        let buffer = MockBuffer::with_size(64);
        let normal = attr(&context, &buffer, NORMAL_ATTRIBUTE_NAME, 3, AttributeType::Float);

        let flushed = context.enable_attributes(&[&normal], &LayerValidation::new());
        context.disable_attributes(&[&normal], flushed);

        let calls = calls.borrow();
        assert_eq!(calls[0], Call::NormalArray(true));
        assert!(matches!(calls[1], Call::NormalPointer(_)));
        assert_eq!(calls.last(), Some(&Call::NormalArray(false)));
    }

    #[test]
    fn test_tex_coord_arrays_are_cached_across_draws() {
        let (mut context, calls, _) = context_with(BlendEnable::Enabled, DrawSettings::default());
        let buffer = MockBuffer::with_size(64);
        let unit0 = attr(&context, &buffer, "strand_tex_coord0_in", 2, AttributeType::Float);
        let unit2 = attr(&context, &buffer, "strand_tex_coord2_in", 2, AttributeType::Float);

        let flushed = context.enable_attributes(&[&unit0, &unit2], &LayerValidation::new());
        context.disable_attributes(&[&unit0, &unit2], flushed);
        assert_eq!(context.enabled_tex_units(), 0b101);

        calls.borrow_mut().clear();
        let flushed = context.enable_attributes(&[&unit2], &LayerValidation::new());
        context.disable_attributes(&[&unit2], flushed);
        assert_eq!(context.enabled_tex_units(), 0b100);

        let toggles: Vec<Call> = calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::TexCoordArray(..)))
            .cloned()
            .collect();
        assert_eq!(toggles, vec![Call::TexCoordArray(0, false)]);
    }

    #[test]
    fn test_incompatible_component_type_skips_channel() {
        let (mut context, calls, _) = context_with(BlendEnable::Enabled, DrawSettings::default());
        let buffer = MockBuffer::with_size(64);
        let position = attr(&context, &buffer, POSITION_ATTRIBUTE_NAME, 2, AttributeType::UnsignedByte);

        let flushed = context.enable_attributes(&[&position], &LayerValidation::new());
        context.disable_attributes(&[&position], flushed);

        assert!(!calls.borrow().iter().any(|call| matches!(call, Call::VertexPointer(_))));
        assert_eq!(buffer.binds.get(), 0);
        assert_eq!(flushes(&calls).len(), 1);
    }

    #[test]
    fn test_validation_overrides_force_derivation() {
        let (mut context, calls, source) = context_with(BlendEnable::Enabled, DrawSettings::default());
        let mut validation = LayerValidation::new();
        validation.options.flags.insert(FlushFlags::FALLBACK_MASK);
        validation.options.fallback_layers = 0b10;

        let flushed = context.enable_attributes(&[], &validation);
        assert!(flushed.is_derived());
        assert!(!Rc::ptr_eq(flushed.pipeline(), &source));
        match &flushes(&calls)[0] {
            Call::FlushPipeline { overrides, skip_color, .. } => {
                assert_eq!(*overrides, Some(validation.options));
                assert!(!skip_color);
            }
            other => panic!("unexpected call {other:?}"),
        }
        context.disable_attributes(&[], flushed);
    }

    #[test]
    fn test_legacy_state_and_debug_flags_force_derivation() {
        let legacy = LegacyState {
            depth_test: Some(true),
            ..Default::default()
        };
        let settings = DrawSettings {
            legacy_state: Some(legacy),
            debug_flags: DebugFlags::DISABLE_BLENDING | DebugFlags::DISABLE_TEXTURING,
            ..Default::default()
        };
        let (mut context, calls, _) = context_with(BlendEnable::Enabled, settings);

        let flushed = context.enable_attributes(&[], &LayerValidation::new());
        assert!(flushed.is_derived());
        match &flushes(&calls)[0] {
            Call::FlushPipeline { blend, overrides, legacy: flushed_legacy, .. } => {
                assert!(!blend);
                let overrides = overrides.unwrap();
                assert!(overrides.flags.contains(FlushFlags::DISABLE_MASK));
                assert_eq!(overrides.disable_layers, !0);
                assert_eq!(*flushed_legacy, Some(legacy));
            }
            other => panic!("unexpected call {other:?}"),
        }
        context.disable_attributes(&[], flushed);
    }

    #[test]
    fn test_unset_legacy_state_does_not_derive() {
        let settings = DrawSettings {
            legacy_state: Some(LegacyState::default()),
            ..Default::default()
        };
        let (mut context, _, _) = context_with(BlendEnable::Enabled, settings);
        let flushed = context.enable_attributes(&[], &LayerValidation::new());
        assert!(!flushed.is_derived());
        context.disable_attributes(&[], flushed);
    }

    #[test]
    fn test_enable_flags_and_winding_are_only_sent_on_change() {
        let settings = DrawSettings {
            backface_culling: true,
            front_face: FrontFace::Cw,
            ..Default::default()
        };
        let (mut context, calls, _) = context_with(BlendEnable::Enabled, settings);
        let buffer = MockBuffer::with_size(64);
        let position = attr(&context, &buffer, POSITION_ATTRIBUTE_NAME, 2, AttributeType::Float);

        for _ in 0..2 {
            let flushed = context.enable_attributes(&[&position], &LayerValidation::new());
            context.disable_attributes(&[&position], flushed);
        }
        let state_calls: Vec<Call> = calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Capability(..) | Call::FrontFace(_)))
            .cloned()
            .collect();
        assert_eq!(
            state_calls,
            vec![
                Call::Capability(EnableFlags::VERTEX_ARRAY, true),
                Call::Capability(EnableFlags::BACKFACE_CULLING, true),
                Call::FrontFace(FrontFace::Cw),
            ]
        );

        calls.borrow_mut().clear();
        context.settings_mut().backface_culling = false;
        let flushed = context.enable_attributes(&[], &LayerValidation::new());
        context.disable_attributes(&[], flushed);
        let state_calls: Vec<Call> = calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Capability(..) | Call::FrontFace(_)))
            .cloned()
            .collect();
        assert_eq!(
            state_calls,
            vec![
                Call::Capability(EnableFlags::VERTEX_ARRAY, false),
                Call::Capability(EnableFlags::BACKFACE_CULLING, false),
            ]
        );
    }
}
