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

//! Draw entry points.
//!
//! The public entry points flush pending batched geometry, validate the layers
//! of the source pipeline and flush framebuffer state before touching any vertex
//! pointer. The `_prevalidated` variants skip all three and are meant for
//! callers that already did this, such as a batching journal flushing itself.

use super::context::DrawContext;
use super::validate::LayerValidation;
use crate::renderer::{
    BufferBindTarget, ImmutablePin, IndexFormat, IndexPointer, Indices, PrimitiveTopology,
    VertexAttribute,
};

/// Returns the byte address of index `first` in an index array whose first index
/// lives at `base`.
pub fn index_byte_offset(base: u64, format: IndexFormat, first: u32) -> u64 {
    base + format.size() as u64 * u64::from(first)
}

fn pin_all<'a>(attributes: &[&'a VertexAttribute]) -> Vec<ImmutablePin<'a>> {
    attributes.iter().map(|attribute| attribute.pin()).collect()
}

impl DrawContext {
    /// Draws `n_vertices` vertices starting at `first_vertex` with the current source pipeline.
    pub fn draw_attributes(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        n_vertices: u32,
        attributes: &[&VertexAttribute],
    ) {
        let validation = self.prepare_draw();
        self.draw_attributes_real(topology, first_vertex, n_vertices, attributes, &validation);
    }

    /// Like [`DrawContext::draw_attributes`], without the journal flush, layer
    /// validation and framebuffer flush.
    pub fn draw_attributes_prevalidated(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        n_vertices: u32,
        attributes: &[&VertexAttribute],
    ) {
        self.draw_attributes_real(
            topology,
            first_vertex,
            n_vertices,
            attributes,
            &LayerValidation::new(),
        );
    }

    /// Collects `attributes` and forwards to [`DrawContext::draw_attributes`].
    pub fn draw_vertex_attributes<'a>(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        n_vertices: u32,
        attributes: impl IntoIterator<Item = &'a VertexAttribute>,
    ) {
        let attributes: Vec<&VertexAttribute> = attributes.into_iter().collect();
        self.draw_attributes(topology, first_vertex, n_vertices, &attributes);
    }

    /// Draws `n_indices` indices, starting at index `first_index` of `indices`.
    pub fn draw_indexed_attributes(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        n_indices: u32,
        indices: &Indices,
        attributes: &[&VertexAttribute],
    ) {
        let validation = self.prepare_draw();
        self.draw_indexed_attributes_real(
            topology,
            first_index,
            n_indices,
            indices,
            attributes,
            &validation,
        );
    }

    /// Like [`DrawContext::draw_indexed_attributes`], without the journal flush,
    /// layer validation and framebuffer flush.
    pub fn draw_indexed_attributes_prevalidated(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        n_indices: u32,
        indices: &Indices,
        attributes: &[&VertexAttribute],
    ) {
        self.draw_indexed_attributes_real(
            topology,
            first_index,
            n_indices,
            indices,
            attributes,
            &LayerValidation::new(),
        );
    }

    /// Collects `attributes` and forwards to [`DrawContext::draw_indexed_attributes`].
    pub fn draw_indexed_vertex_attributes<'a>(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        n_indices: u32,
        indices: &Indices,
        attributes: impl IntoIterator<Item = &'a VertexAttribute>,
    ) {
        let attributes: Vec<&VertexAttribute> = attributes.into_iter().collect();
        self.draw_indexed_attributes(topology, first_index, n_indices, indices, &attributes);
    }

    // Flushing framebuffer state can draw the clip stack, which would clobber
    // vertex pointers, so it happens before any attribute is bound.
    fn prepare_draw(&mut self) -> LayerValidation {
        self.driver.flush_journal();
        let validation = LayerValidation::validate_layers(self.source().as_ref());
        self.driver.flush_framebuffer_state();
        validation
    }

    fn draw_attributes_real(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        n_vertices: u32,
        attributes: &[&VertexAttribute],
        validation: &LayerValidation,
    ) {
        let pins = pin_all(attributes);
        let flushed = self.enable_attributes(attributes, validation);

        self.driver.draw_arrays(topology, first_vertex, n_vertices);

        self.disable_attributes(attributes, flushed);
        drop(pins);

        #[cfg(debug_assertions)]
        self.draw_wireframe_if_enabled(topology, first_vertex, n_vertices, attributes, None);
    }

    fn draw_indexed_attributes_real(
        &mut self,
        topology: PrimitiveTopology,
        first_index: u32,
        n_indices: u32,
        indices: &Indices,
        attributes: &[&VertexAttribute],
        validation: &LayerValidation,
    ) {
        let pins = pin_all(attributes);
        let flushed = self.enable_attributes(attributes, validation);

        let array = indices.array();
        let bound = array.bind(BufferBindTarget::IndexArray);
        let pointer = IndexPointer {
            buffer: bound.id,
            offset: index_byte_offset(
                bound.base + indices.offset() as u64,
                indices.format(),
                first_index,
            ),
        };
        self.driver
            .draw_elements(topology, n_indices, indices.format(), &pointer);
        array.unbind();

        self.disable_attributes(attributes, flushed);
        drop(pins);

        #[cfg(debug_assertions)]
        self.draw_wireframe_if_enabled(topology, first_index, n_indices, attributes, Some(indices));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{
        AttributeType, BlendEnable, DrawSettings, GpuBuffer, Pipeline, Texture,
        POSITION_ATTRIBUTE_NAME,
    };
    use crate::testing::{Call, MockBuffer, MockDriver, MockPipeline, MockTexture};
    use std::rc::Rc;

    #[test]
    fn test_index_byte_offset_for_every_width() {
        for (format, width) in [
            (IndexFormat::Uint8, 1),
            (IndexFormat::Uint16, 2),
            (IndexFormat::Uint32, 4),
        ] {
            for first in [0u32, 1, 7] {
                assert_eq!(
                    index_byte_offset(100, format, first),
                    100 + width * u64::from(first)
                );
            }
        }
    }

    #[test]
    fn test_public_draw_prepares_before_binding() {
        let (driver, calls) = MockDriver::new();
        let mut context = DrawContext::new(driver, DrawSettings::default());
        let buffer = MockBuffer::from_floats(&[0.0; 6]);
        let position = context
            .new_attribute(buffer, POSITION_ATTRIBUTE_NAME, 0, 0, 2, AttributeType::Float)
            .unwrap();
        calls.borrow_mut().clear();

        context.draw_attributes(PrimitiveTopology::TriangleList, 0, 3, &[&position]);

        let calls = calls.borrow();
        assert_eq!(calls[0], Call::FlushJournal);
        assert_eq!(calls[1], Call::FlushFramebuffer);
        assert!(matches!(calls[2], Call::VertexPointer(_)));
        let draws: Vec<&Call> = calls
            .iter()
            .filter(|call| matches!(call, Call::DrawArrays(..)))
            .collect();
        assert_eq!(
            draws,
            vec![&Call::DrawArrays(PrimitiveTopology::TriangleList, 0, 3)]
        );
    }

    #[test]
    fn test_prevalidated_draw_skips_preparation() {
        let (driver, calls) = MockDriver::new();
        let mut context = DrawContext::new(driver, DrawSettings::default());
        calls.borrow_mut().clear();

        context.draw_attributes_prevalidated(PrimitiveTopology::LineList, 2, 4, &[]);
        assert!(!calls
            .borrow()
            .iter()
            .any(|call| matches!(call, Call::FlushJournal | Call::FlushFramebuffer)));
        assert!(calls
            .borrow()
            .contains(&Call::DrawArrays(PrimitiveTopology::LineList, 2, 4)));
    }

    #[test]
    fn test_validation_of_source_reaches_flush() {
        let (driver, calls) = MockDriver::new();
        let mut context = DrawContext::new(driver, DrawSettings::default());
        let sliced = MockTexture::new(false);
        let source = MockPipeline {
            layers: vec![(0, None), (5, Some(sliced.clone() as Rc<dyn Texture>))],
            blend: BlendEnable::Enabled,
            ..Default::default()
        };
        context.push_source(Rc::new(source) as Rc<dyn Pipeline>);

        context.draw_attributes(PrimitiveTopology::TriangleList, 0, 3, &[]);
        assert_eq!(sliced.notified.get(), 1);
        let overrides = calls.borrow().iter().find_map(|call| match call {
            Call::FlushPipeline { overrides, .. } => *overrides,
            _ => None,
        });
        assert_eq!(overrides.map(|o| o.fallback_layers), Some(0b10));
    }

    #[test]
    fn test_indexed_draw_offsets_and_unbinds() {
        let (driver, calls) = MockDriver::new();
        let mut context = DrawContext::new(driver, DrawSettings::default());
        let index_buffer = MockBuffer::with_base(vec![0; 32], 0x400);
        let indices = Indices::with_offset(index_buffer.clone(), 4, IndexFormat::Uint16);

        context.draw_indexed_attributes(PrimitiveTopology::TriangleList, 3, 6, &indices, &[]);

        assert!(calls.borrow().contains(&Call::DrawElements(
            PrimitiveTopology::TriangleList,
            6,
            IndexFormat::Uint16,
            IndexPointer {
                buffer: index_buffer.id(),
                offset: 0x400 + 4 + 2 * 3,
            }
        )));
        assert_eq!(index_buffer.binds.get(), 1);
        assert_eq!(index_buffer.unbinds.get(), 1);
    }

    #[test]
    fn test_attributes_are_pinned_only_during_the_draw() {
        let (driver, _) = MockDriver::new();
        let mut context = DrawContext::new(driver, DrawSettings::default());
        let buffer = MockBuffer::with_size(24);
        let position = context
            .new_attribute(buffer.clone(), POSITION_ATTRIBUTE_NAME, 0, 0, 2, AttributeType::Float)
            .unwrap();

        context.draw_vertex_attributes(PrimitiveTopology::TriangleList, 0, 3, [&position]);
        assert_eq!(position.immutable_ref_count(), 0);
        assert_eq!(buffer.immutable_ref_count(), 0);
    }
}
