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

//! Debug wireframe overlay: rebuilds the edges of a triangle-based draw as a line list.

use crate::renderer::{
    AttributeType, BufferAccess, IndexFormat, Indices, MappedBuffer, PrimitiveTopology,
    ResourceError, VertexAttribute,
};
use bytemuck::{Pod, Zeroable};

#[cfg(debug_assertions)]
use super::context::DrawContext;
#[cfg(debug_assertions)]
use crate::math::LinearRgba;
#[cfg(debug_assertions)]
use crate::renderer::{DebugFlags, Pipeline, POSITION_ATTRIBUTE_NAME};
#[cfg(debug_assertions)]
use std::rc::Rc;

/// A position with three float components, the vertex format of the overlay.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct P3Vertex {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate, `0` for two-component positions.
    pub z: f32,
}

/// Line-list vertices, two per segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireLines {
    vertices: Vec<P3Vertex>,
}

impl WireLines {
    /// The number of line segments.
    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 2
    }

    /// The number of vertices, twice the number of segments.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The vertices, segment by segment.
    pub fn vertices(&self) -> &[P3Vertex] {
        &self.vertices
    }

    /// Returns `true` if no segment was produced.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The vertices as raw bytes, ready to upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Returns the edges of the triangles (or quads) drawn by `n_vertices` vertices of
/// `topology`, as pairs of positions within the draw.
///
/// Returns no edges for topologies without faces and for vertex counts that
/// do not fit the topology.
pub fn wire_edges(topology: PrimitiveTopology, n_vertices: u32) -> Vec<(u32, u32)> {
    match topology {
        PrimitiveTopology::TriangleList if n_vertices % 3 == 0 => (0..n_vertices)
            .step_by(3)
            .flat_map(|i| [(i, i + 1), (i + 1, i + 2), (i + 2, i)])
            .collect(),
        PrimitiveTopology::TriangleFan | PrimitiveTopology::TriangleStrip if n_vertices >= 3 => {
            let fan = topology == PrimitiveTopology::TriangleFan;
            let mut edges = Vec::with_capacity(2 * n_vertices as usize - 3);
            edges.extend([(0, 1), (1, 2), (0, 2)]);
            for i in 3..n_vertices {
                edges.push((i - 1, i));
                edges.push(if fan { (0, i) } else { (i - 2, i) });
            }
            edges
        }
        PrimitiveTopology::QuadList if n_vertices % 4 == 0 => (0..n_vertices)
            .step_by(4)
            .flat_map(|i| [(i, i + 1), (i + 1, i + 2), (i + 2, i + 3), (i + 3, i)])
            .collect(),
        _ => Vec::new(),
    }
}

fn read_index(
    mapped: &MappedBuffer<'_>,
    offset: usize,
    format: IndexFormat,
) -> Result<u32, ResourceError> {
    let bytes = mapped.read(offset, format.size())?;
    Ok(match format {
        IndexFormat::Uint8 => u32::from(bytes[0]),
        IndexFormat::Uint16 => u32::from(bytemuck::pod_read_unaligned::<u16>(bytes)),
        IndexFormat::Uint32 => bytemuck::pod_read_unaligned::<u32>(bytes),
    })
}

/// Rebuilds the edges drawn from `position` as line-list vertices.
///
/// `first` is the first vertex of a plain draw, or the first index when
/// `indices` is given. Only float positions are supported; anything else yields
/// no lines. Every buffer mapped here is unmapped before returning.
pub fn reconstruct(
    position: &VertexAttribute,
    topology: PrimitiveTopology,
    first: u32,
    n_vertices: u32,
    indices: Option<&Indices>,
) -> Result<WireLines, ResourceError> {
    let edges = wire_edges(topology, n_vertices);
    if edges.is_empty() {
        return Ok(WireLines::default());
    }
    if position.attribute_type() != AttributeType::Float {
        log::debug!(
            "No wireframe for '{}': {:?} positions are not supported",
            position.name(),
            position.attribute_type()
        );
        return Ok(WireLines::default());
    }

    let array = position.array();
    let vertices = MappedBuffer::new(array.as_ref(), BufferAccess::Read)?;
    let index_data = match indices {
        Some(indices) => Some((
            indices,
            MappedBuffer::new(indices.array().as_ref(), BufferAccess::Read)?,
        )),
        None => None,
    };

    let vertex_index = |i: u32| -> Result<usize, ResourceError> {
        let at = first as usize + i as usize;
        match &index_data {
            None => Ok(at),
            Some((indices, mapped)) => {
                let offset = indices.offset() + at * indices.format().size();
                read_index(mapped, offset, indices.format()).map(|index| index as usize)
            }
        }
    };

    let stride = position.effective_stride();
    let n_components = usize::from(position.n_components().min(3));
    let read_vertex = |index: usize| -> Result<P3Vertex, ResourceError> {
        let bytes = vertices.read(position.offset() + index * stride, n_components * 4)?;
        let mut xyz = [0.0f32; 3];
        for (component, chunk) in xyz.iter_mut().zip(bytes.chunks_exact(4)) {
            *component = bytemuck::pod_read_unaligned(chunk);
        }
        Ok(P3Vertex {
            x: xyz[0],
            y: xyz[1],
            z: xyz[2],
        })
    };

    let mut lines = Vec::with_capacity(edges.len() * 2);
    for (start, end) in edges {
        lines.push(read_vertex(vertex_index(start)?)?);
        lines.push(read_vertex(vertex_index(end)?)?);
    }
    Ok(WireLines { vertices: lines })
}

#[cfg(debug_assertions)]
impl DrawContext {
    pub(crate) fn draw_wireframe_if_enabled(
        &mut self,
        topology: PrimitiveTopology,
        first: u32,
        n_vertices: u32,
        attributes: &[&VertexAttribute],
        indices: Option<&Indices>,
    ) {
        if !self.settings().debug_flags.contains(DebugFlags::WIREFRAME) {
            return;
        }
        let Some(position) = attributes
            .iter()
            .find(|attribute| attribute.name() == POSITION_ATTRIBUTE_NAME)
        else {
            return;
        };

        let lines = match reconstruct(position, topology, first, n_vertices, indices) {
            Ok(lines) if !lines.is_empty() => lines,
            Ok(_) => return,
            Err(e) => {
                log::warn!("Skipping wireframe overlay: {e}");
                return;
            }
        };

        let array = self.driver.create_vertex_array(lines.as_bytes());
        let wire_attribute = match self.new_attribute(
            array,
            POSITION_ATTRIBUTE_NAME,
            std::mem::size_of::<P3Vertex>(),
            0,
            3,
            AttributeType::Float,
        ) {
            Ok(attribute) => attribute,
            Err(e) => {
                log::warn!("Skipping wireframe overlay: {e}");
                return;
            }
        };

        let pipeline = self.wire_pipeline();
        self.push_source(pipeline);

        // The nested draw would otherwise outline its own lines.
        self.settings_mut().debug_flags.remove(DebugFlags::WIREFRAME);
        self.draw_attributes_prevalidated(
            PrimitiveTopology::LineList,
            0,
            lines.vertex_count() as u32,
            &[&wire_attribute],
        );
        self.settings_mut().debug_flags.insert(DebugFlags::WIREFRAME);

        self.pop_source();
    }

    fn wire_pipeline(&mut self) -> Rc<dyn Pipeline> {
        if let Some(pipeline) = &self.wire_pipeline {
            return Rc::clone(pipeline);
        }
        let mut pipeline = self.driver.create_pipeline();
        pipeline.set_color(LinearRgba::GREEN);
        let pipeline: Rc<dyn Pipeline> = Rc::from(pipeline);
        self.wire_pipeline = Some(Rc::clone(&pipeline));
        pipeline
    }
}
