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

//! Enums describing vertex data, indices and primitive assembly.

/// Defines how vertices are connected to form a geometric primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    /// Vertices are rendered as a list of isolated points.
    PointList,
    /// Every two vertices form an isolated line.
    LineList,
    /// Vertices form a closed line loop.
    LineLoop,
    /// Vertices form a connected line strip.
    LineStrip,
    /// Every three vertices form an isolated triangle.
    TriangleList,
    /// Vertices form a connected triangle strip.
    TriangleStrip,
    /// Every vertex after the second forms a triangle with the first and previous vertex.
    TriangleFan,
    /// Every four vertices form an isolated quad. Only batching journals emit this.
    QuadList,
}

/// The data type of each component of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// Signed 8-bit integer.
    Byte,
    /// Unsigned 8-bit integer.
    UnsignedByte,
    /// Signed 16-bit integer.
    Short,
    /// Unsigned 16-bit integer.
    UnsignedShort,
    /// 32-bit float.
    Float,
}

impl AttributeType {
    /// Returns the size in bytes of one component of this type.
    pub const fn size(&self) -> usize {
        match self {
            AttributeType::Byte | AttributeType::UnsignedByte => 1,
            AttributeType::Short | AttributeType::UnsignedShort => 2,
            AttributeType::Float => 4,
        }
    }
}

/// Specifies the data type of indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// Indices are 8-bit unsigned integers.
    Uint8,
    /// Indices are 16-bit unsigned integers.
    Uint16,
    /// Indices are 32-bit unsigned integers.
    Uint32,
}

impl IndexFormat {
    /// Returns the size in bytes of one index.
    pub const fn size(&self) -> usize {
        match self {
            IndexFormat::Uint8 => 1,
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// The binding point a buffer is bound to for the duration of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferBindTarget {
    /// Per-vertex attribute data.
    VertexArray,
    /// Element indices.
    IndexArray,
}

/// The kind of CPU access requested when mapping a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferAccess {
    /// The mapping is only read.
    Read,
    /// The mapping is only written.
    Write,
    /// The mapping is read and written.
    ReadWrite,
}

/// Defines which vertex winding order considers a triangle to be "front-facing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    /// Counter-clockwise winding order is the front face.
    #[default]
    Ccw,
    /// Clockwise winding order is the front face.
    Cw,
}
