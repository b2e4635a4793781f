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

//! The vertex attribute descriptor: one named channel of per-vertex data.

use super::diagnostics::DrawDiagnostics;
use super::enums::AttributeType;
use crate::renderer::error::{InvalidAttributeError, PreconditionViolation};
use crate::renderer::traits::GpuBuffer;
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

/// The prefix of every attribute name with a built-in meaning.
pub const RESERVED_PREFIX: &str = "strand_";
/// The name of the position channel.
pub const POSITION_ATTRIBUTE_NAME: &str = "strand_position_in";
/// The name of the per-vertex color channel.
pub const COLOR_ATTRIBUTE_NAME: &str = "strand_color_in";
/// The name of the normal channel.
pub const NORMAL_ATTRIBUTE_NAME: &str = "strand_normal_in";
/// The name of the texture coordinates of unit 0.
pub const TEX_COORD_ATTRIBUTE_NAME: &str = "strand_tex_coord_in";
/// The number of texture units a draw context can track.
pub const MAX_TEXTURE_UNITS: u32 = 32;

/// The semantic role of an attribute, resolved once from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeRole {
    /// Vertex positions.
    Position,
    /// Per-vertex colors.
    Color,
    /// Vertex normals.
    Normal,
    /// Texture coordinates for a texture unit.
    TextureCoord {
        /// The texture unit the coordinates feed.
        unit: u32,
    },
    /// Any other data, fed to a generic attribute array.
    Custom,
}

impl AttributeRole {
    /// Returns `true` if the channel of this role can read components of type `ty`.
    pub fn accepts(&self, ty: AttributeType) -> bool {
        use AttributeType::*;
        match self {
            AttributeRole::Position | AttributeRole::TextureCoord { .. } => {
                matches!(ty, Short | Float)
            }
            AttributeRole::Normal => matches!(ty, Byte | Short | Float),
            AttributeRole::Color | AttributeRole::Custom => true,
        }
    }

    /// A short label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            AttributeRole::Position => "position",
            AttributeRole::Color => "color",
            AttributeRole::Normal => "normal",
            AttributeRole::TextureCoord { .. } => "texture coordinate",
            AttributeRole::Custom => "custom",
        }
    }

    /// Resolves the role of an attribute declared as `name` with `n_components` components.
    pub fn resolve(name: &str, n_components: u8) -> Result<Self, InvalidAttributeError> {
        let Some(suffix) = name.strip_prefix(RESERVED_PREFIX) else {
            return Ok(AttributeRole::Custom);
        };

        let (role, expected, valid) = match suffix {
            "position_in" => (
                AttributeRole::Position,
                "2, 3 or 4",
                (2..=4).contains(&n_components),
            ),
            "color_in" => (
                AttributeRole::Color,
                "3 or 4",
                matches!(n_components, 3 | 4),
            ),
            "normal_in" | "normal" => (AttributeRole::Normal, "3", n_components == 3),
            _ => match suffix.strip_prefix("tex_coord") {
                Some(unit) => return Self::resolve_tex_coord(name, unit),
                None => {
                    return Err(InvalidAttributeError::UnknownReservedName {
                        name: name.to_owned(),
                    })
                }
            },
        };

        if valid {
            Ok(role)
        } else {
            Err(InvalidAttributeError::InvalidComponentCount {
                name: name.to_owned(),
                role: role.label(),
                n_components,
                expected,
            })
        }
    }

    // `unit` is what follows "tex_coord": "", "_in", or digits optionally followed by "_in".
    fn resolve_tex_coord(name: &str, unit: &str) -> Result<Self, InvalidAttributeError> {
        let digits = unit.strip_suffix("_in").unwrap_or(unit);
        if digits.is_empty() {
            return Ok(AttributeRole::TextureCoord { unit: 0 });
        }

        let malformed = || InvalidAttributeError::MalformedTextureUnit {
            name: name.to_owned(),
        };
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let unit: u32 = digits.parse().map_err(|_| malformed())?;
        if unit >= MAX_TEXTURE_UNITS {
            return Err(InvalidAttributeError::TextureUnitOutOfRange {
                name: name.to_owned(),
                unit,
            });
        }
        Ok(AttributeRole::TextureCoord { unit })
    }
}

/// Describes one channel of per-vertex data stored in a shared buffer.
///
/// The layout (`name`, `stride`, `offset`, `n_components`, `attribute_type`) is
/// fixed at construction. The backing buffer and the `normalized` flag can still
/// change, but doing so while the attribute is pinned by a draw is reported once
/// per context. The change is applied regardless.
#[derive(Debug)]
pub struct VertexAttribute {
    array: RefCell<Rc<dyn GpuBuffer>>,
    name: String,
    stride: usize,
    offset: usize,
    n_components: u8,
    attribute_type: AttributeType,
    role: AttributeRole,
    normalized: Cell<bool>,
    immutable_ref: Cell<u32>,
    diagnostics: DrawDiagnostics,
}

impl VertexAttribute {
    /// Creates an attribute reading `n_components` values of `attribute_type` per vertex.
    ///
    /// `stride` is the distance in bytes between vertices (`0` for tightly packed
    /// data) and `offset` the byte offset of the first vertex in `array`.
    ///
    /// # Errors
    /// Fails if `name` uses the reserved prefix but does not describe a valid
    /// channel. See [`AttributeRole::resolve`].
    pub fn new(
        diagnostics: DrawDiagnostics,
        array: Rc<dyn GpuBuffer>,
        name: &str,
        stride: usize,
        offset: usize,
        n_components: u8,
        attribute_type: AttributeType,
    ) -> Result<Self, InvalidAttributeError> {
        let role = AttributeRole::resolve(name, n_components).inspect_err(|e| {
            log::warn!("Failed to create vertex attribute: {e}");
        })?;

        Ok(Self {
            array: RefCell::new(array),
            name: name.to_owned(),
            stride,
            offset,
            n_components,
            attribute_type,
            role,
            normalized: Cell::new(role == AttributeRole::Color),
            immutable_ref: Cell::new(0),
            diagnostics,
        })
    }

    /// The name the attribute was declared with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The semantic role resolved from the name.
    pub fn role(&self) -> AttributeRole {
        self.role
    }

    /// The texture unit for texture coordinate attributes, `0` otherwise.
    pub fn texture_unit(&self) -> u32 {
        match self.role {
            AttributeRole::TextureCoord { unit } => unit,
            _ => 0,
        }
    }

    /// Bytes between vertices as declared; `0` means tightly packed.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Byte offset of the first vertex in the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Components per vertex.
    pub fn n_components(&self) -> u8 {
        self.n_components
    }

    /// The type of each component.
    pub fn attribute_type(&self) -> AttributeType {
        self.attribute_type
    }

    /// The number of bytes between consecutive vertices, resolving a stride of `0`.
    pub fn effective_stride(&self) -> usize {
        if self.stride == 0 {
            self.n_components as usize * self.attribute_type.size()
        } else {
            self.stride
        }
    }

    /// Whether integer components are mapped to `[0, 1]` (or `[-1, 1]`) when read.
    pub fn normalized(&self) -> bool {
        self.normalized.get()
    }

    /// Sets whether integer components are normalized when read.
    pub fn set_normalized(&self, normalized: bool) {
        if self.is_pinned() {
            self.diagnostics
                .report_midscene_mutation(&format!("the normalized flag of '{}'", self.name));
        }
        self.normalized.set(normalized);
    }

    /// Returns a new handle to the backing buffer.
    pub fn array(&self) -> Rc<dyn GpuBuffer> {
        self.array.borrow().clone()
    }

    /// Borrows the backing buffer without touching its reference count.
    pub fn borrow_array(&self) -> Ref<'_, Rc<dyn GpuBuffer>> {
        self.array.borrow()
    }

    /// Replaces the backing buffer.
    ///
    /// Pins held on the attribute move from the old buffer to the new one.
    pub fn set_array(&self, array: Rc<dyn GpuBuffer>) {
        let pins = self.immutable_ref.get();
        if pins > 0 {
            self.diagnostics
                .report_midscene_mutation(&format!("the buffer of '{}'", self.name));
            for _ in 0..pins {
                array.immutable_ref();
            }
        }

        let old = self.array.replace(array);
        for _ in 0..pins {
            if let Err(e) = old.immutable_unref() {
                log::warn!("{e}");
            }
        }
    }

    /// The number of outstanding pins.
    pub fn immutable_ref_count(&self) -> u32 {
        self.immutable_ref.get()
    }

    /// Returns `true` while at least one draw pins the attribute.
    pub fn is_pinned(&self) -> bool {
        self.immutable_ref.get() > 0
    }

    /// Pins the attribute and its buffer.
    pub fn immutable_ref_acquire(&self) {
        self.immutable_ref.set(self.immutable_ref.get() + 1);
        self.array.borrow().immutable_ref();
    }

    /// Releases one pin taken by [`VertexAttribute::immutable_ref_acquire`].
    ///
    /// # Errors
    /// Returns [`PreconditionViolation::ImmutableRefUnderflow`] if the attribute
    /// is not pinned. The counter is left untouched in that case.
    pub fn immutable_ref_release(&self) -> Result<(), PreconditionViolation> {
        let count = self.immutable_ref.get();
        if count == 0 {
            return Err(PreconditionViolation::ImmutableRefUnderflow {
                name: self.name.clone(),
            });
        }
        self.immutable_ref.set(count - 1);
        self.array.borrow().immutable_unref()
    }

    /// Pins the attribute until the returned guard is dropped.
    pub fn pin(&self) -> ImmutablePin<'_> {
        self.immutable_ref_acquire();
        ImmutablePin { attribute: self }
    }
}

/// A scoped pin on a [`VertexAttribute`], released on drop.
#[derive(Debug)]
#[must_use = "the attribute is unpinned as soon as the guard is dropped"]
pub struct ImmutablePin<'a> {
    attribute: &'a VertexAttribute,
}

impl Drop for ImmutablePin<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.attribute.immutable_ref_release() {
            log::warn!("{e}");
        }
    }
}
