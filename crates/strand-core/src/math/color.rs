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

//! Defines the `LinearRgba` color type.

/// Represents a color in a **linear RGBA** color space using `f32` components.
///
/// `#[repr(C)]` keeps the layout stable so the color can be handed to a driver
/// as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct LinearRgba {
    /// The red component in linear space.
    pub r: f32,
    /// The green component in linear space.
    pub g: f32,
    /// The blue component in linear space.
    pub b: f32,
    /// The alpha (opacity) component.
    pub a: f32,
}

impl LinearRgba {
    /// Opaque green (`[0.0, 1.0, 0.0, 1.0]`), the color of wireframe overlays.
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    /// Opaque white (`[1.0, 1.0, 1.0, 1.0]`).
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Fully transparent black (`[0.0, 0.0, 0.0, 0.0]`).
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a new `LinearRgba` with explicit RGBA values.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a new opaque `LinearRgba` (alpha = 1.0).
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Creates a color from 8-bit unsigned components, as fixed-function APIs take them.
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Returns `true` if the color is not fully opaque.
    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.a < 1.0
    }
}

impl Default for LinearRgba {
    /// Opaque white, the color of a freshly created pipeline.
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_rgba8_matches_green_constant() {
        let green = LinearRgba::from_rgba8(0x00, 0xff, 0x00, 0xff);
        assert_eq!(green, LinearRgba::GREEN);
    }

    #[test]
    fn test_from_rgba8_scales_components() {
        let c = LinearRgba::from_rgba8(51, 102, 153, 128);
        assert_relative_eq!(c.r, 0.2);
        assert_relative_eq!(c.g, 0.4);
        assert_relative_eq!(c.b, 0.6);
        assert_relative_eq!(c.a, 128.0 / 255.0);
        assert!(c.is_translucent());
    }

    #[test]
    fn test_default_is_opaque_white() {
        assert_eq!(LinearRgba::default(), LinearRgba::WHITE);
        assert!(!LinearRgba::default().is_translucent());
        assert!(LinearRgba::TRANSPARENT.is_translucent());
    }
}
