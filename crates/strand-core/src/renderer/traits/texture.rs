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

//! The contract of a texture bound to a pipeline layer.

use std::fmt::Debug;

/// The queries and notifications the layer validator needs from a texture.
///
/// Atlas packing, slicing and mipmap generation live behind this trait; the draw
/// path only reacts to their outcome.
pub trait Texture: Debug {
    /// Tells the texture it is about to be drawn with arbitrary, non-quad geometry.
    ///
    /// A texture that shares storage with others (e.g. in an atlas) should migrate
    /// to storage of its own, since texture coordinates can then leave its sub-region.
    fn notify_non_quad_usage(&self);

    /// Completes any pending mipmap preparation so the storage is final.
    fn ensure_mip_preparation(&self);

    /// Returns `true` if the texture can be sampled with native repeat addressing.
    ///
    /// Sliced textures and textures padded with waste pixels cannot.
    fn supports_hardware_repeat(&self) -> bool;
}
