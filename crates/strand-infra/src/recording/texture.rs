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

//! Software textures that simulate atlas residency, slicing and waste.

use std::cell::Cell;
use std::rc::Rc;
use strand_core::renderer::Texture;

/// A texture with no pixel storage, only the properties the draw path queries.
///
/// A texture living in an atlas migrates to storage of its own when told it
/// will be used with arbitrary geometry. Slicing and waste are permanent: a
/// texture with either never supports hardware repeat.
#[derive(Debug, Default)]
pub struct SoftwareTexture {
    in_atlas: Cell<bool>,
    sliced: bool,
    has_waste: bool,
    mipmaps_dirty: Cell<bool>,
    migrations: Cell<u32>,
}

impl SoftwareTexture {
    /// A single-slice texture without waste.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the texture in an atlas.
    pub fn in_atlas(self) -> Self {
        self.in_atlas.set(true);
        self
    }

    /// Splits the texture into several hardware textures.
    pub fn sliced(mut self) -> Self {
        self.sliced = true;
        self
    }

    /// Pads the texture, leaving waste at its edges.
    pub fn with_waste(mut self) -> Self {
        self.has_waste = true;
        self
    }

    /// Marks the mipmap chain as out of date.
    pub fn with_dirty_mipmaps(self) -> Self {
        self.mipmaps_dirty.set(true);
        self
    }

    /// Wraps the texture for use as a layer texture.
    pub fn into_rc(self) -> Rc<Self> {
        Rc::new(self)
    }

    /// Returns `true` while the texture lives in an atlas.
    pub fn is_in_atlas(&self) -> bool {
        self.in_atlas.get()
    }

    /// Returns `true` while the mipmap chain is out of date.
    pub fn mipmaps_dirty(&self) -> bool {
        self.mipmaps_dirty.get()
    }

    /// The number of times the texture left an atlas.
    pub fn migrations(&self) -> u32 {
        self.migrations.get()
    }
}

impl Texture for SoftwareTexture {
    fn notify_non_quad_usage(&self) {
        if self.in_atlas.replace(false) {
            log::debug!("Migrating texture out of its atlas for non-quad usage");
            self.migrations.set(self.migrations.get() + 1);
        }
    }

    fn ensure_mip_preparation(&self) {
        if self.mipmaps_dirty.replace(false) {
            log::trace!("Regenerating mipmaps before drawing");
        }
    }

    fn supports_hardware_repeat(&self) -> bool {
        !self.in_atlas.get() && !self.sliced && !self.has_waste
    }
}
