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

//! Per-context settings for the draw-submission layer.

use super::enums::FrontFace;
use super::pipeline::LegacyState;
use crate::strand_bitflags;

/// The environment variable read by [`DebugFlags::from_env`].
pub const DEBUG_ENV_VAR: &str = "STRAND_DEBUG";

strand_bitflags! {
    /// Debugging aids that change what a draw submits.
    pub struct DebugFlags: u32 {
        /// Outline every triangle-based draw with a green line overlay.
        const WIREFRAME = 1 << 0;
        /// Force blending off on every drawn pipeline.
        const DISABLE_BLENDING = 1 << 1;
        /// Disable texturing on every layer of every drawn pipeline.
        const DISABLE_TEXTURING = 1 << 2;
    }
}

impl DebugFlags {
    const NAMES: [(&'static str, DebugFlags); 3] = [
        ("wireframe", DebugFlags::WIREFRAME),
        ("disable-blending", DebugFlags::DISABLE_BLENDING),
        ("disable-texturing", DebugFlags::DISABLE_TEXTURING),
    ];

    /// Parses a comma or whitespace separated list of flag names.
    ///
    /// Names are case-insensitive and `_` may be used in place of `-`. `all`
    /// enables every flag. Unknown names are logged and ignored.
    pub fn parse(list: &str) -> Self {
        let mut flags = DebugFlags::EMPTY;
        for token in list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
        {
            let token = token.to_ascii_lowercase().replace('_', "-");
            if token == "all" {
                for (_, flag) in Self::NAMES {
                    flags.insert(flag);
                }
                continue;
            }
            match Self::NAMES.iter().find(|(name, _)| *name == token) {
                Some((_, flag)) => flags.insert(*flag),
                None => log::warn!("Ignoring unknown debug flag '{token}' in {DEBUG_ENV_VAR}"),
            }
        }
        flags
    }

    /// Reads the flags from the `STRAND_DEBUG` environment variable.
    ///
    /// Returns no flags if the variable is unset or not valid unicode.
    pub fn from_env() -> Self {
        std::env::var(DEBUG_ENV_VAR)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }
}

/// A collection of settings owned by a draw context.
#[derive(Debug, Clone, Default)]
pub struct DrawSettings {
    /// Debugging aids applied to every draw.
    pub debug_flags: DebugFlags,
    /// If `true`, back-facing triangles are culled.
    pub backface_culling: bool,
    /// The winding order of front-facing triangles.
    pub front_face: FrontFace,
    /// Deprecated state applied on top of every pipeline, if any.
    pub legacy_state: Option<LegacyState>,
}

impl DrawSettings {
    /// Default settings with the debug flags taken from the environment.
    pub fn from_env() -> Self {
        Self {
            debug_flags: DebugFlags::from_env(),
            ..Default::default()
        }
    }
}
