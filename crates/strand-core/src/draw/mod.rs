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

//! The draw-submission core: layer validation, state flushing, draw execution
//! and the debug wireframe overlay, all driven through a [`DrawContext`].

mod context;
mod executor;
mod flush;
mod validate;
pub mod wireframe;

pub use self::context::DrawContext;
pub use self::executor::index_byte_offset;
pub use self::flush::FlushedPipeline;
pub use self::validate::LayerValidation;
pub use self::wireframe::{reconstruct, wire_edges, P3Vertex, WireLines};
