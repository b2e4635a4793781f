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

//! Defines the contracts of the collaborators the draw path works against.
//!
//! - [`GpuBuffer`]: shared vertex and index storage.
//! - [`Texture`]: the texture bound to a pipeline layer.
//! - [`Pipeline`]: an immutable-once-published state object.
//! - [`GraphicsDriver`]: the raw state and draw calls of a graphics context.

mod buffer;
mod driver;
mod pipeline;
mod texture;

pub use self::buffer::{BoundBuffer, BufferId, GpuBuffer, MappedBuffer, MappedBytes};
pub use self::driver::{AttributePointer, GraphicsDriver, IndexPointer};
pub use self::pipeline::Pipeline;
pub use self::texture::Texture;
