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

//! Index data for indexed draws.

use super::enums::IndexFormat;
use crate::renderer::traits::GpuBuffer;
use std::rc::Rc;

/// A range of indices stored in a shared buffer.
#[derive(Debug, Clone)]
pub struct Indices {
    array: Rc<dyn GpuBuffer>,
    offset: usize,
    format: IndexFormat,
}

impl Indices {
    /// Indices starting at the beginning of `array`.
    pub fn new(array: Rc<dyn GpuBuffer>, format: IndexFormat) -> Self {
        Self::with_offset(array, 0, format)
    }

    /// Indices starting `offset` bytes into `array`.
    pub fn with_offset(array: Rc<dyn GpuBuffer>, offset: usize, format: IndexFormat) -> Self {
        Self {
            array,
            offset,
            format,
        }
    }

    /// The buffer holding the indices.
    pub fn array(&self) -> &Rc<dyn GpuBuffer> {
        &self.array
    }

    /// The byte offset of the first index within the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Moves the start of the index range.
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// The width of each index.
    pub fn format(&self) -> IndexFormat {
        self.format
    }
}
