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

//! Warn-once bookkeeping shared by everything created from one draw context.

use std::cell::Cell;
use std::rc::Rc;

/// A handle to the warn-once flags of a draw context.
///
/// Cloning the handle shares the flags. A new context starts with every flag
/// cleared, so a warning fires at most once per context.
#[derive(Debug, Clone, Default)]
pub struct DrawDiagnostics {
    midscene_mutation_warned: Rc<Cell<bool>>,
}

impl DrawDiagnostics {
    /// Creates a fresh set of flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports that `what` was mutated while pinned by an outstanding draw.
    ///
    /// Only the first report of a context is logged.
    pub fn report_midscene_mutation(&self, what: &str) {
        if !self.midscene_mutation_warned.replace(true) {
            log::warn!(
                "Mid-scene modification of {what}: the attribute is in use by a draw that has not completed yet"
            );
        }
    }

    /// Returns `true` once a mid-scene mutation has been reported.
    pub fn midscene_warning_emitted(&self) -> bool {
        self.midscene_mutation_warned.get()
    }
}
