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

//! Defines the error types of the draw-submission layer.
//!
//! Nothing in a draw is fatal: these errors surface from attribute construction,
//! pin bookkeeping and buffer reads. Draw entry points log them and carry on.

use std::fmt;

/// A malformed vertex attribute declaration, reported at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidAttributeError {
    /// A reserved semantic name was declared with a component count its channel cannot take.
    InvalidComponentCount {
        /// The attribute name as declared.
        name: String,
        /// The semantic role the name resolved to.
        role: &'static str,
        /// The declared number of components.
        n_components: u8,
        /// The component counts the role accepts, for diagnostics.
        expected: &'static str,
    },
    /// A texture coordinate name carries a unit suffix that is not an unsigned integer.
    MalformedTextureUnit {
        /// The attribute name as declared.
        name: String,
    },
    /// A texture coordinate name names a unit beyond what a context can track.
    TextureUnitOutOfRange {
        /// The attribute name as declared.
        name: String,
        /// The parsed unit.
        unit: u32,
    },
    /// The name uses the reserved prefix but matches no known semantic.
    UnknownReservedName {
        /// The attribute name as declared.
        name: String,
    },
}

impl fmt::Display for InvalidAttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidAttributeError::InvalidComponentCount {
                name,
                role,
                n_components,
                expected,
            } => write!(
                f,
                "Attribute '{name}' is a {role} channel with {n_components} components, expected {expected}"
            ),
            InvalidAttributeError::MalformedTextureUnit { name } => write!(
                f,
                "Texture coordinate attribute '{name}' should either be named \"strand_tex_coord_in\" or carry a unit index like \"strand_tex_coord2_in\""
            ),
            InvalidAttributeError::TextureUnitOutOfRange { name, unit } => write!(
                f,
                "Texture coordinate attribute '{name}' uses unit {unit}, which is out of range"
            ),
            InvalidAttributeError::UnknownReservedName { name } => {
                write!(f, "Unknown reserved attribute name '{name}'")
            }
        }
    }
}

impl std::error::Error for InvalidAttributeError {}

/// A broken calling contract detected at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionViolation {
    /// An immutable pin was released more times than it was acquired.
    ImmutableRefUnderflow {
        /// A label for the attribute or buffer whose counter was already zero.
        name: String,
    },
}

impl fmt::Display for PreconditionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreconditionViolation::ImmutableRefUnderflow { name } => write!(
                f,
                "Immutable reference on '{name}' released while not held"
            ),
        }
    }
}

impl std::error::Error for PreconditionViolation {}

/// An error while accessing the storage behind a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The buffer could not be mapped for the requested access.
    MapFailed {
        /// Why the mapping was refused.
        reason: String,
    },
    /// A read went past the end of the mapped range.
    OutOfBounds {
        /// The byte offset that was requested.
        offset: usize,
        /// The size of the mapped range in bytes.
        len: usize,
    },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::MapFailed { reason } => write!(f, "Failed to map buffer: {reason}"),
            ResourceError::OutOfBounds { offset, len } => write!(
                f,
                "Buffer access at byte {offset} is out of bounds for a mapping of {len} bytes"
            ),
        }
    }
}

impl std::error::Error for ResourceError {}

/// The umbrella error of the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrandError {
    /// A vertex attribute could not be created.
    InvalidAttribute(InvalidAttributeError),
    /// A calling contract was broken.
    Precondition(PreconditionViolation),
    /// A buffer could not be accessed.
    Resource(ResourceError),
}

impl fmt::Display for StrandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrandError::InvalidAttribute(err) => write!(f, "Invalid vertex attribute: {err}"),
            StrandError::Precondition(err) => write!(f, "Precondition violated: {err}"),
            StrandError::Resource(err) => write!(f, "Resource error: {err}"),
        }
    }
}

impl std::error::Error for StrandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StrandError::InvalidAttribute(err) => Some(err),
            StrandError::Precondition(err) => Some(err),
            StrandError::Resource(err) => Some(err),
        }
    }
}

impl From<InvalidAttributeError> for StrandError {
    fn from(err: InvalidAttributeError) -> Self {
        StrandError::InvalidAttribute(err)
    }
}

impl From<PreconditionViolation> for StrandError {
    fn from(err: PreconditionViolation) -> Self {
        StrandError::Precondition(err)
    }
}

impl From<ResourceError> for StrandError {
    fn from(err: ResourceError) -> Self {
        StrandError::Resource(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn invalid_attribute_error_display() {
        let err = InvalidAttributeError::InvalidComponentCount {
            name: "strand_position_in".to_string(),
            role: "position",
            n_components: 1,
            expected: "2, 3 or 4",
        };
        assert_eq!(
            format!("{err}"),
            "Attribute 'strand_position_in' is a position channel with 1 components, expected 2, 3 or 4"
        );

        let err = InvalidAttributeError::UnknownReservedName {
            name: "strand_banana".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Unknown reserved attribute name 'strand_banana'"
        );
    }

    #[test]
    fn strand_error_wraps_precondition_violation() {
        let err: StrandError = PreconditionViolation::ImmutableRefUnderflow {
            name: "strand_color_in".to_string(),
        }
        .into();
        assert_eq!(
            format!("{err}"),
            "Precondition violated: Immutable reference on 'strand_color_in' released while not held"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn strand_error_wraps_resource_error() {
        let err: StrandError = ResourceError::OutOfBounds {
            offset: 64,
            len: 48,
        }
        .into();
        assert_eq!(
            format!("{err}"),
            "Resource error: Buffer access at byte 64 is out of bounds for a mapping of 48 bytes"
        );
        assert!(err.source().is_some());
    }
}
