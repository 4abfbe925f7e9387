// Dweve Typefold - Typed Event Decoding
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for event decoding.
//!
//! Every strategy handler returns [`UnfoldResult`]. The decode context never
//! catches, wraps or retries an error: the first failure aborts the current
//! decode and the session must be [`reset`](crate::Unfolder::reset) before
//! it is reused.
//!
//! # Error Categories
//!
//! - **Target**: the destination cannot be bound at all
//! - **Structural**: an event arrived in a position no active strategy accepts
//! - **Conversion**: a primitive value does not fit the bound destination
//! - **Limit**: a configured or fixed capacity was exceeded
//!
//! ```rust
//! use typefold::{ErrorCategory, UnfoldError};
//!
//! let err = UnfoldError::conversion("i64", "u8", "300 is out of range");
//! assert_eq!(err.category(), ErrorCategory::Conversion);
//! assert!(err.to_string().contains("u8"));
//! ```

use std::fmt;
use thiserror::Error;

/// Broad classification of an [`UnfoldError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Destination could not be bound.
    Target,
    /// Event received in an invalid position.
    Structural,
    /// Value not representable in the destination.
    Conversion,
    /// Depth or capacity limit exceeded.
    Limit,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target => write!(f, "TargetError"),
            Self::Structural => write!(f, "StructuralError"),
            Self::Conversion => write!(f, "ConversionError"),
            Self::Limit => write!(f, "LimitError"),
        }
    }
}

/// Errors that can occur while binding a destination or decoding events.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnfoldError {
    /// The destination is not a mutable location.
    #[error("target of type {type_name} must be a mutable reference")]
    RequiresMutableTarget { type_name: &'static str },

    /// The destination type has no decoding strategy.
    #[error("unsupported destination type {type_name}: {reason}")]
    Unsupported {
        type_name: &'static str,
        reason: String,
    },

    /// A strategy accessed its slot as the wrong type.
    #[error("destination type mismatch: expected {expected}, found {found}")]
    TargetMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// An event the current strategy cannot accept in its position.
    #[error("unexpected {event} while decoding {target}")]
    UnexpectedEvent {
        event: &'static str,
        target: &'static str,
    },

    /// Key bookkeeping violation (value without key, key after key, ...).
    #[error("structural error: {0}")]
    Structural(String),

    /// A finish event with no open structure at the root level.
    #[error("unbalanced {event}: no open structure to close")]
    StackUnderflow { event: &'static str },

    /// A primitive value cannot be represented in the destination.
    #[error("cannot convert {from} into {to}: {message}")]
    Conversion {
        from: &'static str,
        to: &'static str,
        message: String,
    },

    /// Nesting exceeds the configured maximum depth.
    #[error("nesting depth {depth} exceeds limit {limit}")]
    DepthLimitExceeded { depth: usize, limit: usize },

    /// More elements than a fixed-size destination can hold.
    #[error("destination {type_name} holds at most {capacity} elements")]
    CapacityExceeded {
        type_name: &'static str,
        capacity: usize,
    },
}

impl UnfoldError {
    /// Create an unsupported-type error.
    #[inline]
    pub fn unsupported(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            type_name,
            reason: reason.into(),
        }
    }

    /// Create an unexpected-event error.
    #[inline]
    pub fn unexpected(event: &'static str, target: &'static str) -> Self {
        Self::UnexpectedEvent { event, target }
    }

    /// Create a structural (key state) error.
    #[inline]
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural(message.into())
    }

    /// Create a conversion error.
    #[inline]
    pub fn conversion(from: &'static str, to: &'static str, message: impl Into<String>) -> Self {
        Self::Conversion {
            from,
            to,
            message: message.into(),
        }
    }

    /// The category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::RequiresMutableTarget { .. }
            | Self::Unsupported { .. }
            | Self::TargetMismatch { .. } => ErrorCategory::Target,
            Self::UnexpectedEvent { .. } | Self::Structural(_) | Self::StackUnderflow { .. } => {
                ErrorCategory::Structural
            }
            Self::Conversion { .. } => ErrorCategory::Conversion,
            Self::DepthLimitExceeded { .. } | Self::CapacityExceeded { .. } => {
                ErrorCategory::Limit
            }
        }
    }

    /// Returns true for errors caused by event ordering.
    #[inline]
    pub fn is_structural(&self) -> bool {
        self.category() == ErrorCategory::Structural
    }
}

/// Result type for decoding operations.
pub type UnfoldResult<T> = Result<T, UnfoldError>;
