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

//! Session configuration.
//!
//! [`UnfoldOptions`] provides both direct field access and a fluent builder:
//!
//! ```rust
//! use typefold::UnfoldOptions;
//!
//! let options = UnfoldOptions::builder()
//!     .tag("json")
//!     .key_cache_size(256)
//!     .max_depth(64)
//!     .build();
//!
//! assert_eq!(options.tag(), "json");
//! assert_eq!(options.key_cache_size, 256);
//! ```

use std::sync::Arc;

/// Default metadata tag used to resolve struct field names.
pub const DEFAULT_TAG: &str = "struct";

/// Default initial scratch buffer capacity in bytes.
pub const DEFAULT_SCRATCH_BUFFER_SIZE: usize = 1024;

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Options for one decode session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UnfoldOptions {
    /// Tag whose values name struct fields (default: `"struct"`).
    pub tag: Arc<str>,
    /// Maximum number of interned object keys; 0 disables the cache.
    pub key_cache_size: usize,
    /// Initial scratch buffer capacity in bytes (default: 1024).
    pub scratch_buffer_size: usize,
    /// Maximum nesting depth, root level included (default: 1000).
    pub max_depth: usize,
}

impl Default for UnfoldOptions {
    fn default() -> Self {
        Self {
            tag: Arc::from(DEFAULT_TAG),
            key_cache_size: 0,
            scratch_buffer_size: DEFAULT_SCRATCH_BUFFER_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl UnfoldOptions {
    /// Create a builder starting from the defaults.
    pub fn builder() -> UnfoldOptionsBuilder {
        UnfoldOptionsBuilder::new()
    }

    /// The configured field-name tag.
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// Fluent builder for [`UnfoldOptions`].
#[derive(Debug, Clone, Default)]
pub struct UnfoldOptionsBuilder {
    options: UnfoldOptions,
}

impl UnfoldOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tag used to resolve struct field names.
    ///
    /// # Examples
    ///
    /// ```text
    /// UnfoldOptions::builder().tag("json")
    /// ```
    pub fn tag(mut self, tag: impl AsRef<str>) -> Self {
        self.options.tag = Arc::from(tag.as_ref());
        self
    }

    /// Enable the key cache with the given maximum size (0 disables it).
    pub fn key_cache_size(mut self, size: usize) -> Self {
        self.options.key_cache_size = size;
        self
    }

    /// Set the initial scratch buffer capacity in bytes.
    pub fn scratch_buffer_size(mut self, size: usize) -> Self {
        self.options.scratch_buffer_size = size;
        self
    }

    /// Set the maximum nesting depth.
    ///
    /// # Parameters
    ///
    /// - `depth`: Maximum number of simultaneously open levels, root included
    ///   (default: 1000)
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Finish building.
    pub fn build(self) -> UnfoldOptions {
        self.options
    }
}
