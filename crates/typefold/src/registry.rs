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

//! Process-wide type resolution registry.
//!
//! Generic strategies are built from a type's declared [`Shape`] the first
//! time the type is bound under a given field-name tag, then cached for the
//! life of the process. The cache is append-only: entries are never evicted.
//!
//! # Concurrency
//!
//! Lookups take a shared lock. On a miss the strategy is built with no lock
//! held, leaked to `'static`, and only then published under a brief
//! exclusive lock, so readers never observe a partially built strategy.
//! Racing threads may each build the same strategy; the last one to publish
//! wins and the duplicates stay valid for whoever holds them.

use crate::error::{UnfoldError, UnfoldResult};
use crate::shape::{Shape, TypeHandle};
use crate::strategy::{
    ArrayStrategy, BoxStrategy, MapStrategy, OptionStrategy, ScalarStrategy, SeqStrategy,
    Strategy, StructStrategy,
};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

type Entries = HashMap<Arc<str>, HashMap<TypeId, &'static dyn Strategy>>;

/// Cache of generic strategies keyed by tag and type.
#[derive(Default)]
pub struct TypeRegistry {
    entries: RwLock<Entries>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached strategy for the type under `tag`.
    pub fn find(&self, tag: &str, id: TypeId) -> Option<&'static dyn Strategy> {
        self.entries
            .read()
            .get(tag)
            .and_then(|by_type| by_type.get(&id))
            .copied()
    }

    /// Cached strategy for the type, building and caching it on a miss.
    ///
    /// # Errors
    ///
    /// Returns [`UnfoldError::Unsupported`] if the type's shape cannot be
    /// decoded (opaque types, structs with clashing field names).
    pub fn resolve(&self, tag: &str, handle: &TypeHandle) -> UnfoldResult<&'static dyn Strategy> {
        if let Some(strategy) = self.find(tag, handle.id()) {
            return Ok(strategy);
        }

        let strategy = build(tag, handle)?;
        debug!(type_name = handle.name(), tag, "built generic strategy");

        self.entries
            .write()
            .entry(Arc::from(tag))
            .or_default()
            .insert(handle.id(), strategy);
        Ok(strategy)
    }

    /// Number of cached strategies across all tags.
    pub fn len(&self) -> usize {
        self.entries.read().values().map(HashMap::len).sum()
    }

    /// Returns true if nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("len", &self.len())
            .finish()
    }
}

/// The process-wide registry.
pub fn registry() -> &'static TypeRegistry {
    static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();
    REGISTRY.get_or_init(TypeRegistry::new)
}

fn build(tag: &str, handle: &TypeHandle) -> UnfoldResult<&'static dyn Strategy> {
    let strategy: Box<dyn Strategy> = match handle.shape() {
        Shape::Scalar(shape) => Box::new(ScalarStrategy::new(handle.name(), shape)),
        Shape::Struct(shape) => Box::new(StructStrategy::new(shape, tag)?),
        Shape::Seq(shape) => Box::new(SeqStrategy::new(handle.name(), shape)),
        Shape::Array(shape) => Box::new(ArrayStrategy::new(handle.name(), shape)),
        Shape::Map(shape) => Box::new(MapStrategy::new(handle.name(), shape)),
        Shape::Optional(shape) => Box::new(OptionStrategy::new(handle.name(), shape)),
        Shape::Pointer(shape) => Box::new(BoxStrategy::new(handle.name(), shape)),
        Shape::Opaque => {
            return Err(UnfoldError::unsupported(
                handle.name(),
                "type has no shape and no direct strategy",
            ))
        }
    };
    Ok(Box::leak(strategy))
}
