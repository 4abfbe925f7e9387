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

//! Decode stacks and their entries.

use crate::buffer::ScratchRef;
use crate::strategy::Strategy;
use std::fmt;
use std::sync::Arc;

/// LIFO stack backed by a `Vec` whose capacity survives `clear`.
#[derive(Debug, Clone)]
pub(crate) struct Stack<T> {
    items: Vec<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Stack<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, item: T) {
        self.items.push(item);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    #[inline]
    pub(crate) fn top(&self) -> Option<&T> {
        self.items.last()
    }

    #[inline]
    pub(crate) fn top_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

/// Lifecycle of one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Bound to a location, waiting for the value.
    #[default]
    Bound,
    /// The level's own array or object has started.
    Open,
}

/// One strategy-stack entry.
#[derive(Clone, Copy)]
pub(crate) struct Frame {
    pub(crate) strategy: &'static dyn Strategy,
    pub(crate) phase: Phase,
}

impl Frame {
    pub(crate) fn bound(strategy: &'static dyn Strategy) -> Self {
        Self {
            strategy,
            phase: Phase::Bound,
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("strategy", &self.strategy.type_name())
            .field("phase", &self.phase)
            .finish()
    }
}

/// An object key received but not yet consumed by a value.
///
/// Obtained from [`UnfoldCtx::take_key`](crate::UnfoldCtx::take_key); read it
/// with [`UnfoldCtx::key_str`](crate::UnfoldCtx::key_str) and hand it back with
/// [`UnfoldCtx::release_key`](crate::UnfoldCtx::release_key) or
/// [`UnfoldCtx::key_into_string`](crate::UnfoldCtx::key_into_string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingKey(pub(crate) KeyRepr);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyRepr {
    Owned(String),
    Interned(Arc<str>),
    Scratch(ScratchRef),
}
