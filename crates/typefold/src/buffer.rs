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

//! Session scratch buffer.
//!
//! `...Ref` events borrow bytes that are only valid during the call. Strategies
//! that must keep such bytes until a later event (a pending object key waiting
//! for its value) copy them here instead of allocating. Copies are addressed by
//! [`ScratchRef`] handles rather than references so the buffer can live inside
//! the session it serves.
//!
//! Copies are released in LIFO order, which matches the nesting discipline of
//! the decode stacks; the buffer keeps its capacity across
//! [`reset`](ScratchBuffer::reset) calls so a reused session stops allocating
//! once it has seen its largest payload.

use std::ops::Range;

/// Handle to bytes copied into a [`ScratchBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchRef {
    range: Range<usize>,
}

impl ScratchRef {
    /// Number of bytes referenced.
    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns true if the handle references no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Growable byte arena scoped to one decode session.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    data: Vec<u8>,
}

impl ScratchBuffer {
    /// Create a buffer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Copy `bytes` into the buffer.
    pub fn copy(&mut self, bytes: &[u8]) -> ScratchRef {
        let start = self.data.len();
        self.data.extend_from_slice(bytes);
        ScratchRef {
            range: start..self.data.len(),
        }
    }

    /// Access previously copied bytes.
    ///
    /// Handles are only meaningful for the buffer that produced them and
    /// until they are released; stale handles yield an empty slice.
    #[inline]
    pub fn get(&self, handle: &ScratchRef) -> &[u8] {
        self.data.get(handle.range.clone()).unwrap_or_default()
    }

    /// Release a copy; space is reclaimed when the copy is the newest one.
    pub fn release(&mut self, handle: ScratchRef) {
        if handle.range.end == self.data.len() {
            self.data.truncate(handle.range.start);
        }
    }

    /// Drop all copies, keeping the capacity.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Bytes currently in use.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if no bytes are in use.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_and_get() {
        let mut buf = ScratchBuffer::with_capacity(16);
        let a = buf.copy(b"alpha");
        let b = buf.copy(b"beta");
        assert_eq!(buf.get(&a), b"alpha");
        assert_eq!(buf.get(&b), b"beta");
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn test_release_lifo_reclaims_space() {
        let mut buf = ScratchBuffer::with_capacity(16);
        let a = buf.copy(b"one");
        let b = buf.copy(b"two");
        buf.release(b);
        assert_eq!(buf.len(), 3);
        buf.release(a);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_release_out_of_order_keeps_newer_copy() {
        let mut buf = ScratchBuffer::with_capacity(16);
        let a = buf.copy(b"one");
        let b = buf.copy(b"two");
        buf.release(a);
        assert_eq!(buf.get(&b), b"two");
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut buf = ScratchBuffer::with_capacity(4);
        buf.copy(&[0u8; 128]);
        let capacity = buf.capacity();
        buf.reset();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), capacity);
    }

    #[test]
    fn test_stale_handle_is_empty() {
        let mut buf = ScratchBuffer::default();
        let a = buf.copy(b"gone");
        buf.reset();
        assert!(buf.get(&a).is_empty());
        assert_eq!(a.len(), 4);
    }
}
