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

//! Bounded object-key interning.
//!
//! Payloads of the same shape repeat the same object keys over and over. When
//! enabled, the cache hands out shared `Arc<str>` copies of keys received as
//! borrowed bytes, so a session reused across many decodes builds each key
//! string once.
//!
//! The table is bounded: once `max` keys are interned, unseen keys are still
//! returned (as fresh, uncached strings) but never inserted. Entries are not
//! evicted; shapes seen first win.

use std::collections::HashSet;
use std::sync::Arc;

/// Statistics for key cache tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyCacheStatistics {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that built a new string.
    pub misses: u64,
    /// Interned keys.
    pub size: usize,
    /// Maximum number of interned keys.
    pub capacity: usize,
}

impl KeyCacheStatistics {
    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded interning table for object keys.
#[derive(Debug, Default)]
pub struct KeyCache {
    keys: HashSet<Arc<str>>,
    max: usize,
    hits: u64,
    misses: u64,
}

impl KeyCache {
    /// Create a cache holding at most `max` keys; 0 disables it.
    pub fn new(max: usize) -> Self {
        Self {
            keys: HashSet::with_capacity(max.min(1024)),
            max,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns true when the cache interns keys.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.max > 0
    }

    /// Return the shared copy of `key`, interning it while there is room.
    pub fn intern(&mut self, key: &str) -> Arc<str> {
        if let Some(hit) = self.keys.get(key) {
            self.hits += 1;
            return Arc::clone(hit);
        }
        self.misses += 1;
        let fresh: Arc<str> = Arc::from(key);
        if self.keys.len() < self.max {
            self.keys.insert(Arc::clone(&fresh));
        }
        fresh
    }

    /// Number of interned keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if nothing is interned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Current statistics.
    pub fn statistics(&self) -> KeyCacheStatistics {
        KeyCacheStatistics {
            hits: self.hits,
            misses: self.misses,
            size: self.keys.len(),
            capacity: self.max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_by_default() {
        let cache = KeyCache::default();
        assert!(!cache.is_enabled());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_intern_shares_allocation() {
        let mut cache = KeyCache::new(8);
        let a = cache.intern("name");
        let b = cache.intern("name");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.statistics().hits, 1);
        assert_eq!(cache.statistics().misses, 1);
    }

    #[test]
    fn test_bounded_size() {
        let mut cache = KeyCache::new(2);
        cache.intern("a");
        cache.intern("b");
        let c1 = cache.intern("c");
        let c2 = cache.intern("c");
        assert_eq!(cache.len(), 2);
        assert_eq!(&*c1, "c");
        assert!(!Arc::ptr_eq(&c1, &c2));
    }

    #[test]
    fn test_hit_rate() {
        let mut cache = KeyCache::new(4);
        assert_eq!(cache.statistics().hit_rate(), 0.0);
        cache.intern("k");
        cache.intern("k");
        cache.intern("k");
        cache.intern("j");
        assert!((cache.statistics().hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
