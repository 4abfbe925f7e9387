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

//! Fluent builder for event scripts.

use crate::events::Event;
use typefold::BaseType;

/// Builder for event scripts.
///
/// # Examples
///
/// ```
/// use typefold_test::{Event, ScriptBuilder};
///
/// let script = ScriptBuilder::new()
///     .object(1)
///     .key("ids")
///     .array(2)
///     .event(Event::U64(1))
///     .event(Event::U64(2))
///     .end_array()
///     .end_object()
///     .build();
///
/// assert_eq!(script.len(), 7);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    events: Vec<Event>,
    borrowed_keys: bool,
}

impl ScriptBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit keys through `on_key_ref` instead of `on_key`.
    pub fn borrowed_keys(mut self) -> Self {
        self.borrowed_keys = true;
        self
    }

    /// Appends any event.
    pub fn event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// Appends a sequence of events.
    pub fn events(mut self, events: impl IntoIterator<Item = Event>) -> Self {
        self.events.extend(events);
        self
    }

    /// Opens an object with no element hint.
    pub fn object(self, len: usize) -> Self {
        self.event(Event::ObjectStart(len, BaseType::Any))
    }

    /// Opens an array with no element hint.
    pub fn array(self, len: usize) -> Self {
        self.event(Event::ArrayStart(len, BaseType::Any))
    }

    /// Opens an array with an element hint.
    pub fn typed_array(self, len: usize, base_type: BaseType) -> Self {
        self.event(Event::ArrayStart(len, base_type))
    }

    pub fn end_object(self) -> Self {
        self.event(Event::ObjectFinished)
    }

    pub fn end_array(self) -> Self {
        self.event(Event::ArrayFinished)
    }

    /// Appends a key in the configured key style.
    pub fn key(self, key: &str) -> Self {
        let event = if self.borrowed_keys {
            Event::key_ref(key)
        } else {
            Event::key(key)
        };
        self.event(event)
    }

    /// Appends a key followed by its value.
    pub fn entry(self, key: &str, value: Event) -> Self {
        self.key(key).event(value)
    }

    /// Finishes the script.
    pub fn build(self) -> Vec<Event> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_borrowed_keys() {
        let script = ScriptBuilder::new()
            .borrowed_keys()
            .object(1)
            .entry("a", Event::Nil)
            .end_object()
            .build();
        assert_eq!(script[1], Event::KeyRef(b"a".to_vec()));
    }

    #[test]
    fn test_owned_keys_by_default() {
        let script = ScriptBuilder::new().key("a").build();
        assert_eq!(script, vec![Event::key("a")]);
    }
}
