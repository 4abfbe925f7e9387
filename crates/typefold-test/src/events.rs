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

//! Recorded event scripts.
//!
//! An [`Event`] is an owned copy of one [`Visitor`] call. Scripts are plain
//! `Vec<Event>` values replayed against any visitor, which lets tests play
//! the role of a wire-format parser.

use typefold::{BaseType, UnfoldOptions, UnfoldResult, Unfold, Unfolder, Visitor};

/// One recorded visitor call.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Nil,
    Bool(bool),
    String(String),
    /// Borrowed string; replayed through `on_string_ref`.
    StringRef(Vec<u8>),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Int(isize),
    Byte(u8),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Uint(usize),
    F32(f32),
    F64(f64),
    ArrayStart(usize, BaseType),
    ArrayFinished,
    ObjectStart(usize, BaseType),
    ObjectFinished,
    Key(String),
    /// Borrowed key; replayed through `on_key_ref`.
    KeyRef(Vec<u8>),
}

impl Event {
    /// Owned key event.
    pub fn key(key: &str) -> Self {
        Self::Key(key.to_string())
    }

    /// Borrowed key event.
    pub fn key_ref(key: &str) -> Self {
        Self::KeyRef(key.as_bytes().to_vec())
    }

    /// Owned string event.
    pub fn string(s: &str) -> Self {
        Self::String(s.to_string())
    }

    /// Borrowed string event.
    pub fn string_ref(s: &str) -> Self {
        Self::StringRef(s.as_bytes().to_vec())
    }

    /// Deliver this event to `visitor`.
    pub fn apply<V: Visitor + ?Sized>(&self, visitor: &mut V) -> UnfoldResult<()> {
        match self {
            Self::Nil => visitor.on_nil(),
            Self::Bool(v) => visitor.on_bool(*v),
            Self::String(v) => visitor.on_string(v.clone()),
            Self::StringRef(v) => visitor.on_string_ref(v),
            Self::I8(v) => visitor.on_i8(*v),
            Self::I16(v) => visitor.on_i16(*v),
            Self::I32(v) => visitor.on_i32(*v),
            Self::I64(v) => visitor.on_i64(*v),
            Self::Int(v) => visitor.on_int(*v),
            Self::Byte(v) => visitor.on_byte(*v),
            Self::U8(v) => visitor.on_u8(*v),
            Self::U16(v) => visitor.on_u16(*v),
            Self::U32(v) => visitor.on_u32(*v),
            Self::U64(v) => visitor.on_u64(*v),
            Self::Uint(v) => visitor.on_uint(*v),
            Self::F32(v) => visitor.on_f32(*v),
            Self::F64(v) => visitor.on_f64(*v),
            Self::ArrayStart(len, base_type) => visitor.on_array_start(*len, *base_type),
            Self::ArrayFinished => visitor.on_array_finished(),
            Self::ObjectStart(len, base_type) => visitor.on_object_start(*len, *base_type),
            Self::ObjectFinished => visitor.on_object_finished(),
            Self::Key(k) => visitor.on_key(k.clone()),
            Self::KeyRef(k) => visitor.on_key_ref(k),
        }
    }
}

/// Replay `events` in order, stopping at the first error.
pub fn replay<V: Visitor + ?Sized>(visitor: &mut V, events: &[Event]) -> UnfoldResult<()> {
    events.iter().try_for_each(|event| event.apply(visitor))
}

/// Replay `events` until one fails, returning its position and error.
pub fn replay_until_error<V: Visitor + ?Sized>(
    visitor: &mut V,
    events: &[Event],
) -> Option<(usize, typefold::UnfoldError)> {
    events
        .iter()
        .enumerate()
        .find_map(|(i, event)| event.apply(visitor).err().map(|e| (i, e)))
}

/// Decode `events` into a fresh `T::default()` with default options.
pub fn decode<T: Unfold + Default>(events: &[Event]) -> UnfoldResult<T> {
    decode_with(events, UnfoldOptions::default())
}

/// Decode `events` into a fresh `T::default()`.
pub fn decode_with<T: Unfold + Default>(events: &[Event], options: UnfoldOptions) -> UnfoldResult<T> {
    let mut value = T::default();
    decode_into(&mut value, events, options)?;
    Ok(value)
}

/// Decode `events` into an existing destination.
pub fn decode_into<T: Unfold>(
    value: &mut T,
    events: &[Event],
    options: UnfoldOptions,
) -> UnfoldResult<()> {
    let mut unfolder = Unfolder::with_options(value, options)?;
    replay(&mut unfolder, events)
}
