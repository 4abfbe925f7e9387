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

//! The push-style event protocol.
//!
//! A wire-format parser drives decoding by calling one [`Visitor`] method per
//! token. Events are a call-level protocol: nothing here is stored past the
//! call that carries it.
//!
//! # Event Flow
//!
//! For the JSON document `{"a": 3, "b": [true, false]}` a parser issues:
//!
//! ```text
//! on_object_start(2, Any)
//! on_key("a")
//! on_i64(3)
//! on_key("b")
//! on_array_start(2, Bool)
//! on_bool(true)
//! on_bool(false)
//! on_array_finished()
//! on_object_finished()
//! ```

use crate::error::UnfoldResult;
use std::fmt;

/// Element type hint carried by structural start events.
///
/// Producers that know an array or object is homogeneous (typed arrays in
/// CBOR or UBJSON, for example) pass the element type; everyone else passes
/// [`BaseType::Any`]. Hints are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaseType {
    /// No hint.
    #[default]
    Any,
    /// Raw bytes.
    Byte,
    /// UTF-8 strings.
    String,
    /// Booleans.
    Bool,
    /// Nil values only.
    Zero,
    /// Native signed integers.
    Int,
    /// 8-bit signed integers.
    Int8,
    /// 16-bit signed integers.
    Int16,
    /// 32-bit signed integers.
    Int32,
    /// 64-bit signed integers.
    Int64,
    /// Native unsigned integers.
    Uint,
    /// 8-bit unsigned integers.
    Uint8,
    /// 16-bit unsigned integers.
    Uint16,
    /// 32-bit unsigned integers.
    Uint32,
    /// 64-bit unsigned integers.
    Uint64,
    /// 32-bit floats.
    Float32,
    /// 64-bit floats.
    Float64,
}

impl BaseType {
    /// Returns true for the byte hints (`Byte` and `Uint8`).
    #[inline]
    pub fn is_bytes(self) -> bool {
        matches!(self, Self::Byte | Self::Uint8)
    }
}

/// A single primitive event, borrowed for the duration of one call.
///
/// Container strategies receive primitive events through
/// [`Strategy::on_scalar`](crate::Strategy::on_scalar) and forward them to
/// the child they bind with [`Scalar::dispatch`](crate::Scalar::dispatch),
/// which calls the handler matching the original event.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'s> {
    Nil,
    Bool(bool),
    String(String),
    StringRef(&'s [u8]),
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
}

/// Numeric view of a scalar used by conversions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl<'s> Scalar<'s> {
    /// Event name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::String(_) | Self::StringRef(_) => "string",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::Int(_) => "isize",
            Self::Byte(_) => "byte",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::Uint(_) => "usize",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
        }
    }

    pub(crate) fn number(&self) -> Option<Number> {
        let n = match *self {
            Self::I8(v) => Number::Signed(v.into()),
            Self::I16(v) => Number::Signed(v.into()),
            Self::I32(v) => Number::Signed(v.into()),
            Self::I64(v) => Number::Signed(v),
            Self::Int(v) => Number::Signed(v as i64),
            Self::Byte(v) | Self::U8(v) => Number::Unsigned(v.into()),
            Self::U16(v) => Number::Unsigned(v.into()),
            Self::U32(v) => Number::Unsigned(v.into()),
            Self::U64(v) => Number::Unsigned(v),
            Self::Uint(v) => Number::Unsigned(v as u64),
            Self::F32(v) => Number::Float(v.into()),
            Self::F64(v) => Number::Float(v),
            _ => return None,
        };
        Some(n)
    }
}

impl fmt::Display for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::String(s) => write!(f, "{:?}", s),
            Self::StringRef(b) => write!(f, "{:?}", String::from_utf8_lossy(b)),
            other => match other.number() {
                Some(Number::Signed(v)) => write!(f, "{}", v),
                Some(Number::Unsigned(v)) => write!(f, "{}", v),
                Some(Number::Float(v)) => write!(f, "{}", v),
                None => write!(f, "{}", other.kind()),
            },
        }
    }
}

/// The event receiver surface driven by a wire-format parser.
///
/// Producers guarantee well-nested start/finish pairs and exactly one key
/// before every object value. `...Ref` variants borrow caller-owned bytes
/// that are only valid for the duration of the call.
pub trait Visitor {
    fn on_nil(&mut self) -> UnfoldResult<()>;
    fn on_bool(&mut self, v: bool) -> UnfoldResult<()>;
    fn on_string(&mut self, v: String) -> UnfoldResult<()>;
    fn on_string_ref(&mut self, v: &[u8]) -> UnfoldResult<()>;
    fn on_i8(&mut self, v: i8) -> UnfoldResult<()>;
    fn on_i16(&mut self, v: i16) -> UnfoldResult<()>;
    fn on_i32(&mut self, v: i32) -> UnfoldResult<()>;
    fn on_i64(&mut self, v: i64) -> UnfoldResult<()>;
    fn on_int(&mut self, v: isize) -> UnfoldResult<()>;
    fn on_byte(&mut self, v: u8) -> UnfoldResult<()>;
    fn on_u8(&mut self, v: u8) -> UnfoldResult<()>;
    fn on_u16(&mut self, v: u16) -> UnfoldResult<()>;
    fn on_u32(&mut self, v: u32) -> UnfoldResult<()>;
    fn on_u64(&mut self, v: u64) -> UnfoldResult<()>;
    fn on_uint(&mut self, v: usize) -> UnfoldResult<()>;
    fn on_f32(&mut self, v: f32) -> UnfoldResult<()>;
    fn on_f64(&mut self, v: f64) -> UnfoldResult<()>;

    fn on_array_start(&mut self, len: usize, base_type: BaseType) -> UnfoldResult<()>;
    fn on_array_finished(&mut self) -> UnfoldResult<()>;

    fn on_object_start(&mut self, len: usize, base_type: BaseType) -> UnfoldResult<()>;
    fn on_object_finished(&mut self) -> UnfoldResult<()>;
    fn on_key(&mut self, key: String) -> UnfoldResult<()>;
    fn on_key_ref(&mut self, key: &[u8]) -> UnfoldResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kind() {
        assert_eq!(Scalar::Nil.kind(), "nil");
        assert_eq!(Scalar::StringRef(b"x").kind(), "string");
        assert_eq!(Scalar::Byte(1).kind(), "byte");
        assert_eq!(Scalar::Uint(1).kind(), "usize");
    }

    #[test]
    fn test_scalar_number_widening() {
        assert_eq!(Scalar::I8(-3).number(), Some(Number::Signed(-3)));
        assert_eq!(Scalar::Byte(7).number(), Some(Number::Unsigned(7)));
        assert_eq!(Scalar::F32(1.5).number(), Some(Number::Float(1.5)));
        assert_eq!(Scalar::Bool(true).number(), None);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::I64(-42).to_string(), "-42");
        assert_eq!(Scalar::String("hi".into()).to_string(), "\"hi\"");
        assert_eq!(Scalar::StringRef(b"yo").to_string(), "\"yo\"");
    }

    #[test]
    fn test_base_type_bytes() {
        assert!(BaseType::Byte.is_bytes());
        assert!(BaseType::Uint8.is_bytes());
        assert!(!BaseType::Any.is_bytes());
        assert_eq!(BaseType::default(), BaseType::Any);
    }
}
