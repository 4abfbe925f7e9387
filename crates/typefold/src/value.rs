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

//! Dynamic values for schemaless decoding.
//!
//! [`Value`] accepts any well-formed event stream:
//!
//! ```rust
//! use typefold::{BaseType, Unfolder, Value, Visitor};
//!
//! let mut value = Value::Nil;
//! let mut unfolder = Unfolder::new(&mut value)?;
//! unfolder.on_object_start(1, BaseType::Any)?;
//! unfolder.on_key("ids".to_string())?;
//! unfolder.on_array_start(2, BaseType::Any)?;
//! unfolder.on_u64(7)?;
//! unfolder.on_i64(-1)?;
//! unfolder.on_array_finished()?;
//! unfolder.on_object_finished()?;
//! drop(unfolder);
//!
//! let ids = value.get("ids").and_then(Value::as_array).unwrap();
//! assert_eq!(ids, &[Value::Uint(7), Value::Int(-1)]);
//! # Ok::<(), typefold::UnfoldError>(())
//! ```

use crate::shape::{Shape, Unfold};
use crate::strategy::value::VALUE_STRATEGY;
use crate::strategy::Strategy;
use std::collections::BTreeMap;
use std::fmt;

/// A decoded value of any shape.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    /// Signed integer events.
    Int(i64),
    /// Unsigned integer and byte events.
    Uint(u64),
    Float(f64),
    String(String),
    /// Arrays announced with a byte element hint.
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view; unsigned values must fit in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Uint(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            Self::Uint(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Member of an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Uint(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Object(map) => {
                write!(f, "{{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Unfold for Value {
    fn shape() -> Shape {
        Shape::Opaque
    }

    fn direct() -> Option<&'static dyn Strategy> {
        Some(VALUE_STRATEGY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert!(Value::default().is_nil());
        assert_eq!(Value::Uint(5).as_i64(), Some(5));
        assert_eq!(Value::Uint(u64::MAX).as_i64(), None);
        assert_eq!(Value::Int(2).as_f64(), Some(2.0));
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        assert_eq!(Value::Bytes(vec![1]).as_bytes(), Some(&[1u8][..]));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
    }

    #[test]
    fn test_object_get() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), Value::Int(1));
        let value = Value::Object(map);
        assert_eq!(value.get("k"), Some(&Value::Int(1)));
        assert_eq!(value.get("missing"), None);
        assert_eq!(Value::Nil.get("k"), None);
    }

    #[test]
    fn test_display() {
        let value = Value::Array(vec![Value::Int(1), Value::String("a".into()), Value::Nil]);
        assert_eq!(value.to_string(), "[1, \"a\", nil]");
        assert_eq!(Value::Bytes(vec![0; 3]).to_string(), "<3 bytes>");
    }

    #[test]
    fn test_binds_directly() {
        assert!(Value::direct().is_some());
        assert_eq!(Value::shape().kind(), "opaque");
    }
}
