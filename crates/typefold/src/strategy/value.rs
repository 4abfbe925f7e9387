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

//! Direct strategy for [`Value`].
//!
//! Primitive events are stored as the matching variant. Structural starts
//! switch the value to an empty container and rebind the level to the
//! container's own strategy: `Vec<u8>` for byte-hinted arrays,
//! `Vec<Value>` for other arrays and `BTreeMap<String, Value>` for objects.

use super::Strategy;
use crate::context::UnfoldCtx;
use crate::error::{UnfoldError, UnfoldResult};
use crate::event::{BaseType, Number, Scalar};
use crate::shape::TypeHandle;
use crate::slot::RawSlot;
use crate::value::Value;
use std::collections::BTreeMap;

pub(crate) struct ValueStrategy;

pub(crate) static VALUE_STRATEGY: &ValueStrategy = &ValueStrategy;

fn scalar_value(v: Scalar<'_>) -> UnfoldResult<Value> {
    let value = match v {
        Scalar::Nil => Value::Nil,
        Scalar::Bool(b) => Value::Bool(b),
        Scalar::String(s) => Value::String(s),
        Scalar::StringRef(bytes) => Value::String(
            std::str::from_utf8(bytes)
                .map_err(|e| UnfoldError::conversion("string", "Value", e.to_string()))?
                .to_owned(),
        ),
        other => match other.number() {
            Some(Number::Signed(n)) => Value::Int(n),
            Some(Number::Unsigned(n)) => Value::Uint(n),
            Some(Number::Float(f)) => Value::Float(f),
            None => return Err(UnfoldError::unexpected(other.kind(), "Value")),
        },
    };
    Ok(value)
}

impl Strategy for ValueStrategy {
    fn type_name(&self) -> &'static str {
        "Value"
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        let value = scalar_value(v)?;
        *ctx.target::<Value>()? = value;
        ctx.leave_level();
        Ok(())
    }

    fn on_array_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        let value = ctx.target::<Value>()?;
        let (handle, at) = if base_type.is_bytes() {
            *value = Value::Bytes(Vec::new());
            match value {
                Value::Bytes(bytes) => (TypeHandle::of::<Vec<u8>>(), RawSlot::from_mut(bytes)),
                _ => return Err(UnfoldError::unexpected("array start", "Value")),
            }
        } else {
            *value = Value::Array(Vec::new());
            match value {
                Value::Array(items) => (TypeHandle::of::<Vec<Value>>(), RawSlot::from_mut(items)),
                _ => return Err(UnfoldError::unexpected("array start", "Value")),
            }
        };
        // SAFETY: `at` is the container just stored in this level's value.
        unsafe { ctx.rebind(&handle, at)? };
        ctx.forward_array_start(len, base_type)
    }

    fn on_object_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        let value = ctx.target::<Value>()?;
        *value = Value::Object(BTreeMap::new());
        let at = match value {
            Value::Object(map) => RawSlot::from_mut(map),
            _ => return Err(UnfoldError::unexpected("object start", "Value")),
        };
        // SAFETY: `at` is the map just stored in this level's value.
        unsafe { ctx.rebind(&TypeHandle::of::<BTreeMap<String, Value>>(), at)? };
        ctx.forward_object_start(len, base_type)
    }
}
