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

//! Generic map strategy.

use super::Strategy;
use crate::context::UnfoldCtx;
use crate::error::{UnfoldError, UnfoldResult};
use crate::event::{BaseType, Scalar};
use crate::shape::MapShape;

/// Strategy for string-keyed maps. A repeated key replaces the earlier
/// value.
pub(crate) struct MapStrategy {
    type_name: &'static str,
    shape: MapShape,
}

impl MapStrategy {
    pub(crate) fn new(type_name: &'static str, shape: MapShape) -> Self {
        Self { type_name, shape }
    }

    /// Insert the pending key and bind a level to its value.
    fn bind_entry(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        let key = ctx.take_key()?;
        let key = ctx.key_into_string(key);
        let map = ctx.slot()?.raw();
        // SAFETY: the slot holds the map this shape describes; the inserted
        // value stays in place until its level is popped because the map is
        // not touched again before then.
        unsafe {
            let value = (self.shape.insert_default)(map, key)?;
            ctx.bind(&self.shape.value, value)
        }
    }
}

impl Strategy for MapStrategy {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        if ctx.is_open() {
            self.bind_entry(ctx)?;
            return ctx.forward(v);
        }
        match v {
            Scalar::Nil => {
                let map = ctx.slot()?.raw();
                // SAFETY: see `bind_entry`.
                unsafe { (self.shape.clear)(map) };
                ctx.leave_level();
                Ok(())
            }
            other => Err(UnfoldError::unexpected(other.kind(), self.type_name)),
        }
    }

    fn on_array_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(UnfoldError::unexpected("array start", self.type_name));
        }
        self.bind_entry(ctx)?;
        ctx.forward_array_start(len, base_type)
    }

    fn on_object_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        if ctx.is_open() {
            self.bind_entry(ctx)?;
            return ctx.forward_object_start(len, base_type);
        }
        ctx.open(base_type);
        ctx.begin_object();
        let map = ctx.slot()?.raw();
        // SAFETY: see `bind_entry`.
        unsafe { (self.shape.clear)(map) };
        Ok(())
    }

    fn on_object_finished(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(ctx.unbalanced("object finish", self.type_name));
        }
        ctx.end_object()?;
        ctx.leave_level();
        Ok(())
    }

    fn on_key(&self, ctx: &mut UnfoldCtx<'_>, key: String) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(UnfoldError::unexpected("key", self.type_name));
        }
        ctx.set_key(key)
    }

    fn on_key_ref(&self, ctx: &mut UnfoldCtx<'_>, key: &[u8]) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(UnfoldError::unexpected("key", self.type_name));
        }
        ctx.set_key_ref(key)
    }
}
