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

//! Discarding strategy.
//!
//! Bound as the root of a detached session and for object keys a struct does
//! not declare. It consumes exactly one value, nested content included,
//! while still checking that starts and finishes balance.

use super::Strategy;
use crate::context::UnfoldCtx;
use crate::error::{UnfoldError, UnfoldResult};
use crate::event::{BaseType, Scalar};
use crate::slot::Slot;

pub(crate) struct Sink;

pub(crate) static SINK: &Sink = &Sink;

impl Sink {
    fn start(&'static self, ctx: &mut UnfoldCtx<'_>, base_type: BaseType) -> UnfoldResult<()> {
        if ctx.is_open() {
            ctx.push_level(self, Slot::detached())?;
        }
        ctx.open(base_type);
        Ok(())
    }
}

impl Strategy for Sink {
    fn type_name(&self) -> &'static str {
        "<discarded>"
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, _v: Scalar<'_>) -> UnfoldResult<()> {
        if !ctx.is_open() {
            ctx.leave_level();
        }
        Ok(())
    }

    fn on_array_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        _len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        SINK.start(ctx, base_type)
    }

    fn on_object_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        _len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        SINK.start(ctx, base_type)
    }

    fn on_array_finished(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(ctx.unbalanced("array finish", self.type_name()));
        }
        ctx.leave_level();
        Ok(())
    }

    fn on_object_finished(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(ctx.unbalanced("object finish", self.type_name()));
        }
        ctx.leave_level();
        Ok(())
    }

    fn on_key(&self, ctx: &mut UnfoldCtx<'_>, _key: String) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(UnfoldError::unexpected("key", self.type_name()));
        }
        Ok(())
    }

    fn on_key_ref(&self, ctx: &mut UnfoldCtx<'_>, _key: &[u8]) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(UnfoldError::unexpected("key", self.type_name()));
        }
        Ok(())
    }
}
