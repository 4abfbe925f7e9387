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

//! Generic sequence and fixed-array strategies.
//!
//! Both keep an element counter on the index stack. It advances after a
//! primitive element has been written, or when a structured element reports
//! completion through `on_child_*_done`.

use super::Strategy;
use crate::context::UnfoldCtx;
use crate::error::{UnfoldError, UnfoldResult};
use crate::event::{BaseType, Scalar};
use crate::shape::{ArrayShape, SeqShape};
use crate::slot::RawSlot;

/// Reservation cap for advisory size hints.
const MAX_RESERVE: usize = 4096;

pub(crate) struct SeqStrategy {
    type_name: &'static str,
    shape: SeqShape,
}

impl SeqStrategy {
    pub(crate) fn new(type_name: &'static str, shape: SeqShape) -> Self {
        Self { type_name, shape }
    }

    /// Append a default element and bind a level to it.
    fn bind_next(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        let seq = ctx.slot()?.raw();
        // SAFETY: the slot holds the sequence this shape describes, and the
        // new element lives inside it until the element level is popped.
        unsafe {
            let elem = (self.shape.push_default)(seq);
            ctx.bind(&self.shape.elem, elem)
        }
    }

    fn close_nil(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        let seq = ctx.slot()?.raw();
        // SAFETY: see `bind_next`.
        unsafe { (self.shape.clear)(seq) };
        ctx.leave_level();
        Ok(())
    }
}

impl Strategy for SeqStrategy {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return match v {
                Scalar::Nil => self.close_nil(ctx),
                other => Err(UnfoldError::unexpected(other.kind(), self.type_name)),
            };
        }
        self.bind_next(ctx)?;
        ctx.forward(v)?;
        ctx.commit_index()?;
        Ok(())
    }

    fn on_array_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        if ctx.is_open() {
            self.bind_next(ctx)?;
            return ctx.forward_array_start(len, base_type);
        }
        ctx.open(base_type);
        let seq = ctx.slot()?.raw();
        // SAFETY: see `bind_next`.
        unsafe {
            (self.shape.clear)(seq);
            (self.shape.reserve)(seq, len.min(MAX_RESERVE));
        }
        ctx.push_index(0);
        Ok(())
    }

    fn on_array_finished(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(ctx.unbalanced("array finish", self.type_name));
        }
        ctx.pop_index()?;
        ctx.leave_level();
        Ok(())
    }

    fn on_object_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(UnfoldError::unexpected("object start", self.type_name));
        }
        self.bind_next(ctx)?;
        ctx.forward_object_start(len, base_type)
    }

    fn on_child_array_done(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        ctx.commit_index().map(drop)
    }

    fn on_child_object_done(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        ctx.commit_index().map(drop)
    }
}

/// Strategy for `[T; N]`: elements are written in place, in order.
///
/// Fewer than `N` elements leave the remaining ones untouched; more fail
/// with [`UnfoldError::CapacityExceeded`].
pub(crate) struct ArrayStrategy {
    type_name: &'static str,
    shape: ArrayShape,
}

impl ArrayStrategy {
    pub(crate) fn new(type_name: &'static str, shape: ArrayShape) -> Self {
        Self { type_name, shape }
    }

    fn bind_next(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        let idx = ctx.index()?;
        if idx >= self.shape.len {
            return Err(UnfoldError::CapacityExceeded {
                type_name: self.type_name,
                capacity: self.shape.len,
            });
        }
        let array = ctx.slot()?.raw();
        // SAFETY: the slot holds the array this shape describes and `idx` is
        // in bounds.
        unsafe {
            let elem: RawSlot = (self.shape.index)(array, idx);
            ctx.bind(&self.shape.elem, elem)
        }
    }
}

impl Strategy for ArrayStrategy {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return match v {
                Scalar::Nil => {
                    ctx.leave_level();
                    Ok(())
                }
                other => Err(UnfoldError::unexpected(other.kind(), self.type_name)),
            };
        }
        self.bind_next(ctx)?;
        ctx.forward(v)?;
        ctx.commit_index()?;
        Ok(())
    }

    fn on_array_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        if ctx.is_open() {
            self.bind_next(ctx)?;
            return ctx.forward_array_start(len, base_type);
        }
        ctx.open(base_type);
        ctx.push_index(0);
        Ok(())
    }

    fn on_array_finished(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(ctx.unbalanced("array finish", self.type_name));
        }
        ctx.pop_index()?;
        ctx.leave_level();
        Ok(())
    }

    fn on_object_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(UnfoldError::unexpected("object start", self.type_name));
        }
        self.bind_next(ctx)?;
        ctx.forward_object_start(len, base_type)
    }

    fn on_child_array_done(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        ctx.commit_index().map(drop)
    }

    fn on_child_object_done(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        ctx.commit_index().map(drop)
    }
}
