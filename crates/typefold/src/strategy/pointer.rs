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

//! `Option` and `Box` strategies.
//!
//! Both hand their level over to the inner value on the first event by
//! rebinding it, so they never see a finish event of their own.

use super::Strategy;
use crate::context::UnfoldCtx;
use crate::error::UnfoldResult;
use crate::event::{BaseType, Scalar};
use crate::shape::{OptionalShape, PointerShape};

pub(crate) struct OptionStrategy {
    type_name: &'static str,
    shape: OptionalShape,
}

impl OptionStrategy {
    pub(crate) fn new(type_name: &'static str, shape: OptionalShape) -> Self {
        Self { type_name, shape }
    }

    fn delegate(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        let option = ctx.slot()?.raw();
        // SAFETY: the slot holds the option this shape describes; the inner
        // value lives inside it for as long as the rebound level does.
        unsafe {
            let inner = (self.shape.get_or_insert_default)(option);
            ctx.rebind(&self.shape.inner, inner)
        }
    }
}

impl Strategy for OptionStrategy {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        if let Scalar::Nil = v {
            let option = ctx.slot()?.raw();
            // SAFETY: see `delegate`.
            unsafe { (self.shape.set_none)(option) };
            ctx.leave_level();
            return Ok(());
        }
        self.delegate(ctx)?;
        ctx.forward(v)
    }

    fn on_array_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        self.delegate(ctx)?;
        ctx.forward_array_start(len, base_type)
    }

    fn on_object_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        self.delegate(ctx)?;
        ctx.forward_object_start(len, base_type)
    }
}

pub(crate) struct BoxStrategy {
    type_name: &'static str,
    shape: PointerShape,
}

impl BoxStrategy {
    pub(crate) fn new(type_name: &'static str, shape: PointerShape) -> Self {
        Self { type_name, shape }
    }

    fn delegate(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        let pointer = ctx.slot()?.raw();
        // SAFETY: the slot holds the box this shape describes; its heap
        // allocation outlives the rebound level.
        unsafe {
            let pointee = (self.shape.deref)(pointer);
            ctx.rebind(&self.shape.pointee, pointee)
        }
    }
}

impl Strategy for BoxStrategy {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        self.delegate(ctx)?;
        ctx.forward(v)
    }

    fn on_array_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        self.delegate(ctx)?;
        ctx.forward_array_start(len, base_type)
    }

    fn on_object_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        self.delegate(ctx)?;
        ctx.forward_object_start(len, base_type)
    }
}
