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

//! Decoding strategies.
//!
//! A [`Strategy`] is the per-type decoding behavior bound to one destination
//! location for one nesting level. Strategies are stateless `&'static`
//! values shared by every session and thread; per-level state lives in the
//! context's stacks (phase, index, pointer and key stacks).
//!
//! # Protocol
//!
//! - A strategy is *bound* when its level is pushed. Leaf strategies write
//!   the next primitive event and call
//!   [`leave_level`](UnfoldCtx::leave_level).
//! - Containers [`open`](UnfoldCtx::open) on their own start event. While
//!   open, every value event binds a child level for the element and
//!   forwards the event to it.
//! - On their own finish event containers clean up their auxiliary state
//!   and leave the level; the context then notifies the parent through
//!   `on_child_array_done` / `on_child_object_done`.
//!
//! # Custom Strategies
//!
//! Types with special decoding needs implement [`Unfold::direct`] and
//! return their own strategy, which bypasses the registry entirely.
//!
//! [`Unfold::direct`]: crate::Unfold::direct

use crate::context::UnfoldCtx;
use crate::error::{UnfoldError, UnfoldResult};
use crate::event::{BaseType, Scalar};

mod map;
mod pointer;
pub(crate) mod scalar;
mod seq;
pub(crate) mod sink;
mod structs;
pub(crate) mod value;

pub(crate) use map::MapStrategy;
pub(crate) use pointer::{BoxStrategy, OptionStrategy};
pub use scalar::{LeafStrategy, Primitive, ScalarSeq};
pub(crate) use scalar::ScalarStrategy;
pub(crate) use seq::{ArrayStrategy, SeqStrategy};
pub(crate) use sink::SINK;
pub(crate) use structs::StructStrategy;

/// Per-type decoding behavior.
///
/// Every primitive handler defaults to [`on_scalar`](Strategy::on_scalar),
/// which rejects the event. Structural handlers reject by default and the
/// child-done notifications do nothing.
pub trait Strategy: Send + Sync + 'static {
    /// Name of the destination type, for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Called right after the strategy's level has been pushed.
    fn init_state(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        let _ = ctx;
        Ok(())
    }

    /// Funnel for every primitive event.
    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        let _ = ctx;
        Err(UnfoldError::unexpected(v.kind(), self.type_name()))
    }

    fn on_nil(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::Nil)
    }

    fn on_bool(&self, ctx: &mut UnfoldCtx<'_>, v: bool) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::Bool(v))
    }

    fn on_string(&self, ctx: &mut UnfoldCtx<'_>, v: String) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::String(v))
    }

    fn on_string_ref(&self, ctx: &mut UnfoldCtx<'_>, v: &[u8]) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::StringRef(v))
    }

    fn on_i8(&self, ctx: &mut UnfoldCtx<'_>, v: i8) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::I8(v))
    }

    fn on_i16(&self, ctx: &mut UnfoldCtx<'_>, v: i16) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::I16(v))
    }

    fn on_i32(&self, ctx: &mut UnfoldCtx<'_>, v: i32) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::I32(v))
    }

    fn on_i64(&self, ctx: &mut UnfoldCtx<'_>, v: i64) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::I64(v))
    }

    fn on_int(&self, ctx: &mut UnfoldCtx<'_>, v: isize) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::Int(v))
    }

    fn on_byte(&self, ctx: &mut UnfoldCtx<'_>, v: u8) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::Byte(v))
    }

    fn on_u8(&self, ctx: &mut UnfoldCtx<'_>, v: u8) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::U8(v))
    }

    fn on_u16(&self, ctx: &mut UnfoldCtx<'_>, v: u16) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::U16(v))
    }

    fn on_u32(&self, ctx: &mut UnfoldCtx<'_>, v: u32) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::U32(v))
    }

    fn on_u64(&self, ctx: &mut UnfoldCtx<'_>, v: u64) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::U64(v))
    }

    fn on_uint(&self, ctx: &mut UnfoldCtx<'_>, v: usize) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::Uint(v))
    }

    fn on_f32(&self, ctx: &mut UnfoldCtx<'_>, v: f32) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::F32(v))
    }

    fn on_f64(&self, ctx: &mut UnfoldCtx<'_>, v: f64) -> UnfoldResult<()> {
        self.on_scalar(ctx, Scalar::F64(v))
    }

    fn on_array_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        let _ = (ctx, len, base_type);
        Err(UnfoldError::unexpected("array start", self.type_name()))
    }

    fn on_array_finished(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        Err(ctx.unbalanced("array finish", self.type_name()))
    }

    fn on_object_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        let _ = (ctx, len, base_type);
        Err(UnfoldError::unexpected("object start", self.type_name()))
    }

    fn on_object_finished(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        Err(ctx.unbalanced("object finish", self.type_name()))
    }

    fn on_key(&self, ctx: &mut UnfoldCtx<'_>, key: String) -> UnfoldResult<()> {
        let _ = (ctx, key);
        Err(UnfoldError::unexpected("key", self.type_name()))
    }

    fn on_key_ref(&self, ctx: &mut UnfoldCtx<'_>, key: &[u8]) -> UnfoldResult<()> {
        let _ = (ctx, key);
        Err(UnfoldError::unexpected("key", self.type_name()))
    }

    /// A nested array bound by this level has finished.
    fn on_child_array_done(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        let _ = ctx;
        Ok(())
    }

    /// A nested object bound by this level has finished.
    fn on_child_object_done(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        let _ = ctx;
        Ok(())
    }
}

impl Scalar<'_> {
    /// Deliver this event to `strategy` through the handler matching the
    /// original event.
    pub fn dispatch(self, strategy: &dyn Strategy, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        match self {
            Scalar::Nil => strategy.on_nil(ctx),
            Scalar::Bool(v) => strategy.on_bool(ctx, v),
            Scalar::String(v) => strategy.on_string(ctx, v),
            Scalar::StringRef(v) => strategy.on_string_ref(ctx, v),
            Scalar::I8(v) => strategy.on_i8(ctx, v),
            Scalar::I16(v) => strategy.on_i16(ctx, v),
            Scalar::I32(v) => strategy.on_i32(ctx, v),
            Scalar::I64(v) => strategy.on_i64(ctx, v),
            Scalar::Int(v) => strategy.on_int(ctx, v),
            Scalar::Byte(v) => strategy.on_byte(ctx, v),
            Scalar::U8(v) => strategy.on_u8(ctx, v),
            Scalar::U16(v) => strategy.on_u16(ctx, v),
            Scalar::U32(v) => strategy.on_u32(ctx, v),
            Scalar::U64(v) => strategy.on_u64(ctx, v),
            Scalar::Uint(v) => strategy.on_uint(ctx, v),
            Scalar::F32(v) => strategy.on_f32(ctx, v),
            Scalar::F64(v) => strategy.on_f64(ctx, v),
        }
    }
}
