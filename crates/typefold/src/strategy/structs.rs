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

//! Generic struct strategy.
//!
//! Object keys are matched against field names resolved for the session tag
//! when the strategy is built. Keys may arrive in any order; fields without
//! a key keep their current value, and values under unknown keys are
//! skipped entirely.

use super::Strategy;
use crate::context::UnfoldCtx;
use crate::error::{UnfoldError, UnfoldResult};
use crate::event::{BaseType, Scalar};
use crate::shape::{StructShape, TypeHandle};
use std::collections::HashMap;
use tracing::trace;

#[derive(Clone, Copy)]
struct Field {
    offset: usize,
    ty: TypeHandle,
}

pub(crate) struct StructStrategy {
    type_name: &'static str,
    fields: HashMap<&'static str, Field>,
}

impl StructStrategy {
    pub(crate) fn new(shape: StructShape, tag: &str) -> UnfoldResult<Self> {
        let mut fields = HashMap::with_capacity(shape.fields.len());
        for field in &shape.fields {
            let Some(name) = field.key_name(tag) else {
                continue;
            };
            let entry = Field {
                offset: field.offset,
                ty: field.ty,
            };
            if fields.insert(name, entry).is_some() {
                return Err(UnfoldError::unsupported(
                    shape.type_name,
                    format!("duplicate field name {:?} under tag {:?}", name, tag),
                ));
            }
        }
        Ok(Self {
            type_name: shape.type_name,
            fields,
        })
    }

    /// Consume the pending key and bind a level to the matching field.
    fn bind_field(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        let key = ctx.take_key()?;
        let field = self.fields.get(ctx.key_str(&key)).copied();
        if field.is_none() {
            trace!(key = ctx.key_str(&key), strategy = self.type_name, "skipping unknown key");
        }
        ctx.release_key(key);
        match field {
            Some(field) => {
                let base = ctx.slot()?.raw();
                // SAFETY: the offset and type come from the struct's declared
                // shape, so the location holds a valid field of that type.
                unsafe { ctx.bind(&field.ty, base.byte_add(field.offset)) }
            }
            None => ctx.bind_sink(),
        }
    }
}

impl Strategy for StructStrategy {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        if ctx.is_open() {
            self.bind_field(ctx)?;
            return ctx.forward(v);
        }
        match v {
            Scalar::Nil => {
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
        self.bind_field(ctx)?;
        ctx.forward_array_start(len, base_type)
    }

    fn on_object_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        if ctx.is_open() {
            self.bind_field(ctx)?;
            return ctx.forward_object_start(len, base_type);
        }
        ctx.open(base_type);
        ctx.begin_object();
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
