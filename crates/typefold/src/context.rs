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

//! The decode context.
//!
//! [`Unfolder`] is the session a wire-format parser drives through the
//! [`Visitor`] surface. It owns an [`UnfoldCtx`], the state handed to every
//! strategy handler: the strategy, value and base-type stacks (one entry per
//! level, always the same height), the auxiliary pointer, index and key
//! stacks, the scratch buffer and the key cache.
//!
//! # Example
//!
//! ```rust
//! use typefold::{unfold_struct, BaseType, Unfolder, Visitor};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Record {
//!     a: i64,
//!     b: Vec<bool>,
//! }
//!
//! unfold_struct! {
//!     Record {
//!         a => { "struct": "a" },
//!         b => { "struct": "b" },
//!     }
//! }
//!
//! let mut record = Record::default();
//! let mut unfolder = Unfolder::new(&mut record)?;
//! unfolder.on_object_start(2, BaseType::Any)?;
//! unfolder.on_key("a".to_string())?;
//! unfolder.on_i64(3)?;
//! unfolder.on_key("b".to_string())?;
//! unfolder.on_array_start(2, BaseType::Bool)?;
//! unfolder.on_bool(true)?;
//! unfolder.on_bool(false)?;
//! unfolder.on_array_finished()?;
//! unfolder.on_object_finished()?;
//! assert!(unfolder.is_idle());
//! drop(unfolder);
//!
//! assert_eq!(record, Record { a: 3, b: vec![true, false] });
//! # Ok::<(), typefold::UnfoldError>(())
//! ```
//!
//! # Finish Events
//!
//! Array and object finish events are delivered in two phases: the current
//! strategy handles the finish, then, if that changed the depth, the new
//! current strategy is told that its child completed. A failing finish
//! handler skips the notification; the session must then be
//! [`reset`](Unfolder::reset) before reuse.

use crate::buffer::ScratchBuffer;
use crate::error::{UnfoldError, UnfoldResult};
use crate::event::{BaseType, Scalar, Visitor};
use crate::key_cache::{KeyCache, KeyCacheStatistics};
use crate::options::UnfoldOptions;
use crate::registry::registry;
use crate::shape::{TypeHandle, Unfold};
use crate::slot::{RawSlot, Slot};
use crate::stack::{Frame, KeyRepr, PendingKey, Phase, Stack};
use crate::strategy::{Strategy, SINK};
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

/// Initial capacity of every decode stack.
const INITIAL_STACK_CAPACITY: usize = 16;

/// A bound destination root.
pub struct Target<'a> {
    handle: TypeHandle,
    raw: RawSlot,
    _marker: PhantomData<&'a mut ()>,
}

impl<'a> Target<'a> {
    /// Target for a mutable location.
    pub fn new<T: Unfold>(value: &'a mut T) -> Self {
        Self {
            handle: TypeHandle::of::<T>(),
            raw: RawSlot::from_mut(value),
            _marker: PhantomData,
        }
    }

    /// Handle of the destination type.
    pub fn handle(&self) -> &TypeHandle {
        &self.handle
    }
}

impl fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("type", &self.handle.name())
            .finish()
    }
}

/// Conversion into a decode destination.
///
/// Only mutable references are destinations. Shared references are
/// accepted by the signature and rejected with
/// [`UnfoldError::RequiresMutableTarget`].
pub trait IntoTarget<'a> {
    fn into_target(self) -> UnfoldResult<Target<'a>>;
}

impl<'a, T: Unfold> IntoTarget<'a> for &'a mut T {
    fn into_target(self) -> UnfoldResult<Target<'a>> {
        Ok(Target::new(self))
    }
}

impl<'a, T: Unfold> IntoTarget<'a> for &'a T {
    fn into_target(self) -> UnfoldResult<Target<'a>> {
        Err(UnfoldError::RequiresMutableTarget {
            type_name: type_name::<T>(),
        })
    }
}

impl<'a> IntoTarget<'a> for Target<'a> {
    fn into_target(self) -> UnfoldResult<Target<'a>> {
        Ok(self)
    }
}

#[derive(Clone, Copy)]
struct Root {
    strategy: &'static dyn Strategy,
    slot: Slot,
}

impl Root {
    fn sink() -> Self {
        Self {
            strategy: SINK,
            slot: Slot::detached(),
        }
    }
}

/// Decode state handed to strategies.
pub struct UnfoldCtx<'a> {
    frames: Stack<Frame>,
    values: Stack<Slot>,
    base_types: Stack<BaseType>,
    ptrs: Stack<RawSlot>,
    idxs: Stack<usize>,
    keys: Stack<Option<PendingKey>>,
    scratch: ScratchBuffer,
    key_cache: KeyCache,
    options: UnfoldOptions,
    root: Root,
    _target: PhantomData<&'a mut ()>,
}

impl<'a> UnfoldCtx<'a> {
    fn new(options: UnfoldOptions) -> Self {
        let mut ctx = Self {
            frames: Stack::with_capacity(INITIAL_STACK_CAPACITY),
            values: Stack::with_capacity(INITIAL_STACK_CAPACITY),
            base_types: Stack::with_capacity(INITIAL_STACK_CAPACITY),
            ptrs: Stack::with_capacity(INITIAL_STACK_CAPACITY),
            idxs: Stack::with_capacity(INITIAL_STACK_CAPACITY),
            keys: Stack::with_capacity(INITIAL_STACK_CAPACITY),
            scratch: ScratchBuffer::with_capacity(options.scratch_buffer_size),
            key_cache: KeyCache::new(options.key_cache_size),
            options,
            root: Root::sink(),
            _target: PhantomData,
        };
        ctx.clear();
        ctx
    }

    /// Drop back to the root binding, clearing all per-decode state.
    fn clear(&mut self) {
        self.ptrs.clear();
        self.idxs.clear();
        self.keys.clear();
        self.scratch.reset();
        self.rearm_root();
    }

    /// Clear the session and re-initialize the root strategy, as if its
    /// level had just been pushed.
    fn reset(&mut self) -> UnfoldResult<()> {
        self.clear();
        self.root.strategy.init_state(self)
    }

    fn rearm_root(&mut self) {
        self.frames.clear();
        self.values.clear();
        self.base_types.clear();
        self.frames.push(Frame::bound(self.root.strategy));
        self.values.push(self.root.slot);
        self.base_types.push(BaseType::Any);
    }

    fn set_root(&mut self, target: Target<'a>) -> UnfoldResult<()> {
        let strategy = self.resolve(&target.handle)?;
        // SAFETY: `Target` is only built from a `&'a mut T` whose type the
        // handle describes, and the borrow outlives this context.
        let slot = unsafe { Slot::from_raw(target.raw, target.handle.id(), target.handle.name()) };
        self.root = Root { strategy, slot };
        debug!(type_name = target.handle.name(), "bound decode target");
        self.reset()
    }

    // ==================== Levels ====================

    /// Number of active levels, root included.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn options(&self) -> &UnfoldOptions {
        &self.options
    }

    /// Phase of the current level.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.frames.top().map_or(Phase::Bound, |frame| frame.phase)
    }

    /// Returns true if the current level's array or object has started.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.phase() == Phase::Open
    }

    /// Hint of the structural start event that opened the current level.
    #[inline]
    pub fn base_type(&self) -> BaseType {
        self.base_types.top().copied().unwrap_or_default()
    }

    /// Mark the current level as open, recording the start event's hint.
    pub fn open(&mut self, base_type: BaseType) {
        if let Some(frame) = self.frames.top_mut() {
            frame.phase = Phase::Open;
        }
        if let Some(top) = self.base_types.top_mut() {
            *top = base_type;
        }
    }

    /// Strategy of the current level.
    pub fn current(&self) -> UnfoldResult<&'static dyn Strategy> {
        self.frames
            .top()
            .map(|frame| frame.strategy)
            .ok_or(UnfoldError::StackUnderflow { event: "dispatch" })
    }

    /// Destination slot of the current level.
    pub fn slot(&self) -> UnfoldResult<Slot> {
        self.values
            .top()
            .copied()
            .ok_or(UnfoldError::StackUnderflow { event: "slot access" })
    }

    /// Checked access to the current level's destination.
    pub fn target<T: 'static>(&mut self) -> UnfoldResult<&mut T> {
        let slot = self.slot()?;
        // SAFETY: the current slot is valid until its level is popped, which
        // requires `&mut self` and therefore ends this borrow first.
        unsafe { slot.downcast_mut::<T>() }
    }

    /// Push a level bound to `slot`.
    ///
    /// Fails with [`UnfoldError::DepthLimitExceeded`] without pushing when
    /// the configured maximum depth is reached.
    pub fn push_level(&mut self, strategy: &'static dyn Strategy, slot: Slot) -> UnfoldResult<()> {
        let depth = self.depth();
        if depth >= self.options.max_depth {
            return Err(UnfoldError::DepthLimitExceeded {
                depth: depth + 1,
                limit: self.options.max_depth,
            });
        }
        trace!(depth = depth + 1, strategy = strategy.type_name(), "push level");
        self.frames.push(Frame::bound(strategy));
        self.values.push(slot);
        self.base_types.push(BaseType::Any);
        Ok(())
    }

    /// Pop the current level; the root level cannot be popped.
    pub fn pop_level(&mut self) -> UnfoldResult<()> {
        if self.depth() <= 1 {
            return Err(UnfoldError::StackUnderflow { event: "pop" });
        }
        self.frames.pop();
        self.values.pop();
        self.base_types.pop();
        trace!(depth = self.depth(), "pop level");
        Ok(())
    }

    /// Finish the current level.
    ///
    /// Nested levels are popped. The root level is re-armed: its original
    /// binding is restored in [`Phase::Bound`], ready for the next value.
    pub fn leave_level(&mut self) {
        if self.depth() > 1 {
            self.frames.pop();
            self.values.pop();
            self.base_types.pop();
            trace!(depth = self.depth(), "pop level");
        } else {
            self.rearm_root();
        }
    }

    /// Resolve the strategy for a type: its direct strategy if it has one,
    /// otherwise the registry's generic strategy for the session tag.
    pub fn resolve(&self, handle: &TypeHandle) -> UnfoldResult<&'static dyn Strategy> {
        match handle.direct() {
            Some(strategy) => Ok(strategy),
            None => registry().resolve(self.options.tag(), handle),
        }
    }

    /// Push a level for the value of type `handle` stored at `at`.
    ///
    /// # Safety
    ///
    /// `at` must point to an initialized value of the type `handle`
    /// describes, stored inside the current level's destination, and stay
    /// valid until the new level is popped.
    pub unsafe fn bind(&mut self, handle: &TypeHandle, at: RawSlot) -> UnfoldResult<()> {
        let strategy = self.resolve(handle)?;
        self.push_level(strategy, Slot::from_raw(at, handle.id(), handle.name()))?;
        strategy.init_state(self)
    }

    /// Replace the current level's binding without changing the depth.
    ///
    /// Used by strategies that delegate their whole value to an inner
    /// location (`Option`, `Box`, dynamic values).
    ///
    /// # Safety
    ///
    /// Same contract as [`bind`](Self::bind), relative to the destination
    /// being replaced.
    pub unsafe fn rebind(&mut self, handle: &TypeHandle, at: RawSlot) -> UnfoldResult<()> {
        let strategy = self.resolve(handle)?;
        let slot = Slot::from_raw(at, handle.id(), handle.name());
        match (self.frames.top_mut(), self.values.top_mut()) {
            (Some(frame), Some(value)) => {
                *frame = Frame::bound(strategy);
                *value = slot;
            }
            _ => return Err(UnfoldError::StackUnderflow { event: "rebind" }),
        }
        if let Some(top) = self.base_types.top_mut() {
            *top = BaseType::Any;
        }
        strategy.init_state(self)
    }

    /// Push a level that discards the next value, nested content included.
    pub fn bind_sink(&mut self) -> UnfoldResult<()> {
        self.push_level(SINK, Slot::detached())
    }

    /// Deliver a primitive event to the current strategy.
    pub fn forward(&mut self, v: Scalar<'_>) -> UnfoldResult<()> {
        let strategy = self.current()?;
        v.dispatch(strategy, self)
    }

    /// Deliver an array start to the current strategy.
    pub fn forward_array_start(&mut self, len: usize, base_type: BaseType) -> UnfoldResult<()> {
        self.current()?.on_array_start(self, len, base_type)
    }

    /// Deliver an object start to the current strategy.
    pub fn forward_object_start(&mut self, len: usize, base_type: BaseType) -> UnfoldResult<()> {
        self.current()?.on_object_start(self, len, base_type)
    }

    /// Error for a finish event the current level cannot accept.
    ///
    /// An idle root has nothing to close and reports
    /// [`UnfoldError::StackUnderflow`].
    pub fn unbalanced(&self, event: &'static str, target: &'static str) -> UnfoldError {
        if self.depth() <= 1 && !self.is_open() {
            UnfoldError::StackUnderflow { event }
        } else {
            UnfoldError::unexpected(event, target)
        }
    }

    // ==================== Keys ====================

    /// Open a key slot for a new object.
    pub fn begin_object(&mut self) {
        self.keys.push(None);
    }

    /// Close the current object's key slot.
    ///
    /// Fails if a key is still waiting for its value.
    pub fn end_object(&mut self) -> UnfoldResult<()> {
        match self.keys.pop() {
            None => Err(UnfoldError::structural("object finished outside of an object")),
            Some(None) => Ok(()),
            Some(Some(key)) => {
                let message = format!("object finished with dangling key {:?}", self.key_str(&key));
                self.release_key(key);
                Err(UnfoldError::structural(message))
            }
        }
    }

    /// Record the key for the next value of the current object.
    pub fn set_key(&mut self, key: String) -> UnfoldResult<()> {
        self.check_key_slot()?;
        self.store_key(PendingKey(KeyRepr::Owned(key)));
        Ok(())
    }

    /// Record a borrowed key, interning it when the key cache is enabled
    /// and copying it into the scratch buffer otherwise.
    pub fn set_key_ref(&mut self, key: &[u8]) -> UnfoldResult<()> {
        self.check_key_slot()?;
        let text = std::str::from_utf8(key)
            .map_err(|e| UnfoldError::conversion("key bytes", "string", e.to_string()))?;
        let repr = if self.key_cache.is_enabled() {
            KeyRepr::Interned(self.key_cache.intern(text))
        } else {
            KeyRepr::Scratch(self.scratch.copy(key))
        };
        self.store_key(PendingKey(repr));
        Ok(())
    }

    fn check_key_slot(&self) -> UnfoldResult<()> {
        match self.keys.top() {
            None => Err(UnfoldError::structural("key received outside of an object")),
            Some(Some(pending)) => Err(UnfoldError::structural(format!(
                "key received while key {:?} is still pending",
                self.key_str(pending)
            ))),
            Some(None) => Ok(()),
        }
    }

    fn store_key(&mut self, key: PendingKey) {
        if let Some(top) = self.keys.top_mut() {
            *top = Some(key);
        }
    }

    /// Take the pending key of the current object.
    ///
    /// Fails when no object is open or the value arrived without a key.
    pub fn take_key(&mut self) -> UnfoldResult<PendingKey> {
        match self.keys.top_mut() {
            None => Err(UnfoldError::structural("value received outside of an object")),
            Some(top) => top
                .take()
                .ok_or_else(|| UnfoldError::structural("value received without a key")),
        }
    }

    /// Text of a pending key.
    pub fn key_str<'k>(&'k self, key: &'k PendingKey) -> &'k str {
        match &key.0 {
            KeyRepr::Owned(s) => s,
            KeyRepr::Interned(s) => s,
            KeyRepr::Scratch(r) => std::str::from_utf8(self.scratch.get(r)).unwrap_or_default(),
        }
    }

    /// Give back a consumed key.
    pub fn release_key(&mut self, key: PendingKey) {
        if let KeyRepr::Scratch(r) = key.0 {
            self.scratch.release(r);
        }
    }

    /// Consume a key into an owned string.
    pub fn key_into_string(&mut self, key: PendingKey) -> String {
        match key.0 {
            KeyRepr::Owned(s) => s,
            KeyRepr::Interned(s) => s.to_string(),
            KeyRepr::Scratch(r) => {
                let text = String::from_utf8_lossy(self.scratch.get(&r)).into_owned();
                self.scratch.release(r);
                text
            }
        }
    }

    // ==================== Auxiliary stacks ====================

    /// Push an element counter for a newly opened sequence.
    pub fn push_index(&mut self, start: usize) {
        self.idxs.push(start);
    }

    /// Current element counter.
    pub fn index(&self) -> UnfoldResult<usize> {
        self.idxs
            .top()
            .copied()
            .ok_or_else(|| UnfoldError::structural("no open sequence"))
    }

    /// Advance the current element counter, returning the new value.
    pub fn commit_index(&mut self) -> UnfoldResult<usize> {
        match self.idxs.top_mut() {
            Some(idx) => {
                *idx += 1;
                Ok(*idx)
            }
            None => Err(UnfoldError::structural("no open sequence")),
        }
    }

    pub fn pop_index(&mut self) -> UnfoldResult<usize> {
        self.idxs
            .pop()
            .ok_or_else(|| UnfoldError::structural("no open sequence"))
    }

    /// Cache a verified location for the current level.
    pub fn push_ptr(&mut self, at: RawSlot) {
        self.ptrs.push(at);
    }

    pub fn ptr(&self) -> UnfoldResult<RawSlot> {
        self.ptrs
            .top()
            .copied()
            .ok_or_else(|| UnfoldError::structural("no cached location"))
    }

    pub fn pop_ptr(&mut self) -> UnfoldResult<RawSlot> {
        self.ptrs
            .pop()
            .ok_or_else(|| UnfoldError::structural("no cached location"))
    }

    /// The session scratch buffer.
    #[inline]
    pub fn scratch(&mut self) -> &mut ScratchBuffer {
        &mut self.scratch
    }

    pub fn key_cache_statistics(&self) -> KeyCacheStatistics {
        self.key_cache.statistics()
    }
}

impl fmt::Debug for UnfoldCtx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnfoldCtx")
            .field("frames", &self.frames)
            .field("root", &self.root.slot.type_name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A decode session.
///
/// Borrows its destination mutably for `'a`; the destination can be read
/// again once the session is dropped.
pub struct Unfolder<'a> {
    ctx: UnfoldCtx<'a>,
}

impl<'a> Unfolder<'a> {
    /// Bind a session to `target` with default options.
    pub fn new(target: impl IntoTarget<'a>) -> UnfoldResult<Self> {
        Self::with_options(target, UnfoldOptions::default())
    }

    /// Bind a session to `target`.
    ///
    /// Fails with [`UnfoldError::RequiresMutableTarget`] for shared
    /// references and [`UnfoldError::Unsupported`] for types without a
    /// decoding strategy, before any event is processed.
    pub fn with_options(target: impl IntoTarget<'a>, options: UnfoldOptions) -> UnfoldResult<Self> {
        let target = target.into_target()?;
        let mut unfolder = Self::detached(options);
        unfolder.ctx.set_root(target)?;
        Ok(unfolder)
    }

    /// A session with no destination; every value is validated and
    /// discarded.
    pub fn detached(options: UnfoldOptions) -> Self {
        Self {
            ctx: UnfoldCtx::new(options),
        }
    }

    /// Reset the session and bind a new destination.
    ///
    /// On failure the session falls back to discarding values.
    pub fn set_target(&mut self, target: impl IntoTarget<'a>) -> UnfoldResult<()> {
        let result = target
            .into_target()
            .and_then(|target| self.ctx.set_root(target));
        if result.is_err() {
            self.ctx.root = Root::sink();
            self.ctx.clear();
        }
        result
    }

    /// Drop back to the root binding for the next decode.
    ///
    /// The root strategy's [`init_state`](Strategy::init_state) runs again,
    /// so nothing carries over from an earlier decode.
    pub fn reset(&mut self) -> UnfoldResult<()> {
        self.ctx.reset()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.ctx.depth()
    }

    /// Returns true when no structure is open: the root waits for a value.
    pub fn is_idle(&self) -> bool {
        self.ctx.depth() == 1 && !self.ctx.is_open()
    }

    #[inline]
    pub fn options(&self) -> &UnfoldOptions {
        self.ctx.options()
    }

    /// Replace the key cache with one holding at most `max` keys.
    pub fn enable_key_cache(&mut self, max: usize) {
        self.ctx.key_cache = KeyCache::new(max);
        self.ctx.options.key_cache_size = max;
    }

    pub fn key_cache_statistics(&self) -> KeyCacheStatistics {
        self.ctx.key_cache_statistics()
    }
}

impl fmt::Debug for Unfolder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unfolder").field("ctx", &self.ctx).finish()
    }
}

macro_rules! forward_primitives {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(&mut self, v: $ty) -> UnfoldResult<()> {
                self.ctx.current()?.$method(&mut self.ctx, v)
            }
        )*
    };
}

impl Visitor for Unfolder<'_> {
    fn on_nil(&mut self) -> UnfoldResult<()> {
        self.ctx.current()?.on_nil(&mut self.ctx)
    }

    forward_primitives! {
        on_bool(bool),
        on_string(String),
        on_string_ref(&[u8]),
        on_i8(i8),
        on_i16(i16),
        on_i32(i32),
        on_i64(i64),
        on_int(isize),
        on_byte(u8),
        on_u8(u8),
        on_u16(u16),
        on_u32(u32),
        on_u64(u64),
        on_uint(usize),
        on_f32(f32),
        on_f64(f64),
    }

    fn on_array_start(&mut self, len: usize, base_type: BaseType) -> UnfoldResult<()> {
        self.ctx.current()?.on_array_start(&mut self.ctx, len, base_type)
    }

    fn on_array_finished(&mut self) -> UnfoldResult<()> {
        let before = self.ctx.depth();
        self.ctx.current()?.on_array_finished(&mut self.ctx)?;
        let after = self.ctx.depth();
        if after > 0 && before != after {
            self.ctx.current()?.on_child_array_done(&mut self.ctx)?;
        }
        Ok(())
    }

    fn on_object_start(&mut self, len: usize, base_type: BaseType) -> UnfoldResult<()> {
        self.ctx.current()?.on_object_start(&mut self.ctx, len, base_type)
    }

    fn on_object_finished(&mut self) -> UnfoldResult<()> {
        let before = self.ctx.depth();
        self.ctx.current()?.on_object_finished(&mut self.ctx)?;
        let after = self.ctx.depth();
        if after > 0 && before != after {
            self.ctx.current()?.on_child_object_done(&mut self.ctx)?;
        }
        Ok(())
    }

    fn on_key(&mut self, key: String) -> UnfoldResult<()> {
        self.ctx.current()?.on_key(&mut self.ctx, key)
    }

    fn on_key_ref(&mut self, key: &[u8]) -> UnfoldResult<()> {
        self.ctx.current()?.on_key_ref(&mut self.ctx, key)
    }
}
