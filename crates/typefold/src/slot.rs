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

//! Destination locations.
//!
//! Strategies write into storage owned by the caller's destination graph.
//! Two handle kinds exist:
//!
//! - [`Slot`]: a type-erased location tagged with its [`TypeId`]. Every level
//!   of the value stack holds one; access is checked against the expected
//!   type.
//! - [`RawSlot`]: an untyped location. Shape operations and direct-binding
//!   strategies use it once a type has been verified, avoiding the check on
//!   every element write.
//!
//! # Validity
//!
//! A location pushed for a level is valid until that level is popped. While a
//! nested level is active its ancestors do not touch their own storage, so
//! the only live access to any part of the destination is the one made by the
//! current strategy.

use crate::error::{UnfoldError, UnfoldResult};
use std::any::{type_name, TypeId};
use std::ptr::NonNull;

/// Untyped destination location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSlot(NonNull<u8>);

impl RawSlot {
    /// Location of an existing value.
    #[inline]
    pub fn from_mut<T>(value: &mut T) -> Self {
        Self(NonNull::from(value).cast())
    }

    /// A location that must never be dereferenced.
    #[inline]
    pub fn dangling() -> Self {
        Self(NonNull::dangling())
    }

    /// Raw pointer to the location.
    #[inline]
    pub fn as_ptr(self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Offset the location by `offset` bytes.
    ///
    /// # Safety
    ///
    /// The result must stay within the allocation this location points into.
    #[inline]
    pub unsafe fn byte_add(self, offset: usize) -> Self {
        Self(NonNull::new_unchecked(self.0.as_ptr().add(offset)))
    }

    /// Reinterpret the location as a `T`.
    ///
    /// # Safety
    ///
    /// The location must hold an initialized `T`, and no other reference to
    /// it may be live for `'s`.
    #[inline]
    pub unsafe fn as_mut<'s, T>(self) -> &'s mut T {
        &mut *self.0.as_ptr().cast::<T>()
    }
}

/// Type-checked, type-erased destination location.
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    raw: RawSlot,
    type_id: TypeId,
    type_name: &'static str,
}

impl Slot {
    /// Slot for an existing value.
    pub fn of<T: 'static>(value: &mut T) -> Self {
        Self {
            raw: RawSlot::from_mut(value),
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }

    /// Slot for a location known to hold the given type.
    ///
    /// # Safety
    ///
    /// `raw` must point to an initialized value of the type identified by
    /// `type_id`.
    #[inline]
    pub unsafe fn from_raw(raw: RawSlot, type_id: TypeId, type_name: &'static str) -> Self {
        Self {
            raw,
            type_id,
            type_name,
        }
    }

    /// Slot with no storage behind it, used by strategies that discard input.
    pub(crate) fn detached() -> Self {
        Self {
            raw: RawSlot::dangling(),
            type_id: TypeId::of::<()>(),
            type_name: "()",
        }
    }

    /// The untyped location.
    #[inline]
    pub fn raw(&self) -> RawSlot {
        self.raw
    }

    /// Identity of the stored type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the stored type.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true if the slot holds a `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Checked access to the stored value.
    ///
    /// # Safety
    ///
    /// The slot must still be valid (its level has not been popped) and no
    /// other reference to the location may be live for `'s`.
    pub unsafe fn downcast_mut<'s, T: 'static>(&self) -> UnfoldResult<&'s mut T> {
        if !self.is::<T>() {
            return Err(UnfoldError::TargetMismatch {
                expected: type_name::<T>(),
                found: self.type_name,
            });
        }
        Ok(self.raw.as_mut::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_downcast_matches() {
        let mut value = 41u32;
        let slot = Slot::of(&mut value);
        assert!(slot.is::<u32>());
        let v = unsafe { slot.downcast_mut::<u32>() }.unwrap();
        *v += 1;
        assert_eq!(value, 42);
    }

    #[test]
    fn test_slot_downcast_mismatch() {
        let mut value = 1u32;
        let slot = Slot::of(&mut value);
        let err = unsafe { slot.downcast_mut::<i64>() }.unwrap_err();
        assert!(matches!(err, UnfoldError::TargetMismatch { .. }));
    }

    #[test]
    fn test_raw_slot_byte_add() {
        let mut pair = [1u16, 2u16];
        let raw = RawSlot::from_mut(&mut pair);
        let second = unsafe { raw.byte_add(std::mem::size_of::<u16>()).as_mut::<u16>() };
        *second = 7;
        assert_eq!(pair, [1, 7]);
    }

    #[test]
    fn test_detached_slot() {
        let slot = Slot::detached();
        assert!(slot.is::<()>());
        assert_eq!(slot.type_name(), "()");
    }
}
