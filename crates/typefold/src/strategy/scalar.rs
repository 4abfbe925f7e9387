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

//! Scalar leaves and scalar sequences.
//!
//! Every primitive type binds directly to a [`LeafStrategy`], and `Vec` of a
//! primitive binds directly to a [`ScalarSeq`], so neither ever reaches the
//! registry. Types that wrap a primitive can declare a [`Shape::Scalar`] and
//! are served by the generic [`ScalarStrategy`].
//!
//! # Conversions
//!
//! | Event | Integer | Float | `bool` | `String` |
//! |-------|---------|-------|--------|----------|
//! | nil | `0` | `0.0` | `false` | empty |
//! | integer | range-checked | widened | error | error |
//! | float | integral and in range | `f32` range-checked | error | error |
//! | string | parsed | parsed | parsed | as is (UTF-8 checked) |
//! | bool | error | error | as is | error |

use super::Strategy;
use crate::context::UnfoldCtx;
use crate::error::{UnfoldError, UnfoldResult};
use crate::event::{BaseType, Number, Scalar};
use crate::shape::{ScalarShape, Shape, Unfold};
use crate::slot::RawSlot;
use std::any::type_name;
use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

/// Reservation cap for size hints that do not match the element type.
const UNTRUSTED_RESERVE_LIMIT: usize = 4096;

/// Reservation cap for size hints that match the element type. Hints are
/// still advisory: a producer may announce more elements than it sends.
const TRUSTED_RESERVE_LIMIT: usize = 1 << 16;

/// A type written by a single primitive event.
pub trait Primitive: Unfold + Default {
    /// Element hint producers use for homogeneous arrays of this type.
    const BASE_TYPE: BaseType;

    /// Convert a primitive event.
    fn from_scalar(v: Scalar<'_>) -> UnfoldResult<Self>;
}

impl ScalarShape {
    /// Scalar shape writing a [`Primitive`].
    pub fn of<T: Primitive>() -> Self {
        Self {
            base_type: T::BASE_TYPE,
            write: write_primitive::<T>,
        }
    }
}

unsafe fn write_primitive<T: Primitive>(at: RawSlot, v: Scalar<'_>) -> UnfoldResult<()> {
    let value = T::from_scalar(v)?;
    *at.as_mut::<T>() = value;
    Ok(())
}

fn text<'v>(bytes: &'v [u8], to: &'static str) -> UnfoldResult<&'v str> {
    std::str::from_utf8(bytes).map_err(|e| UnfoldError::conversion("string", to, e.to_string()))
}

fn parse<T>(s: &str, to: &'static str) -> UnfoldResult<T>
where
    T: FromStr,
    <T as FromStr>::Err: Display,
{
    s.trim()
        .parse::<T>()
        .map_err(|e| UnfoldError::conversion("string", to, format!("{:?}: {}", s, e)))
}

fn convert_int<T>(v: Scalar<'_>, to: &'static str) -> UnfoldResult<T>
where
    T: TryFrom<i128> + FromStr + Default,
    <T as FromStr>::Err: Display,
{
    let wide: i128 = match v {
        Scalar::Nil => return Ok(T::default()),
        Scalar::String(ref s) => return parse(s, to),
        Scalar::StringRef(bytes) => return parse(text(bytes, to)?, to),
        _ => match v.number() {
            Some(Number::Signed(n)) => n.into(),
            Some(Number::Unsigned(n)) => n.into(),
            Some(Number::Float(f)) => {
                if !f.is_finite() || f.fract() != 0.0 {
                    return Err(UnfoldError::conversion(
                        v.kind(),
                        to,
                        format!("{} is not an integer", f),
                    ));
                }
                f as i128
            }
            None => return Err(UnfoldError::conversion(v.kind(), to, "expected a number")),
        },
    };
    T::try_from(wide)
        .map_err(|_| UnfoldError::conversion(v.kind(), to, format!("{} is out of range", wide)))
}

fn convert_f64(v: Scalar<'_>, to: &'static str) -> UnfoldResult<f64> {
    match v {
        Scalar::Nil => Ok(0.0),
        Scalar::String(ref s) => parse(s, to),
        Scalar::StringRef(bytes) => parse(text(bytes, to)?, to),
        _ => match v.number() {
            Some(Number::Signed(n)) => Ok(n as f64),
            Some(Number::Unsigned(n)) => Ok(n as f64),
            Some(Number::Float(f)) => Ok(f),
            None => Err(UnfoldError::conversion(v.kind(), to, "expected a number")),
        },
    }
}

macro_rules! impl_primitive_int {
    ($($t:ty => $base:ident),* $(,)?) => {
        $(
            impl Primitive for $t {
                const BASE_TYPE: BaseType = BaseType::$base;

                fn from_scalar(v: Scalar<'_>) -> UnfoldResult<Self> {
                    convert_int(v, stringify!($t))
                }
            }
        )*
    };
}

impl_primitive_int! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    isize => Int,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    usize => Uint,
}

impl Primitive for f64 {
    const BASE_TYPE: BaseType = BaseType::Float64;

    fn from_scalar(v: Scalar<'_>) -> UnfoldResult<Self> {
        convert_f64(v, "f64")
    }
}

impl Primitive for f32 {
    const BASE_TYPE: BaseType = BaseType::Float32;

    fn from_scalar(v: Scalar<'_>) -> UnfoldResult<Self> {
        let kind = v.kind();
        let wide = convert_f64(v, "f32")?;
        if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
            return Err(UnfoldError::conversion(
                kind,
                "f32",
                format!("{} is out of range", wide),
            ));
        }
        Ok(wide as f32)
    }
}

impl Primitive for bool {
    const BASE_TYPE: BaseType = BaseType::Bool;

    fn from_scalar(v: Scalar<'_>) -> UnfoldResult<Self> {
        match v {
            Scalar::Nil => Ok(false),
            Scalar::Bool(b) => Ok(b),
            Scalar::String(ref s) => parse(s, "bool"),
            Scalar::StringRef(bytes) => parse(text(bytes, "bool")?, "bool"),
            other => Err(UnfoldError::conversion(other.kind(), "bool", "expected a bool")),
        }
    }
}

impl Primitive for String {
    const BASE_TYPE: BaseType = BaseType::String;

    fn from_scalar(v: Scalar<'_>) -> UnfoldResult<Self> {
        match v {
            Scalar::Nil => Ok(String::new()),
            Scalar::String(s) => Ok(s),
            Scalar::StringRef(bytes) => Ok(text(bytes, "String")?.to_owned()),
            other => Err(UnfoldError::conversion(
                other.kind(),
                "String",
                "expected a string",
            )),
        }
    }
}

macro_rules! impl_unfold_primitive {
    ($($t:ty),* $(,)?) => {
        $(
            impl Unfold for $t {
                fn shape() -> Shape {
                    Shape::Scalar(ScalarShape::of::<$t>())
                }

                fn direct() -> Option<&'static dyn Strategy> {
                    Some(LeafStrategy::<$t>::INSTANCE)
                }

                fn vec_direct() -> Option<&'static dyn Strategy> {
                    Some(ScalarSeq::<$t>::INSTANCE)
                }
            }
        )*
    };
}

impl_unfold_primitive!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String);

/// Direct strategy writing one primitive.
pub struct LeafStrategy<T>(PhantomData<fn() -> T>);

impl<T: Primitive> LeafStrategy<T> {
    pub const INSTANCE: &'static Self = &Self(PhantomData);
}

impl<T: Primitive> Strategy for LeafStrategy<T> {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        let value = T::from_scalar(v)?;
        *ctx.target::<T>()? = value;
        ctx.leave_level();
        Ok(())
    }
}

/// Direct strategy for `Vec` of a primitive.
///
/// The vector's location is verified once when the array opens and cached
/// on the pointer stack; elements are appended through the cached location.
pub struct ScalarSeq<T>(PhantomData<fn() -> T>);

impl<T: Primitive> ScalarSeq<T> {
    pub const INSTANCE: &'static Self = &Self(PhantomData);

    fn trusts(hint: BaseType) -> bool {
        hint == T::BASE_TYPE || (hint.is_bytes() && T::BASE_TYPE.is_bytes())
    }

    /// Elements to reserve for an announced length.
    fn reservation(len: usize, hint: BaseType) -> usize {
        if Self::trusts(hint) {
            len.min(TRUSTED_RESERVE_LIMIT)
        } else {
            len.min(UNTRUSTED_RESERVE_LIMIT)
        }
    }
}

impl<T: Primitive> Strategy for ScalarSeq<T> {
    fn type_name(&self) -> &'static str {
        type_name::<Vec<T>>()
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        if ctx.is_open() {
            let item = T::from_scalar(v)?;
            let at = ctx.ptr()?;
            // SAFETY: cached from this level's checked `Vec<T>` slot when the
            // array opened; nothing else touches it while the level is open.
            unsafe { at.as_mut::<Vec<T>>() }.push(item);
            ctx.commit_index()?;
            return Ok(());
        }
        match v {
            Scalar::Nil => {
                ctx.target::<Vec<T>>()?.clear();
                ctx.leave_level();
                Ok(())
            }
            other => Err(UnfoldError::unexpected(other.kind(), self.type_name())),
        }
    }

    fn on_array_start(
        &self,
        ctx: &mut UnfoldCtx<'_>,
        len: usize,
        base_type: BaseType,
    ) -> UnfoldResult<()> {
        if ctx.is_open() {
            return Err(UnfoldError::unexpected("array start", self.type_name()));
        }
        ctx.open(base_type);
        let reserve = Self::reservation(len, ctx.base_type());
        let vec = ctx.target::<Vec<T>>()?;
        vec.clear();
        if vec.try_reserve(reserve).is_err() {
            vec.reserve(reserve.min(UNTRUSTED_RESERVE_LIMIT));
        }
        let at = RawSlot::from_mut(vec);
        ctx.push_ptr(at);
        ctx.push_index(0);
        Ok(())
    }

    fn on_array_finished(&self, ctx: &mut UnfoldCtx<'_>) -> UnfoldResult<()> {
        if !ctx.is_open() {
            return Err(ctx.unbalanced("array finish", self.type_name()));
        }
        ctx.pop_ptr()?;
        ctx.pop_index()?;
        ctx.leave_level();
        Ok(())
    }
}

/// Generic strategy for [`Shape::Scalar`] types.
pub(crate) struct ScalarStrategy {
    type_name: &'static str,
    shape: ScalarShape,
}

impl ScalarStrategy {
    pub(crate) fn new(type_name: &'static str, shape: ScalarShape) -> Self {
        Self { type_name, shape }
    }
}

impl Strategy for ScalarStrategy {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn on_scalar(&self, ctx: &mut UnfoldCtx<'_>, v: Scalar<'_>) -> UnfoldResult<()> {
        let slot = ctx.slot()?;
        // SAFETY: the slot was bound from a handle whose shape produced this
        // strategy, so it holds the type `write` expects.
        unsafe { (self.shape.write)(slot.raw(), v)? };
        ctx.leave_level();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Integer conversion tests ====================

    #[test]
    fn test_int_widening_and_narrowing() {
        assert_eq!(i64::from_scalar(Scalar::U8(7)).unwrap(), 7);
        assert_eq!(u8::from_scalar(Scalar::I64(255)).unwrap(), 255);
        assert_eq!(i8::from_scalar(Scalar::Int(-128)).unwrap(), -128);
    }

    #[test]
    fn test_int_out_of_range() {
        let err = u8::from_scalar(Scalar::I64(300)).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(u32::from_scalar(Scalar::I8(-1)).is_err());
        assert!(i64::from_scalar(Scalar::U64(u64::MAX)).is_err());
    }

    #[test]
    fn test_int_from_float() {
        assert_eq!(i32::from_scalar(Scalar::F64(42.0)).unwrap(), 42);
        assert!(i32::from_scalar(Scalar::F64(1.5)).is_err());
        assert!(i64::from_scalar(Scalar::F64(f64::NAN)).is_err());
        assert!(u16::from_scalar(Scalar::F32(70000.0)).is_err());
    }

    #[test]
    fn test_int_from_string() {
        assert_eq!(u16::from_scalar(Scalar::String(" 80 ".into())).unwrap(), 80);
        assert_eq!(i64::from_scalar(Scalar::StringRef(b"-9")).unwrap(), -9);
        let err = i64::from_scalar(Scalar::String("nine".into())).unwrap_err();
        assert!(matches!(err, UnfoldError::Conversion { .. }));
    }

    #[test]
    fn test_int_from_nil_and_bool() {
        assert_eq!(u64::from_scalar(Scalar::Nil).unwrap(), 0);
        assert!(i64::from_scalar(Scalar::Bool(true)).is_err());
    }

    // ==================== Float conversion tests ====================

    #[test]
    fn test_float_conversions() {
        assert_eq!(f64::from_scalar(Scalar::I64(-3)).unwrap(), -3.0);
        assert_eq!(f32::from_scalar(Scalar::F64(0.5)).unwrap(), 0.5);
        assert_eq!(f64::from_scalar(Scalar::StringRef(b"2.25")).unwrap(), 2.25);
        assert!(f32::from_scalar(Scalar::F64(1e300)).is_err());
        assert!(f32::from_scalar(Scalar::F64(f64::INFINITY)).unwrap().is_infinite());
    }

    // ==================== Bool and string tests ====================

    #[test]
    fn test_bool_conversions() {
        assert!(bool::from_scalar(Scalar::Bool(true)).unwrap());
        assert!(bool::from_scalar(Scalar::String("true".into())).unwrap());
        assert!(!bool::from_scalar(Scalar::Nil).unwrap());
        assert!(bool::from_scalar(Scalar::I32(1)).is_err());
    }

    #[test]
    fn test_string_conversions() {
        assert_eq!(String::from_scalar(Scalar::StringRef(b"hey")).unwrap(), "hey");
        assert_eq!(String::from_scalar(Scalar::Nil).unwrap(), "");
        assert!(String::from_scalar(Scalar::StringRef(&[0xc3, 0x28])).is_err());
        assert!(String::from_scalar(Scalar::I64(1)).is_err());
    }

    // ==================== Strategy tests ====================

    #[test]
    fn test_scalar_seq_trusts_matching_hint() {
        assert!(ScalarSeq::<i64>::trusts(BaseType::Int64));
        assert!(ScalarSeq::<u8>::trusts(BaseType::Byte));
        assert!(!ScalarSeq::<i64>::trusts(BaseType::Any));
        assert!(!ScalarSeq::<u16>::trusts(BaseType::Uint8));
    }

    #[test]
    fn test_scalar_seq_reservation_is_capped() {
        assert_eq!(ScalarSeq::<i64>::reservation(10, BaseType::Int64), 10);
        assert_eq!(
            ScalarSeq::<i64>::reservation(usize::MAX, BaseType::Int64),
            TRUSTED_RESERVE_LIMIT
        );
        assert_eq!(
            ScalarSeq::<u8>::reservation(1 << 40, BaseType::Byte),
            TRUSTED_RESERVE_LIMIT
        );
        assert_eq!(
            ScalarSeq::<i64>::reservation(usize::MAX, BaseType::Any),
            UNTRUSTED_RESERVE_LIMIT
        );
    }

    #[test]
    fn test_primitives_bind_directly() {
        assert!(i64::direct().is_some());
        assert!(<Vec<bool>>::direct().is_some());
        assert!(<Vec<Vec<bool>>>::direct().is_none());
        assert_eq!(LeafStrategy::<u32>::INSTANCE.type_name(), "u32");
    }

    #[test]
    fn test_write_primitive() {
        let mut value = 0u16;
        unsafe { write_primitive::<u16>(RawSlot::from_mut(&mut value), Scalar::U8(9)).unwrap() };
        assert_eq!(value, 9);
    }
}
