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

//! Primitive destinations bound at the root.

use typefold::{
    unfold_struct, BaseType, ScalarShape, Shape, Unfold, UnfoldError, Unfolder, Visitor,
};
use typefold_test::{decode, Event};

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_each_primitive_event_round_trips() {
    assert!(decode::<bool>(&[Event::Bool(true)]).unwrap());
    assert_eq!(decode::<i8>(&[Event::I8(-8)]).unwrap(), -8);
    assert_eq!(decode::<i16>(&[Event::I16(-16)]).unwrap(), -16);
    assert_eq!(decode::<i32>(&[Event::I32(-32)]).unwrap(), -32);
    assert_eq!(decode::<i64>(&[Event::I64(i64::MIN)]).unwrap(), i64::MIN);
    assert_eq!(decode::<isize>(&[Event::Int(-1)]).unwrap(), -1);
    assert_eq!(decode::<u8>(&[Event::Byte(0xfe)]).unwrap(), 0xfe);
    assert_eq!(decode::<u8>(&[Event::U8(8)]).unwrap(), 8);
    assert_eq!(decode::<u16>(&[Event::U16(16)]).unwrap(), 16);
    assert_eq!(decode::<u32>(&[Event::U32(32)]).unwrap(), 32);
    assert_eq!(decode::<u64>(&[Event::U64(u64::MAX)]).unwrap(), u64::MAX);
    assert_eq!(decode::<usize>(&[Event::Uint(7)]).unwrap(), 7);
    assert_eq!(decode::<f32>(&[Event::F32(1.25)]).unwrap(), 1.25);
    assert_eq!(decode::<f64>(&[Event::F64(-0.5)]).unwrap(), -0.5);
    assert_eq!(decode::<String>(&[Event::string("owned")]).unwrap(), "owned");
    assert_eq!(decode::<String>(&[Event::string_ref("borrowed")]).unwrap(), "borrowed");
}

#[test]
fn test_nil_writes_zero_value() {
    let mut value = 99i32;
    let mut unfolder = Unfolder::new(&mut value).unwrap();
    unfolder.on_nil().unwrap();
    drop(unfolder);
    assert_eq!(value, 0);
}

#[test]
fn test_root_accepts_consecutive_values() {
    let mut value = 0u16;
    let mut unfolder = Unfolder::new(&mut value).unwrap();
    unfolder.on_u16(1).unwrap();
    assert!(unfolder.is_idle());
    unfolder.on_u16(2).unwrap();
    assert!(unfolder.is_idle());
    drop(unfolder);
    assert_eq!(value, 2);
}

// =============================================================================
// Conversions
// =============================================================================

#[test]
fn test_integer_out_of_range() {
    let err = decode::<u8>(&[Event::I64(256)]).unwrap_err();
    assert!(matches!(err, UnfoldError::Conversion { to: "u8", .. }));
    assert!(decode::<u64>(&[Event::I8(-1)]).is_err());
}

#[test]
fn test_numeric_strings_parse() {
    assert_eq!(decode::<i32>(&[Event::string_ref("-12")]).unwrap(), -12);
    assert_eq!(decode::<f64>(&[Event::string("3.5")]).unwrap(), 3.5);
    assert!(decode::<bool>(&[Event::string("true")]).unwrap());
}

#[test]
fn test_wrong_kind_is_conversion_error() {
    let err = decode::<String>(&[Event::I64(1)]).unwrap_err();
    assert_eq!(err.category(), typefold::ErrorCategory::Conversion);
    assert!(decode::<bool>(&[Event::U8(1)]).is_err());
}

#[test]
fn test_invalid_utf8_string_ref() {
    let err = decode::<String>(&[Event::StringRef(vec![0xff, 0x00])]).unwrap_err();
    assert!(matches!(err, UnfoldError::Conversion { .. }));
}

// =============================================================================
// Structural Events on Leaves
// =============================================================================

#[test]
fn test_leaf_rejects_array_start() {
    let mut value = 0i64;
    let mut unfolder = Unfolder::new(&mut value).unwrap();
    let err = unfolder.on_array_start(1, BaseType::Any).unwrap_err();
    assert!(err.is_structural());
    assert_eq!(unfolder.depth(), 1);
}

#[test]
fn test_leaf_rejects_object_start() {
    let err = decode::<String>(&[Event::ObjectStart(0, BaseType::Any)]).unwrap_err();
    assert_eq!(
        err,
        UnfoldError::UnexpectedEvent {
            event: "object start",
            target: "alloc::string::String"
        }
    );
}

// =============================================================================
// Scalar Shapes
// =============================================================================

/// Wraps a primitive and declares a scalar shape, so it is served by the
/// registry rather than a direct strategy.
#[derive(Debug, Default, PartialEq)]
struct Celsius(f64);

unsafe fn write_celsius(at: typefold::RawSlot, v: typefold::Scalar<'_>) -> typefold::UnfoldResult<()> {
    let degrees = <f64 as typefold::Primitive>::from_scalar(v)?;
    *at.as_mut::<Celsius>() = Celsius(degrees);
    Ok(())
}

impl Unfold for Celsius {
    fn shape() -> Shape {
        Shape::Scalar(ScalarShape {
            base_type: BaseType::Float64,
            write: write_celsius,
        })
    }
}

#[derive(Debug, Default, PartialEq)]
struct Reading {
    temperature: Celsius,
    history: Vec<Celsius>,
}

unfold_struct! {
    Reading {
        temperature,
        history,
    }
}

#[test]
fn test_scalar_shape_at_root() {
    assert!(Celsius::direct().is_none());
    assert_eq!(decode::<Celsius>(&[Event::I32(21)]).unwrap(), Celsius(21.0));
}

#[test]
fn test_scalar_shape_inside_containers() {
    let events = vec![
        Event::ObjectStart(2, BaseType::Any),
        Event::key("temperature"),
        Event::F32(19.5),
        Event::key("history"),
        Event::ArrayStart(2, BaseType::Float64),
        Event::F64(18.0),
        Event::string("17.25"),
        Event::ArrayFinished,
        Event::ObjectFinished,
    ];
    let reading: Reading = decode(&events).unwrap();
    assert_eq!(reading.temperature, Celsius(19.5));
    assert_eq!(reading.history, vec![Celsius(18.0), Celsius(17.25)]);
}
