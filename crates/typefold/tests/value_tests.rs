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

//! Schemaless decoding into `Value`.

use std::collections::BTreeMap;
use typefold::{unfold_struct, BaseType, Value};
use typefold_test::fixtures;
use typefold_test::{decode, Event, ScriptBuilder};

#[test]
fn test_scalar_values() {
    assert_eq!(decode::<Value>(&[Event::Nil]).unwrap(), Value::Nil);
    assert_eq!(decode::<Value>(&[Event::Bool(true)]).unwrap(), Value::Bool(true));
    assert_eq!(decode::<Value>(&[Event::I16(-2)]).unwrap(), Value::Int(-2));
    assert_eq!(decode::<Value>(&[Event::Byte(2)]).unwrap(), Value::Uint(2));
    assert_eq!(decode::<Value>(&[Event::F32(0.5)]).unwrap(), Value::Float(0.5));
    assert_eq!(
        decode::<Value>(&[Event::string_ref("txt")]).unwrap(),
        Value::String("txt".to_string())
    );
}

#[test]
fn test_record_as_value() {
    let value: Value = decode(&fixtures::record_script()).unwrap();
    assert_eq!(value.get("a"), Some(&Value::Int(3)));
    assert_eq!(
        value.get("b").and_then(Value::as_array),
        Some(&[Value::Bool(true), Value::Bool(false)][..])
    );
}

#[test]
fn test_byte_hint_produces_bytes() {
    let events = [
        Event::ArrayStart(2, BaseType::Byte),
        Event::Byte(0xde),
        Event::Byte(0xad),
        Event::ArrayFinished,
    ];
    let value: Value = decode(&events).unwrap();
    assert_eq!(value, Value::Bytes(vec![0xde, 0xad]));
}

#[test]
fn test_mixed_nested_value() {
    let script = ScriptBuilder::new()
        .borrowed_keys()
        .object(2)
        .key("list")
        .array(3)
        .event(Event::Nil)
        .object(1)
        .entry("k", Event::string("v"))
        .end_object()
        .typed_array(1, BaseType::Uint8)
        .event(Event::U8(9))
        .end_array()
        .end_array()
        .entry("n", Event::U64(5))
        .end_object()
        .build();
    let value: Value = decode(&script).unwrap();

    let mut inner = BTreeMap::new();
    inner.insert("k".to_string(), Value::String("v".to_string()));
    let list = vec![Value::Nil, Value::Object(inner), Value::Bytes(vec![9])];
    let mut expected = BTreeMap::new();
    expected.insert("list".to_string(), Value::Array(list));
    expected.insert("n".to_string(), Value::Uint(5));
    assert_eq!(value, Value::Object(expected));
}

#[test]
fn test_every_fixture_decodes_as_value() {
    for (name, script) in fixtures::all_scripts() {
        let value: Value = decode(&script()).unwrap_or_else(|e| panic!("{}: {}", name, e));
        assert!(value.as_object().is_some(), "{} is not an object", name);
    }
}

#[test]
fn test_value_reused_across_decodes() {
    let mut value = Value::Array(vec![Value::Int(1)]);
    typefold_test::decode_into(&mut value, &[Event::Bool(false)], Default::default()).unwrap();
    assert_eq!(value, Value::Bool(false));
}

#[derive(Debug, Default)]
struct Envelope {
    kind: String,
    payload: Value,
}

unfold_struct! {
    Envelope {
        kind,
        payload,
    }
}

#[test]
fn test_value_field_in_struct() {
    let script = ScriptBuilder::new()
        .object(2)
        .entry("kind", Event::string("ping"))
        .key("payload")
        .object(1)
        .entry("seq", Event::I64(4))
        .end_object()
        .end_object()
        .build();
    let envelope: Envelope = decode(&script).unwrap();
    assert_eq!(envelope.kind, "ping");
    assert_eq!(envelope.payload.get("seq").and_then(Value::as_i64), Some(4));
}
