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

//! Destination types and the event scripts that fill them.
//!
//! Every script is a single well-formed value, so it can also be replayed
//! against a detached session or a [`Value`](typefold::Value).

use crate::builder::ScriptBuilder;
use crate::events::Event;
use std::collections::HashMap;
use typefold::{unfold_struct, BaseType};

/// Type alias for a list of named scripts.
pub type ScriptList = Vec<(&'static str, fn() -> Vec<Event>)>;

/// Two-field record: an integer and a list of flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub a: i64,
    pub b: Vec<bool>,
}

unfold_struct! {
    Record {
        a => { "struct": "a", "json": "alpha" },
        b => { "struct": "b", "json": "beta" },
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip: Option<u32>,
}

unfold_struct! {
    Address {
        street,
        city,
        zip => { "json": "postal_code,omitempty" },
    }
}

/// A struct exercising every generic container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: u8,
    pub email: Option<String>,
    pub tags: Vec<String>,
    pub address: Address,
    pub previous: Vec<Address>,
    pub scores: HashMap<String, f64>,
    pub manager: Option<Box<Person>>,
    /// Never decoded under the `json` tag.
    pub session_token: String,
}

unfold_struct! {
    Person {
        name => { "json": "full_name" },
        age,
        email,
        tags,
        address,
        previous,
        scores,
        manager,
        session_token => { "json": "-" },
    }
}

/// Nested sequences of primitives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    pub rows: Vec<Vec<i32>>,
    pub corner: [f64; 2],
}

unfold_struct! {
    Matrix {
        rows,
        corner,
    }
}

/// The events for `{a: 3, b: [true, false]}`.
pub fn record_script() -> Vec<Event> {
    ScriptBuilder::new()
        .object(2)
        .entry("a", Event::I64(3))
        .key("b")
        .typed_array(2, BaseType::Bool)
        .event(Event::Bool(true))
        .event(Event::Bool(false))
        .end_array()
        .end_object()
        .build()
}

/// The record expected from [`record_script`].
pub fn record() -> Record {
    Record {
        a: 3,
        b: vec![true, false],
    }
}

fn address_events(builder: ScriptBuilder, street: &str, city: &str, zip: Option<u32>) -> ScriptBuilder {
    let builder = builder
        .object(3)
        .entry("street", Event::string(street))
        .entry("city", Event::string_ref(city))
        .key("zip");
    let zip = zip.map_or(Event::Nil, Event::U32);
    builder.event(zip).end_object()
}

/// A full person, keys in declaration order.
pub fn person_script() -> Vec<Event> {
    let builder = ScriptBuilder::new()
        .object(9)
        .entry("name", Event::string("Ada"))
        .entry("age", Event::U8(36))
        .entry("email", Event::string_ref("ada@example.com"))
        .key("tags")
        .typed_array(2, BaseType::String)
        .event(Event::string("math"))
        .event(Event::string_ref("engines"))
        .end_array()
        .key("address");
    let builder = address_events(builder, "1 Analytical Row", "London", Some(1815))
        .key("previous")
        .array(2);
    let builder = address_events(builder, "Old Lane", "Marylebone", None);
    let builder = address_events(builder, "Ockham Park", "Surrey", Some(42));
    builder
        .end_array()
        .key("scores")
        .object(2)
        .entry("logic", Event::F64(9.5))
        .entry("poetry", Event::I32(7))
        .end_object()
        .key("manager")
        .object(1)
        .entry("name", Event::string("Charles"))
        .end_object()
        .entry("session_token", Event::string("t0k3n"))
        .end_object()
        .build()
}

/// The person expected from [`person_script`].
pub fn person() -> Person {
    Person {
        name: "Ada".to_string(),
        age: 36,
        email: Some("ada@example.com".to_string()),
        tags: vec!["math".to_string(), "engines".to_string()],
        address: Address {
            street: "1 Analytical Row".to_string(),
            city: "London".to_string(),
            zip: Some(1815),
        },
        previous: vec![
            Address {
                street: "Old Lane".to_string(),
                city: "Marylebone".to_string(),
                zip: None,
            },
            Address {
                street: "Ockham Park".to_string(),
                city: "Surrey".to_string(),
                zip: Some(42),
            },
        ],
        scores: HashMap::from([("logic".to_string(), 9.5), ("poetry".to_string(), 7.0)]),
        manager: Some(Box::new(Person {
            name: "Charles".to_string(),
            ..Person::default()
        })),
        session_token: "t0k3n".to_string(),
    }
}

/// `{rows: [[1, 2], [], [3]], corner: [0.5, -1]}`.
pub fn matrix_script() -> Vec<Event> {
    ScriptBuilder::new()
        .object(2)
        .key("rows")
        .array(3)
        .typed_array(2, BaseType::Int32)
        .event(Event::I32(1))
        .event(Event::I32(2))
        .end_array()
        .array(0)
        .end_array()
        .array(1)
        .event(Event::I8(3))
        .end_array()
        .end_array()
        .key("corner")
        .array(2)
        .event(Event::F64(0.5))
        .event(Event::I64(-1))
        .end_array()
        .end_object()
        .build()
}

/// The matrix expected from [`matrix_script`].
pub fn matrix() -> Matrix {
    Matrix {
        rows: vec![vec![1, 2], vec![], vec![3]],
        corner: [0.5, -1.0],
    }
}

/// Every script, for tests that run across all of them.
pub fn all_scripts() -> ScriptList {
    vec![
        ("record", record_script),
        ("person", person_script),
        ("matrix", matrix_script),
    ]
}
