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

//! Shared registry behavior under concurrent sessions.

use std::sync::Barrier;
use std::thread;
use typefold::{registry, unfold_struct, TypeHandle, UnfoldOptions};
use typefold_test::fixtures::{self, Person, Record};
use typefold_test::{decode, decode_with};

const SESSIONS: usize = 8;

/// Only ever resolved by the concurrency test below.
#[derive(Debug, Default, PartialEq)]
struct Fresh {
    id: u64,
    labels: Vec<String>,
}

unfold_struct! {
    Fresh {
        id,
        labels,
    }
}

#[test]
fn test_concurrent_sessions_agree() {
    let barrier = Barrier::new(SESSIONS);
    let results: Vec<Person> = thread::scope(|scope| {
        let handles: Vec<_> = (0..SESSIONS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    decode::<Person>(&fixtures::person_script())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("session thread panicked"))
            .collect::<Result<_, _>>()
            .expect("decode failed")
    });
    assert_eq!(results.len(), SESSIONS);
    for person in &results {
        assert_eq!(person, &fixtures::person());
    }
}

#[test]
fn test_racing_first_resolution_is_idempotent() {
    let handle = TypeHandle::of::<Fresh>();
    let barrier = Barrier::new(SESSIONS);
    let script = typefold_test::ScriptBuilder::new()
        .object(2)
        .entry("id", typefold_test::Event::U64(7))
        .key("labels")
        .array(1)
        .event(typefold_test::Event::string("x"))
        .end_array()
        .end_object()
        .build();
    thread::scope(|scope| {
        for _ in 0..SESSIONS {
            scope.spawn(|| {
                barrier.wait();
                let fresh: Fresh = decode(&script).expect("decode failed");
                assert_eq!(fresh, Fresh { id: 7, labels: vec!["x".to_string()] });
            });
        }
    });
    assert!(registry().find("struct", handle.id()).is_some());
    let again: Fresh = decode(&script).unwrap();
    assert_eq!(again.id, 7);
}

#[test]
fn test_cached_strategy_is_reused() {
    let handle = TypeHandle::of::<Record>();
    decode::<Record>(&fixtures::record_script()).unwrap();
    let first = registry().find("struct", handle.id()).expect("cached");
    decode::<Record>(&fixtures::record_script()).unwrap();
    let second = registry().find("struct", handle.id()).expect("cached");
    assert!(std::ptr::eq(
        first as *const dyn typefold::Strategy as *const (),
        second as *const dyn typefold::Strategy as *const ()
    ));
}

#[test]
fn test_tags_cache_separately() {
    let handle = TypeHandle::of::<Record>();
    let options = UnfoldOptions::builder().tag("registry-test").build();
    let script = typefold_test::ScriptBuilder::new()
        .object(1)
        .entry("a", typefold_test::Event::I64(2))
        .end_object()
        .build();
    let record: Record = decode_with(&script, options).unwrap();
    assert_eq!(record.a, 2);
    assert!(registry().find("registry-test", handle.id()).is_some());
    assert!(registry().find("registry-unused", handle.id()).is_none());
}

#[test]
fn test_direct_types_bypass_registry() {
    let handle = TypeHandle::of::<Vec<u32>>();
    decode::<Vec<u32>>(&[
        typefold_test::Event::ArrayStart(1, typefold::BaseType::Uint32),
        typefold_test::Event::U32(1),
        typefold_test::Event::ArrayFinished,
    ])
    .unwrap();
    assert!(handle.direct().is_some());
    assert!(registry().find("struct", handle.id()).is_none());
}
