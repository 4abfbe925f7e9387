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

//! Decoding with a trace-level subscriber installed.
//!
//! Run with `RUST_LOG=typefold=trace cargo test --test logging_tests -- --nocapture`
//! to see level pushes, registry builds and skipped keys.

use typefold::{UnfoldOptions, Unfolder};
use typefold_test::{fixtures, replay, Event, ScriptBuilder};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing for tests.
fn init_tracing() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_target(true)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_decode_with_tracing() {
    init_tracing();

    let mut person = fixtures::Person::default();
    let mut unfolder = Unfolder::new(&mut person).unwrap();
    replay(&mut unfolder, &fixtures::person_script()).unwrap();
    drop(unfolder);
    assert_eq!(person, fixtures::person());
}

#[test]
fn test_skipped_keys_with_tracing() {
    init_tracing();

    let script = ScriptBuilder::new()
        .borrowed_keys()
        .object(2)
        .entry("unknown", Event::string("ignored"))
        .entry("a", Event::I64(1))
        .end_object()
        .build();
    let options = UnfoldOptions::builder().key_cache_size(8).build();
    let mut record = fixtures::Record::default();
    let mut unfolder = Unfolder::with_options(&mut record, options).unwrap();
    replay(&mut unfolder, &script).unwrap();
    assert_eq!(unfolder.key_cache_statistics().size, 2);
    drop(unfolder);
    assert_eq!(record.a, 1);
}
