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

//! Decode throughput benchmarks.
//!
//! Scripts are recorded once; each iteration replays them against a
//! session, so the numbers cover dispatch and writes, not event creation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use typefold::{BaseType, UnfoldOptions, Unfolder, Value};
use typefold_test::fixtures::{self, Person, Record};
use typefold_test::{replay, Event, ScriptBuilder};

const SIZES: [usize; 3] = [10, 100, 1_000];

fn records_script(count: usize, borrowed_keys: bool) -> Vec<Event> {
    let mut builder = ScriptBuilder::new();
    if borrowed_keys {
        builder = builder.borrowed_keys();
    }
    let mut builder = builder.array(count);
    for i in 0..count {
        builder = builder
            .object(2)
            .entry("a", Event::I64(i as i64))
            .key("b")
            .typed_array(3, BaseType::Bool)
            .events([Event::Bool(true), Event::Bool(false), Event::Bool(i % 2 == 0)])
            .end_array()
            .end_object();
    }
    builder.end_array().build()
}

fn scalar_array(count: usize, hint: BaseType) -> Vec<Event> {
    let mut events = Vec::with_capacity(count + 2);
    events.push(Event::ArrayStart(count, hint));
    events.extend((0..count).map(|i| Event::F64(i as f64 * 0.5)));
    events.push(Event::ArrayFinished);
    events
}

fn bench_scalar_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar_sequences");
    for size in SIZES {
        let events = scalar_array(size, BaseType::Float64);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("direct", size), &events, |b, events| {
            let mut values: Vec<f64> = Vec::new();
            b.iter(|| {
                let mut unfolder = Unfolder::new(&mut values).unwrap();
                replay(&mut unfolder, black_box(events)).unwrap();
            });
            black_box(values.len());
        });
        group.bench_with_input(BenchmarkId::new("generic", size), &events, |b, events| {
            let mut values: Vec<Option<f64>> = Vec::new();
            b.iter(|| {
                let mut unfolder = Unfolder::new(&mut values).unwrap();
                replay(&mut unfolder, black_box(events)).unwrap();
            });
            black_box(values.len());
        });
    }
    group.finish();
}

fn bench_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("records");
    for size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        for (name, borrowed, cache) in [
            ("owned_keys", false, 0),
            ("borrowed_keys", true, 0),
            ("borrowed_keys_cached", true, 64),
        ] {
            let events = records_script(size, borrowed);
            let options = UnfoldOptions::builder().key_cache_size(cache).build();
            group.bench_with_input(BenchmarkId::new(name, size), &events, |b, events| {
                let mut records: Vec<Record> = Vec::new();
                let mut unfolder = Unfolder::with_options(&mut records, options.clone()).unwrap();
                b.iter(|| {
                    replay(&mut unfolder, black_box(events)).unwrap();
                });
            });
        }
    }
    group.finish();
}

fn bench_nested_struct(c: &mut Criterion) {
    let events = fixtures::person_script();
    let mut group = c.benchmark_group("person");
    group.bench_function("typed", |b| {
        let mut person = Person::default();
        let mut unfolder = Unfolder::new(&mut person).unwrap();
        b.iter(|| replay(&mut unfolder, black_box(&events)).unwrap());
    });
    group.bench_function("value", |b| {
        let mut value = Value::Nil;
        let mut unfolder = Unfolder::new(&mut value).unwrap();
        b.iter(|| replay(&mut unfolder, black_box(&events)).unwrap());
    });
    group.bench_function("discard", |b| {
        let mut unfolder = Unfolder::detached(UnfoldOptions::default());
        b.iter(|| replay(&mut unfolder, black_box(&events)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_scalar_sequences, bench_records, bench_nested_struct);
criterion_main!(benches);
