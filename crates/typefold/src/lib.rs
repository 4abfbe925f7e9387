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

//! Format-agnostic decoding of push events into typed Rust destinations.
//!
//! A wire-format parser (JSON, CBOR, MessagePack, ...) drives an
//! [`Unfolder`] through the [`Visitor`] surface, one call per token. The
//! unfolder keeps a stack of decoding strategies, one per open level, and
//! writes each value straight into the caller's destination.
//!
//! # Strategies
//!
//! Every destination type is decoded by a [`Strategy`]. Types either supply
//! a hand-written strategy through [`Unfold::direct`] (all primitives,
//! `Vec` of primitives and [`Value`] do) or describe their layout with
//! [`Unfold::shape`] and receive a generic strategy from the process-wide
//! [`TypeRegistry`], which builds it once per tag and type.
//!
//! Structs opt in with [`unfold_struct!`]:
//!
//! ```rust
//! use typefold::{unfold_struct, BaseType, Unfolder, Visitor};
//!
//! #[derive(Debug, Default)]
//! struct Sensor {
//!     id: String,
//!     readings: Vec<f64>,
//! }
//!
//! unfold_struct! {
//!     Sensor {
//!         id,
//!         readings => { "struct": "r" },
//!     }
//! }
//!
//! let mut sensor = Sensor::default();
//! let mut unfolder = Unfolder::new(&mut sensor)?;
//! unfolder.on_object_start(2, BaseType::Any)?;
//! unfolder.on_key_ref(b"r")?;
//! unfolder.on_array_start(2, BaseType::Float64)?;
//! unfolder.on_f64(20.5)?;
//! unfolder.on_f32(21.0)?;
//! unfolder.on_array_finished()?;
//! unfolder.on_key_ref(b"id")?;
//! unfolder.on_string_ref(b"t-01")?;
//! unfolder.on_object_finished()?;
//! drop(unfolder);
//!
//! assert_eq!(sensor.id, "t-01");
//! assert_eq!(sensor.readings, vec![20.5, 21.0]);
//! # Ok::<(), typefold::UnfoldError>(())
//! ```
//!
//! # Sessions
//!
//! An [`Unfolder`] is single-threaded and reusable: after a well-formed
//! value it is idle again at the root, and [`Unfolder::reset`] recovers it
//! after an error. Independent sessions may run on any number of threads;
//! only the registry is shared.

mod buffer;
mod context;
mod error;
mod event;
mod key_cache;
mod macros;
mod options;
mod registry;
mod shape;
mod slot;
mod stack;
mod strategy;
mod value;

pub use buffer::{ScratchBuffer, ScratchRef};
pub use context::{IntoTarget, Target, UnfoldCtx, Unfolder};
pub use error::{ErrorCategory, UnfoldError, UnfoldResult};
pub use event::{BaseType, Scalar, Visitor};
pub use key_cache::{KeyCache, KeyCacheStatistics};
pub use options::{
    UnfoldOptions, UnfoldOptionsBuilder, DEFAULT_MAX_DEPTH, DEFAULT_SCRATCH_BUFFER_SIZE,
    DEFAULT_TAG,
};
pub use registry::{registry, TypeRegistry};
pub use shape::{
    ArrayShape, FieldShape, MapKey, MapShape, OptionalShape, PointerShape, ScalarShape, SeqShape,
    Shape, StructShape, TypeHandle, Unfold, WriteFn,
};
pub use slot::{RawSlot, Slot};
pub use stack::{Phase, PendingKey};
pub use strategy::{LeafStrategy, Primitive, ScalarSeq, Strategy};
pub use value::Value;
