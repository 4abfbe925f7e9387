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

//! Shared test fixtures and event scripts for typefold.
//!
//! Tests stand in for a wire-format parser by replaying recorded
//! [`Event`] scripts against an [`Unfolder`](typefold::Unfolder).
//!
//! # Features
//!
//! - **Events**: owned copies of every visitor call, plus replay helpers
//! - **Builder**: fluent construction of custom scripts
//! - **Fixtures**: destination types with matching scripts and expected values
//!
//! # Quick Start
//!
//! ```rust
//! use typefold_test::{decode, fixtures};
//!
//! let record: fixtures::Record = decode(&fixtures::record_script())?;
//! assert_eq!(record, fixtures::record());
//! # Ok::<(), typefold::UnfoldError>(())
//! ```

pub mod builder;
pub mod events;
pub mod fixtures;

pub use builder::ScriptBuilder;
pub use events::{decode, decode_into, decode_with, replay, replay_until_error, Event};
pub use fixtures::ScriptList;
