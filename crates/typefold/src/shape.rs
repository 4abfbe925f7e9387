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

//! Declared type shapes.
//!
//! A destination type describes itself through [`Unfold`]: either it hands
//! out its own strategy ([`Unfold::direct`]) or it declares a [`Shape`] from
//! which the registry builds a generic strategy once per type and tag.
//!
//! Shapes carry monomorphized accessor functions (`clear`, `push_default`,
//! `index`, ...) that operate on untyped [`RawSlot`] locations. Every such
//! function is `unsafe`: callers must pass a location holding the type the
//! shape was declared for.
//!
//! # Struct Shapes
//!
//! Structs are declared with [`unfold_struct!`](crate::unfold_struct), which
//! records field offsets and per-tag field names:
//!
//! ```rust
//! use typefold::{unfold_struct, Shape, Unfold};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! unfold_struct! {
//!     Point {
//!         x => { "json": "X" },
//!         y,
//!     }
//! }
//!
//! let Shape::Struct(shape) = Point::shape() else { unreachable!() };
//! assert_eq!(shape.fields[0].tag("json"), Some("X"));
//! assert_eq!(shape.fields[1].tag("json"), None);
//! ```

use crate::error::{UnfoldError, UnfoldResult};
use crate::event::{BaseType, Scalar};
use crate::slot::RawSlot;
use crate::strategy::Strategy;
use std::any::{type_name, TypeId};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;

/// A type that can be decoded from events.
pub trait Unfold: Sized + 'static {
    /// Declared shape used by the generic path.
    fn shape() -> Shape;

    /// Strategy bound directly, bypassing the registry.
    fn direct() -> Option<&'static dyn Strategy> {
        None
    }

    /// Direct strategy for `Vec<Self>`, if the element type has one.
    #[doc(hidden)]
    fn vec_direct() -> Option<&'static dyn Strategy> {
        None
    }
}

/// Type-erased reference to an [`Unfold`] type.
#[derive(Clone, Copy)]
pub struct TypeHandle {
    id: TypeId,
    name: &'static str,
    shape: fn() -> Shape,
    direct: fn() -> Option<&'static dyn Strategy>,
}

impl TypeHandle {
    /// Handle for `T`.
    pub fn of<T: Unfold>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            shape: T::shape,
            direct: T::direct,
        }
    }

    /// Handle for the type of a struct field, inferred from a field projection.
    ///
    /// The projection is never called.
    pub fn of_field<S, T: Unfold>(_project: fn(*const S) -> *const T) -> Self {
        Self::of::<T>()
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared shape.
    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    /// The direct strategy, if any.
    #[inline]
    pub fn direct(&self) -> Option<&'static dyn Strategy> {
        (self.direct)()
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeHandle").field(&self.name).finish()
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeHandle {}

/// Structure of a destination type.
#[derive(Debug)]
pub enum Shape {
    /// A leaf written by a single primitive event.
    Scalar(ScalarShape),
    /// Named fields at fixed offsets.
    Struct(StructShape),
    /// A growable sequence.
    Seq(SeqShape),
    /// A fixed-size array.
    Array(ArrayShape),
    /// String-keyed map.
    Map(MapShape),
    /// An optional value.
    Optional(OptionalShape),
    /// An owning pointer.
    Pointer(PointerShape),
    /// No shape; only decodable through a direct strategy.
    Opaque,
}

impl Shape {
    /// Shape kind for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Struct(_) => "struct",
            Self::Seq(_) => "sequence",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Optional(_) => "optional",
            Self::Pointer(_) => "pointer",
            Self::Opaque => "opaque",
        }
    }
}

/// Writes one primitive event into a location.
pub type WriteFn = for<'s> unsafe fn(RawSlot, Scalar<'s>) -> UnfoldResult<()>;

#[derive(Clone, Copy)]
pub struct ScalarShape {
    /// Element hint matching this scalar.
    pub base_type: BaseType,
    pub write: WriteFn,
}

impl fmt::Debug for ScalarShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarShape")
            .field("base_type", &self.base_type)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct StructShape {
    pub type_name: &'static str,
    pub fields: Vec<FieldShape>,
}

/// One declared struct field.
#[derive(Debug, Clone, Copy)]
pub struct FieldShape {
    /// Rust field name.
    pub name: &'static str,
    /// `(tag, value)` metadata pairs, e.g. `("json", "id,omitempty")`.
    pub tags: &'static [(&'static str, &'static str)],
    /// Byte offset within the struct.
    pub offset: usize,
    pub ty: TypeHandle,
}

impl FieldShape {
    /// Value declared for `tag`.
    pub fn tag(&self, tag: &str) -> Option<&'static str> {
        self.tags.iter().find(|(t, _)| *t == tag).map(|(_, v)| *v)
    }

    /// Name used for object keys under `tag`.
    ///
    /// Returns `None` when the field is excluded (`"-"`). The tag value is
    /// cut at the first `,`; an empty name falls back to the field name.
    pub fn key_name(&self, tag: &str) -> Option<&'static str> {
        let Some(value) = self.tag(tag) else {
            return Some(self.name);
        };
        let name = value.split(',').next().unwrap_or_default();
        match name {
            "-" => None,
            "" => Some(self.name),
            name => Some(name),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SeqShape {
    pub elem: TypeHandle,
    pub clear: unsafe fn(RawSlot),
    pub reserve: unsafe fn(RawSlot, usize),
    /// Appends a default element and returns its location.
    pub push_default: unsafe fn(RawSlot) -> RawSlot,
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayShape {
    pub elem: TypeHandle,
    pub len: usize,
    /// Location of element `i`; `i` must be below `len`.
    pub index: unsafe fn(RawSlot, usize) -> RawSlot,
}

#[derive(Debug, Clone, Copy)]
pub struct MapShape {
    pub value: TypeHandle,
    pub clear: unsafe fn(RawSlot),
    /// Inserts a default value under the key and returns its location.
    pub insert_default: unsafe fn(RawSlot, String) -> UnfoldResult<RawSlot>,
}

#[derive(Debug, Clone, Copy)]
pub struct OptionalShape {
    pub inner: TypeHandle,
    pub set_none: unsafe fn(RawSlot),
    pub get_or_insert_default: unsafe fn(RawSlot) -> RawSlot,
}

#[derive(Debug, Clone, Copy)]
pub struct PointerShape {
    pub pointee: TypeHandle,
    pub deref: unsafe fn(RawSlot) -> RawSlot,
}

/// Map key types decodable from object keys.
pub trait MapKey: Sized + 'static {
    fn from_key(key: String) -> UnfoldResult<Self>;
}

impl MapKey for String {
    #[inline]
    fn from_key(key: String) -> UnfoldResult<Self> {
        Ok(key)
    }
}

macro_rules! impl_map_key_parse {
    ($($t:ty),* $(,)?) => {
        $(
            impl MapKey for $t {
                fn from_key(key: String) -> UnfoldResult<Self> {
                    key.parse::<$t>().map_err(|e| {
                        UnfoldError::conversion("string key", stringify!($t), e.to_string())
                    })
                }
            }
        )*
    };
}

impl_map_key_parse!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool, char);

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

unsafe fn vec_clear<T>(at: RawSlot) {
    at.as_mut::<Vec<T>>().clear();
}

unsafe fn vec_reserve<T>(at: RawSlot, additional: usize) {
    at.as_mut::<Vec<T>>().reserve(additional);
}

unsafe fn vec_push_default<T: Default>(at: RawSlot) -> RawSlot {
    let vec = at.as_mut::<Vec<T>>();
    let idx = vec.len();
    vec.push(T::default());
    RawSlot::from_mut(&mut vec[idx])
}

impl<T: Unfold + Default> Unfold for Vec<T> {
    fn shape() -> Shape {
        Shape::Seq(SeqShape {
            elem: TypeHandle::of::<T>(),
            clear: vec_clear::<T>,
            reserve: vec_reserve::<T>,
            push_default: vec_push_default::<T>,
        })
    }

    fn direct() -> Option<&'static dyn Strategy> {
        T::vec_direct()
    }
}

unsafe fn deque_clear<T>(at: RawSlot) {
    at.as_mut::<VecDeque<T>>().clear();
}

unsafe fn deque_reserve<T>(at: RawSlot, additional: usize) {
    at.as_mut::<VecDeque<T>>().reserve(additional);
}

unsafe fn deque_push_default<T: Default>(at: RawSlot) -> RawSlot {
    let deque = at.as_mut::<VecDeque<T>>();
    deque.push_back(T::default());
    let idx = deque.len() - 1;
    RawSlot::from_mut(&mut deque[idx])
}

impl<T: Unfold + Default> Unfold for VecDeque<T> {
    fn shape() -> Shape {
        Shape::Seq(SeqShape {
            elem: TypeHandle::of::<T>(),
            clear: deque_clear::<T>,
            reserve: deque_reserve::<T>,
            push_default: deque_push_default::<T>,
        })
    }
}

unsafe fn array_index<T, const N: usize>(at: RawSlot, i: usize) -> RawSlot {
    RawSlot::from_mut(&mut at.as_mut::<[T; N]>()[i])
}

impl<T: Unfold, const N: usize> Unfold for [T; N] {
    fn shape() -> Shape {
        Shape::Array(ArrayShape {
            elem: TypeHandle::of::<T>(),
            len: N,
            index: array_index::<T, N>,
        })
    }
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

unsafe fn hash_map_clear<K, V>(at: RawSlot) {
    at.as_mut::<HashMap<K, V>>().clear();
}

unsafe fn hash_map_insert_default<K, V>(at: RawSlot, key: String) -> UnfoldResult<RawSlot>
where
    K: MapKey + Eq + Hash,
    V: Default,
{
    let key = K::from_key(key)?;
    let map = at.as_mut::<HashMap<K, V>>();
    let value = map.entry(key).or_default();
    *value = V::default();
    Ok(RawSlot::from_mut(value))
}

impl<K, V> Unfold for HashMap<K, V>
where
    K: MapKey + Eq + Hash,
    V: Unfold + Default,
{
    fn shape() -> Shape {
        Shape::Map(MapShape {
            value: TypeHandle::of::<V>(),
            clear: hash_map_clear::<K, V>,
            insert_default: hash_map_insert_default::<K, V>,
        })
    }
}

unsafe fn btree_map_clear<K, V>(at: RawSlot) {
    at.as_mut::<BTreeMap<K, V>>().clear();
}

unsafe fn btree_map_insert_default<K, V>(at: RawSlot, key: String) -> UnfoldResult<RawSlot>
where
    K: MapKey + Ord,
    V: Default,
{
    let key = K::from_key(key)?;
    let map = at.as_mut::<BTreeMap<K, V>>();
    let value = map.entry(key).or_default();
    *value = V::default();
    Ok(RawSlot::from_mut(value))
}

impl<K, V> Unfold for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Unfold + Default,
{
    fn shape() -> Shape {
        Shape::Map(MapShape {
            value: TypeHandle::of::<V>(),
            clear: btree_map_clear::<K, V>,
            insert_default: btree_map_insert_default::<K, V>,
        })
    }
}

// ---------------------------------------------------------------------------
// Option and Box
// ---------------------------------------------------------------------------

unsafe fn option_set_none<T>(at: RawSlot) {
    *at.as_mut::<Option<T>>() = None;
}

unsafe fn option_get_or_insert_default<T: Default>(at: RawSlot) -> RawSlot {
    RawSlot::from_mut(at.as_mut::<Option<T>>().get_or_insert_with(T::default))
}

impl<T: Unfold + Default> Unfold for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(OptionalShape {
            inner: TypeHandle::of::<T>(),
            set_none: option_set_none::<T>,
            get_or_insert_default: option_get_or_insert_default::<T>,
        })
    }
}

unsafe fn box_deref<T>(at: RawSlot) -> RawSlot {
    RawSlot::from_mut(&mut **at.as_mut::<Box<T>>())
}

impl<T: Unfold> Unfold for Box<T> {
    fn shape() -> Shape {
        Shape::Pointer(PointerShape {
            pointee: TypeHandle::of::<T>(),
            deref: box_deref::<T>,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(tags: &'static [(&'static str, &'static str)]) -> FieldShape {
        FieldShape {
            name: "user_id",
            tags,
            offset: 0,
            ty: TypeHandle::of::<Vec<Option<i64>>>(),
        }
    }

    #[test]
    fn test_key_name_defaults_to_field_name() {
        assert_eq!(field(&[]).key_name("struct"), Some("user_id"));
    }

    #[test]
    fn test_key_name_from_tag() {
        let f = field(&[("json", "id,omitempty"), ("struct", "uid")]);
        assert_eq!(f.key_name("json"), Some("id"));
        assert_eq!(f.key_name("struct"), Some("uid"));
        assert_eq!(f.key_name("cbor"), Some("user_id"));
    }

    #[test]
    fn test_key_name_skip_and_empty() {
        assert_eq!(field(&[("json", "-")]).key_name("json"), None);
        assert_eq!(field(&[("json", ",omitempty")]).key_name("json"), Some("user_id"));
    }

    #[test]
    fn test_type_handle_identity() {
        let a = TypeHandle::of::<Vec<Option<i64>>>();
        assert_eq!(a, field(&[]).ty);
        assert!(a.name().contains("Option"));
        assert_eq!(a.shape().kind(), "sequence");
    }

    #[test]
    fn test_map_key_parse() {
        assert_eq!(u16::from_key("42".into()).unwrap(), 42);
        assert!(u8::from_key("300".into()).is_err());
        assert_eq!(String::from_key("k".into()).unwrap(), "k");
    }

    #[test]
    fn test_option_accessors() {
        let mut value: Option<Vec<u8>> = None;
        let raw = RawSlot::from_mut(&mut value);
        unsafe {
            option_get_or_insert_default::<Vec<u8>>(raw)
                .as_mut::<Vec<u8>>()
                .push(9);
        }
        assert_eq!(value, Some(vec![9]));
        unsafe { option_set_none::<Vec<u8>>(RawSlot::from_mut(&mut value)) };
        assert_eq!(value, None);
    }

    #[test]
    fn test_map_insert_replaces_existing() {
        let mut map: HashMap<String, Vec<u8>> = HashMap::new();
        map.insert("k".into(), vec![1, 2]);
        let raw = RawSlot::from_mut(&mut map);
        unsafe {
            hash_map_insert_default::<String, Vec<u8>>(raw, "k".into()).unwrap();
        }
        assert_eq!(map["k"], Vec::<u8>::new());
    }
}
