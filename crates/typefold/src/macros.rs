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

//! Declaration macros.

/// Implement [`Unfold`](crate::Unfold) for a struct with named fields.
///
/// Each listed field may carry `tag: name` metadata. Under a session tag the
/// field decodes from the key declared for that tag (text before the first
/// `,`), from its Rust name when the tag is absent or the name is empty, and
/// not at all when the name is `-`. Fields that are not listed are never
/// decoded. The struct must implement `Default` to appear inside
/// collections or `Option`.
///
/// # Examples
///
/// ```rust
/// use typefold::unfold_struct;
///
/// #[derive(Debug, Default)]
/// struct User {
///     id: u64,
///     display_name: String,
///     password_hash: String,
/// }
///
/// unfold_struct! {
///     User {
///         id => { "json": "ID" },
///         display_name => { "json": "name,omitempty", "cbor": "n" },
///         password_hash => { "json": "-", "cbor": "-" },
///     }
/// }
/// ```
#[macro_export]
macro_rules! unfold_struct {
    (
        $ty:ident {
            $(
                $field:ident $( => { $( $tag:literal : $value:literal ),* $(,)? } )?
            ),* $(,)?
        }
    ) => {
        impl $crate::Unfold for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::Struct($crate::StructShape {
                    type_name: ::core::any::type_name::<$ty>(),
                    fields: ::std::vec![
                        $(
                            $crate::FieldShape {
                                name: ::core::stringify!($field),
                                tags: &[ $( $( ($tag, $value) ),* )? ],
                                offset: ::core::mem::offset_of!($ty, $field),
                                ty: $crate::TypeHandle::of_field(|p: *const $ty| unsafe {
                                    ::core::ptr::addr_of!((*p).$field)
                                }),
                            }
                        ),*
                    ],
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Shape, Unfold};

    #[derive(Default)]
    struct Sample {
        count: u32,
        label: Option<String>,
        hidden: bool,
    }

    crate::unfold_struct! {
        Sample {
            count => { "struct": "n" },
            label,
            hidden => { "struct": "-" },
        }
    }

    #[test]
    fn test_generated_shape() {
        let Shape::Struct(shape) = Sample::shape() else {
            panic!("expected a struct shape");
        };
        assert_eq!(shape.fields.len(), 3);
        assert_eq!(shape.fields[0].key_name("struct"), Some("n"));
        assert_eq!(shape.fields[1].key_name("struct"), Some("label"));
        assert_eq!(shape.fields[2].key_name("struct"), None);
        assert_eq!(shape.fields[1].ty.shape().kind(), "optional");
        assert_eq!(
            shape.fields[0].offset,
            std::mem::offset_of!(Sample, count)
        );
    }

    #[test]
    fn test_generated_field_types() {
        let Shape::Struct(shape) = Sample::shape() else {
            panic!("expected a struct shape");
        };
        assert!(shape.fields[0].ty.direct().is_some());
        assert!(shape.fields[1].ty.direct().is_none());
        assert_eq!(shape.fields[2].ty.name(), "bool");
    }
}
