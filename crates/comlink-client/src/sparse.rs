//! Projection of request values onto their sparse wire form.
//!
//! Callers build requests from plain structs whose unset fields hold their
//! natural zero value. Before serialization every struct is projected onto a
//! generated "wire" twin in which each field is an `Option`: a leaf is present
//! iff it differs from its zero value, and a nested group is present iff at
//! least one of its children is.
//!
//! There is no separate "is set" bit, so a field explicitly set to zero is
//! indistinguishable from one never touched. The gateway depends on zero
//! fields being absent from the body, so this loss is part of the wire format.

use serde::Serialize;
use std::fmt::Debug;

/// A value with a zero-omitting wire projection.
pub trait Sparse {
    /// Serialized shape of a present value.
    type Wire: Serialize + Clone + PartialEq + Debug;

    /// `None` when the value is zero, or when every child of a group is.
    fn to_wire(&self) -> Option<Self::Wire>;
}

macro_rules! sparse_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sparse for $ty {
                type Wire = $ty;

                fn to_wire(&self) -> Option<$ty> {
                    if *self == <$ty>::default() {
                        None
                    } else {
                        Some(self.clone())
                    }
                }
            }
        )*
    };
}

sparse_leaf!(String, bool, i32, i64, u32, u64);

impl<T> Sparse for Vec<T>
where
    T: Serialize + Clone + PartialEq + Debug,
{
    type Wire = Vec<T>;

    fn to_wire(&self) -> Option<Vec<T>> {
        if self.is_empty() {
            None
        } else {
            Some(self.clone())
        }
    }
}

/// Encode a top-level value. An all-zero value encodes to the empty wire
/// struct, which serializes as `{}`.
pub fn encode<T>(full: &T) -> T::Wire
where
    T: Sparse,
    T::Wire: Default,
{
    full.to_wire().unwrap_or_default()
}

/// Encode `full` and serialize the wire form to JSON bytes.
pub fn encode_json<T>(full: &T) -> Result<Vec<u8>, serde_json::Error>
where
    T: Sparse,
    T::Wire: Default,
{
    serde_json::to_vec(&encode(full))
}

/// Declares a request struct together with its wire twin and the [`Sparse`]
/// impl that connects them.
///
/// Each field is written `name: Type => "wireKey"`. The full form derives
/// `Default` and a lenient `Deserialize` (missing keys become zero); the wire
/// form carries one `Option` per field and skips `None` on serialization.
macro_rules! sparse_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident => $wire:ident {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $ty:ty => $key:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$fmeta])*
                #[serde(rename = $key)]
                pub $field: $ty,
            )*
        }

        #[doc = concat!("Wire form of [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
        $vis struct $wire {
            $(
                #[serde(rename = $key, skip_serializing_if = "Option::is_none")]
                pub $field: Option<<$ty as $crate::sparse::Sparse>::Wire>,
            )*
        }

        impl $wire {
            /// True when no field is present.
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }
        }

        impl $crate::sparse::Sparse for $name {
            type Wire = $wire;

            fn to_wire(&self) -> Option<$wire> {
                let wire = $wire {
                    $($field: $crate::sparse::Sparse::to_wire(&self.$field),)*
                };
                if wire.is_empty() {
                    None
                } else {
                    Some(wire)
                }
            }
        }
    };
}

pub(crate) use sparse_struct;
