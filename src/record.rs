//! `record!` - declare a struct the binder can walk
//!
//! ```rust
//! use paramstore::record;
//!
//! record! {
//!     #[derive(Debug, Default, Clone)]
//!     pub struct Database {
//!         pub user: String [ssm = "user"],
//!         pub password: String [ssm = "password"],
//!         pub replicas: Vec<String> [ssm = "replicas"],
//!         // No annotation: never bound, any type allowed
//!         pub pool: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
//!     }
//! }
//! ```
//!
//! Annotations follow the field type in brackets as `name = "value"` pairs.
//! Several annotation names may coexist on one field; the store picks the
//! one it was configured with. A field is exported when declared `pub`
//! (any `pub(..)` form counts).
//!
//! Annotated field types must implement [`Bindable`](crate::Bindable).
//! Fields without annotations can be of any type; they are described as
//! [`Kind::Opaque`](crate::Kind::Opaque) and never reached by the binder.

/// Declare a bindable record. See the [module docs](crate::record).
#[macro_export]
macro_rules! record {
    // Annotated fields are described and reachable; the rest are opaque
    (@describe $ty:ty) => {
        $crate::TypeInfo::opaque::<$ty>
    };
    (@describe $ty:ty [$($tag:ident = $value:literal),*]) => {
        <$ty as $crate::Bindable>::describe
    };
    (@slot $place:expr) => {
        ::std::option::Option::None
    };
    (@slot $place:expr, [$($tag:ident = $value:literal),*]) => {
        ::std::option::Option::Some($place as &mut dyn $crate::Field)
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty $([ $($tag:ident = $value:literal),* $(,)? ])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Field for $name {
            fn type_info(&self) -> $crate::TypeInfo {
                <Self as $crate::Bindable>::describe()
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn child_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn $crate::Field> {
                #[allow(unused_mut)]
                let mut fields: ::std::vec::Vec<::std::option::Option<&mut dyn $crate::Field>> = ::std::vec![
                    $($crate::record!(@slot &mut self.$field $(, [$($tag = $value),*])?)),*
                ];
                if index < fields.len() {
                    fields.swap_remove(index)
                } else {
                    ::std::option::Option::None
                }
            }
        }

        impl $crate::Bindable for $name {
            fn describe() -> $crate::TypeInfo {
                $crate::TypeInfo::record::<$name>(|| {
                    ::std::vec![
                        $(
                            $crate::FieldInfo {
                                name: ::std::stringify!($field),
                                tags: &[$($((::std::stringify!($tag), $value)),*)?],
                                exported: !::std::stringify!($field_vis).is_empty(),
                                ty: $crate::record!(@describe $ty $([$($tag = $value),*])?),
                            }
                        ),*
                    ]
                })
            }
        }
    };
}
