//! Field handles - the runtime capability the binder writes through
//!
//! Every bindable type implements two traits:
//!
//! - [`Bindable`] - static description of the type ([`TypeInfo`]), used by
//!   schema resolution before any value exists
//! - [`Field`] - object-safe handle over one value: inspect its type, assign
//!   strings/numbers/sequences, allocate optional wrappers, reach into
//!   record fields by declaration index
//!
//! Records get both impls from the [`record!`](crate::record!) macro. Leaf
//! types (strings, numbers, durations, timestamps), `Vec<T>` and
//! `Option<T>` are covered here.
//!
//! ## Domain types
//!
//! A type of your own becomes a leaf by describing itself as
//! [`Kind::Custom`] and pairing with a converter that downcasts to it:
//!
//! ```rust
//! use std::any::Any;
//! use paramstore::{BindError, Bindable, Field, Kind, Parameter, TypeInfo};
//!
//! #[derive(Debug, Default, PartialEq)]
//! pub struct Port(u16);
//!
//! impl Field for Port {
//!     fn type_info(&self) -> TypeInfo {
//!         Self::describe()
//!     }
//!
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//! }
//!
//! impl Bindable for Port {
//!     fn describe() -> TypeInfo {
//!         TypeInfo::leaf::<Port>(Kind::Custom)
//!     }
//! }
//!
//! // Registered with ParamStoreBuilder::with_converter_fn(parse_port)
//! fn parse_port(param: &Parameter, field: &mut dyn Field) -> paramstore::Result<bool> {
//!     let Some(port) = field.as_any_mut().downcast_mut::<Port>() else {
//!         return Ok(false);
//!     };
//!     port.0 = param
//!         .value
//!         .parse()
//!         .map_err(|e| BindError::parse(&param.value, "Port", e))?;
//!     Ok(true)
//! }
//! # let mut port = Port::default();
//! # let param = Parameter::string("/port", "8080");
//! # assert!(paramstore::Converter::convert(&parse_port, &param, &mut port).unwrap());
//! # assert_eq!(port, Port(8080));
//! ```
//!
//! Without a matching converter a custom field fails as unsupported.

use std::any::{Any, TypeId};
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{BindError, Result};

/// Coarse classification of a bindable type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Int,
    Uint,
    Float,
    Bool,
    Duration,
    /// Timestamps are always leaves, never walked as records
    Time,
    Seq,
    Optional,
    Record,
    /// User-defined leaf; only a converter can assign it
    Custom,
    /// Unannotated record fields; never bound
    Opaque,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::Duration => "duration",
            Kind::Time => "time",
            Kind::Seq => "slice",
            Kind::Optional => "optional",
            Kind::Record => "record",
            Kind::Custom => "custom",
            Kind::Opaque => "opaque",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of a bindable type
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub kind: Kind,
    pub type_id: TypeId,
    /// Pointee of `Optional`, element of `Seq`
    elem: Option<fn() -> TypeInfo>,
    /// Declared fields of `Record`
    fields: Option<fn() -> Vec<FieldInfo>>,
}

impl TypeInfo {
    pub fn leaf<T: 'static>(kind: Kind) -> Self {
        Self {
            name: std::any::type_name::<T>(),
            kind,
            type_id: TypeId::of::<T>(),
            elem: None,
            fields: None,
        }
    }

    pub fn optional<T: Bindable>() -> Self {
        Self {
            name: std::any::type_name::<Option<T>>(),
            kind: Kind::Optional,
            type_id: TypeId::of::<Option<T>>(),
            elem: Some(T::describe),
            fields: None,
        }
    }

    pub fn seq<T: Bindable>() -> Self {
        Self {
            name: std::any::type_name::<Vec<T>>(),
            kind: Kind::Seq,
            type_id: TypeId::of::<Vec<T>>(),
            elem: Some(T::describe),
            fields: None,
        }
    }

    pub fn record<T: 'static>(fields: fn() -> Vec<FieldInfo>) -> Self {
        Self {
            name: std::any::type_name::<T>(),
            kind: Kind::Record,
            type_id: TypeId::of::<T>(),
            elem: None,
            fields: Some(fields),
        }
    }

    /// Any type; only used to keep record field indices aligned
    pub fn opaque<T: 'static>() -> Self {
        Self::leaf::<T>(Kind::Opaque)
    }

    /// Element type of a sequence or pointee of an optional
    pub fn elem(&self) -> Option<TypeInfo> {
        self.elem.map(|describe| describe())
    }

    /// Declared fields, empty for anything but records
    pub fn fields(&self) -> Vec<FieldInfo> {
        self.fields.map(|fields| fields()).unwrap_or_default()
    }

    /// Look through one optional wrapper
    pub fn deref(self) -> TypeInfo {
        match (self.kind, self.elem()) {
            (Kind::Optional, Some(inner)) => inner,
            _ => self,
        }
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One declared field of a record
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: &'static str,
    /// Annotations as `(annotation name, value)` pairs
    pub tags: &'static [(&'static str, &'static str)],
    /// Declared `pub`
    pub exported: bool,
    pub ty: fn() -> TypeInfo,
}

impl FieldInfo {
    /// Value of the given annotation, if the field carries it
    pub fn tag(&self, name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn type_info(&self) -> TypeInfo {
        (self.ty)()
    }
}

/// Fills element `index` of a sequence under construction
pub type ElementFill<'f> = dyn FnMut(usize, &mut dyn Field) -> Result<()> + 'f;

/// Handle over one bindable value
///
/// Assignment methods default to [`BindError::Unsupported`]; each type
/// overrides the ones it accepts.
pub trait Field: Any + Send {
    fn type_info(&self) -> TypeInfo;

    /// Exact-type access for converters
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn set_str(&mut self, _value: &str) -> Result<()> {
        Err(unsupported(self.type_info()))
    }

    fn set_int(&mut self, _value: i64) -> Result<()> {
        Err(unsupported(self.type_info()))
    }

    fn set_uint(&mut self, _value: u64) -> Result<()> {
        Err(unsupported(self.type_info()))
    }

    fn set_float(&mut self, _value: f64) -> Result<()> {
        Err(unsupported(self.type_info()))
    }

    /// Build a sequence of `len` default elements, let `fill` convert each
    /// one in place, then replace the current value. Nothing is assigned if
    /// any element fails.
    fn set_seq(&mut self, _len: usize, _fill: &mut ElementFill<'_>) -> Result<()> {
        Err(unsupported(self.type_info()))
    }

    /// Optional wrappers: instantiate a default pointee when unset and
    /// return it. `None` for every other kind.
    fn allocate(&mut self) -> Option<&mut dyn Field> {
        None
    }

    fn is_nil(&self) -> bool {
        false
    }

    /// Records: the field declared at `index`
    fn child_mut(&mut self, _index: usize) -> Option<&mut dyn Field> {
        None
    }
}

/// Types that can be described without a value
pub trait Bindable: Field + Default + Sized {
    fn describe() -> TypeInfo;
}

fn unsupported(info: TypeInfo) -> BindError {
    BindError::Unsupported {
        kind: info.kind,
        type_name: info.name,
    }
}

impl Field for String {
    fn type_info(&self) -> TypeInfo {
        Self::describe()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn set_str(&mut self, value: &str) -> Result<()> {
        value.clone_into(self);
        Ok(())
    }
}

impl Bindable for String {
    fn describe() -> TypeInfo {
        TypeInfo::leaf::<String>(Kind::String)
    }
}

macro_rules! int_field {
    ($($t:ty),* $(,)?) => {$(
        impl Field for $t {
            fn type_info(&self) -> TypeInfo {
                Self::describe()
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }

            fn set_int(&mut self, value: i64) -> Result<()> {
                *self = <$t>::try_from(value).map_err(|_| BindError::OutOfRange {
                    value: value.to_string(),
                    target: stringify!($t),
                })?;
                Ok(())
            }
        }

        impl Bindable for $t {
            fn describe() -> TypeInfo {
                TypeInfo::leaf::<$t>(Kind::Int)
            }
        }
    )*};
}

macro_rules! uint_field {
    ($($t:ty),* $(,)?) => {$(
        impl Field for $t {
            fn type_info(&self) -> TypeInfo {
                Self::describe()
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }

            fn set_uint(&mut self, value: u64) -> Result<()> {
                *self = <$t>::try_from(value).map_err(|_| BindError::OutOfRange {
                    value: value.to_string(),
                    target: stringify!($t),
                })?;
                Ok(())
            }
        }

        impl Bindable for $t {
            fn describe() -> TypeInfo {
                TypeInfo::leaf::<$t>(Kind::Uint)
            }
        }
    )*};
}

int_field!(i8, i16, i32, i64, isize);
uint_field!(u8, u16, u32, u64, usize);

impl Field for f64 {
    fn type_info(&self) -> TypeInfo {
        Self::describe()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn set_float(&mut self, value: f64) -> Result<()> {
        *self = value;
        Ok(())
    }
}

impl Bindable for f64 {
    fn describe() -> TypeInfo {
        TypeInfo::leaf::<f64>(Kind::Float)
    }
}

impl Field for f32 {
    fn type_info(&self) -> TypeInfo {
        Self::describe()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn set_float(&mut self, value: f64) -> Result<()> {
        *self = value as f32;
        Ok(())
    }
}

impl Bindable for f32 {
    fn describe() -> TypeInfo {
        TypeInfo::leaf::<f32>(Kind::Float)
    }
}

// No built-in rule or bundled converter assigns booleans; a custom
// converter can through `as_any_mut`.
impl Field for bool {
    fn type_info(&self) -> TypeInfo {
        Self::describe()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Bindable for bool {
    fn describe() -> TypeInfo {
        TypeInfo::leaf::<bool>(Kind::Bool)
    }
}

impl Field for Duration {
    fn type_info(&self) -> TypeInfo {
        Self::describe()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Bindable for Duration {
    fn describe() -> TypeInfo {
        TypeInfo::leaf::<Duration>(Kind::Duration)
    }
}

impl Field for DateTime<Utc> {
    fn type_info(&self) -> TypeInfo {
        Self::describe()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Bindable for DateTime<Utc> {
    fn describe() -> TypeInfo {
        TypeInfo::leaf::<DateTime<Utc>>(Kind::Time)
    }
}

impl<T: Bindable> Field for Vec<T> {
    fn type_info(&self) -> TypeInfo {
        Self::describe()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn set_seq(&mut self, len: usize, fill: &mut ElementFill<'_>) -> Result<()> {
        let mut items: Vec<T> = (0..len).map(|_| T::default()).collect();
        for (index, item) in items.iter_mut().enumerate() {
            fill(index, item)?;
        }
        *self = items;
        Ok(())
    }
}

impl<T: Bindable> Bindable for Vec<T> {
    fn describe() -> TypeInfo {
        TypeInfo::seq::<T>()
    }
}

impl<T: Bindable> Field for Option<T> {
    fn type_info(&self) -> TypeInfo {
        Self::describe()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn allocate(&mut self) -> Option<&mut dyn Field> {
        let inner: &mut dyn Field = self.get_or_insert_with(T::default);
        Some(inner)
    }

    fn is_nil(&self) -> bool {
        self.is_none()
    }
}

impl<T: Bindable> Bindable for Option<T> {
    fn describe() -> TypeInfo {
        TypeInfo::optional::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_kinds() {
        assert_eq!(String::describe().kind, Kind::String);
        assert_eq!(i16::describe().kind, Kind::Int);
        assert_eq!(usize::describe().kind, Kind::Uint);
        assert_eq!(f32::describe().kind, Kind::Float);
        assert_eq!(Duration::describe().kind, Kind::Duration);
        assert_eq!(<DateTime<Utc>>::describe().kind, Kind::Time);
        assert!(Duration::describe().is::<Duration>());
    }

    #[test]
    fn optional_derefs_to_pointee() {
        let info = <Option<Vec<String>>>::describe();
        assert_eq!(info.kind, Kind::Optional);
        let inner = info.deref();
        assert_eq!(inner.kind, Kind::Seq);
        assert_eq!(inner.elem().map(|e| e.kind), Some(Kind::String));
        // Non-optional types deref to themselves
        assert_eq!(String::describe().deref().kind, Kind::String);
    }

    #[test]
    fn int_narrowing_reports_out_of_range() {
        let mut small = 0i8;
        small.set_int(100).unwrap();
        assert_eq!(small, 100);

        let err = small.set_int(300).unwrap_err();
        assert!(matches!(err, BindError::OutOfRange { target: "i8", .. }));
        assert_eq!(small, 100);
    }

    #[test]
    fn float_narrowing() {
        let mut value = 0f32;
        value.set_float(6.7).unwrap();
        assert_eq!(value, 6.7f32);
    }

    #[test]
    fn string_rejects_numbers() {
        let mut value = String::new();
        let err = value.set_int(1).unwrap_err();
        assert!(matches!(err, BindError::Unsupported { kind: Kind::String, .. }));
    }

    #[test]
    fn allocate_instantiates_once() {
        let mut value: Option<String> = None;
        assert!(value.is_nil());
        value.allocate().unwrap().set_str("bar").unwrap();
        assert_eq!(value.as_deref(), Some("bar"));

        // Existing pointee is reused, not replaced
        value.allocate().unwrap();
        assert_eq!(value.as_deref(), Some("bar"));
    }

    #[test]
    fn seq_fills_elements_in_order() {
        let mut values: Vec<String> = vec!["old".to_string()];
        values
            .set_seq(3, &mut |index, elem| elem.set_str(&format!("v{index}")))
            .unwrap();
        assert_eq!(values, vec!["v0", "v1", "v2"]);
    }

    #[test]
    fn seq_failure_leaves_value_untouched() {
        let mut values: Vec<i32> = vec![7];
        let err = values
            .set_seq(2, &mut |index, elem| {
                if index == 1 {
                    elem.set_int(i64::MAX)
                } else {
                    elem.set_int(1)
                }
            })
            .unwrap_err();
        assert!(matches!(err, BindError::OutOfRange { .. }));
        assert_eq!(values, vec![7]);
    }

    #[test]
    fn leaves_have_no_children() {
        let mut value = String::new();
        assert!(value.child_mut(0).is_none());
        assert!(value.allocate().is_none());
    }
}
