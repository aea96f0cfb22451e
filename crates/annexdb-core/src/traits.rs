use crate::{types::Ulid, value::Value};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;

///
/// FieldValue
///
/// Conversion of a host value into the engine's `Value` representation.
/// Implemented for the primitives a stored or computed attribute can
/// produce.
///

pub trait FieldValue {
    fn to_value(self) -> Value;
}

impl FieldValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl FieldValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FieldValue for i32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl FieldValue for i64 {
    fn to_value(self) -> Value {
        Value::Int(self)
    }
}

impl FieldValue for u32 {
    fn to_value(self) -> Value {
        Value::Int(i64::from(self))
    }
}

impl FieldValue for usize {
    #[allow(clippy::cast_possible_wrap)]
    fn to_value(self) -> Value {
        Value::Int(self as i64)
    }
}

impl FieldValue for f32 {
    fn to_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl FieldValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(self)
    }
}

impl FieldValue for &str {
    fn to_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl FieldValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl FieldValue for Ulid {
    fn to_value(self) -> Value {
        Value::Ulid(self)
    }
}

impl FieldValue for () {
    fn to_value(self) -> Value {
        Value::Unit
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(self) -> Value {
        self.map_or(Value::Null, FieldValue::to_value)
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(self) -> Value {
        Value::List(self.into_iter().map(FieldValue::to_value).collect())
    }
}

///
/// EntityIdentity
///
/// Identity and attribute-registry metadata for a mapped entity.
///
/// `FIELDS` is the registry of stored attributes; `PROPERTIES` the
/// registry of host-computed attributes. `PRIMARY_KEY` names the field
/// holding `Self::Key` and must appear in `FIELDS`.
///

pub trait EntityIdentity {
    type Key: Copy + Debug + Eq + Ord + FieldValue + Serialize + DeserializeOwned + 'static;

    const ENTITY_NAME: &'static str;
    const PRIMARY_KEY: &'static str;
    const FIELDS: &'static [&'static str];
    const PROPERTIES: &'static [&'static str];
}

///
/// FieldValues
///
/// Capability-based lookup of stored attributes by name.
/// Returns `None` for names outside `FIELDS`; an `Option`-typed field
/// that is unset resolves to `Some(Value::Null)`.
///

pub trait FieldValues {
    fn field_value(&self, field: &str) -> Option<Value>;
}

///
/// PropertyValues
///
/// Capability-based lookup of host-computed attributes by name.
/// Returns `None` for names outside `PROPERTIES`.
///

pub trait PropertyValues {
    fn property_value(&self, name: &str) -> Option<Value>;
}

///
/// EntityValue
///
/// A concrete row of a mapped entity: identity plus attribute lookup
/// plus the serde contract the store requires.
///

pub trait EntityValue:
    EntityIdentity + FieldValues + PropertyValues + Clone + Debug + Serialize + DeserializeOwned + 'static
{
    /// The row's primary identifier; unique and immutable per row.
    fn key(&self) -> Self::Key;
}
