//! Driver-neutral values used for bound arguments and row cells.
//!
//! Every argument that ends up next to a `?` placeholder is a [`Value`], and every cell a
//! driver hands back is one too. Drivers translate to and from their native types at the
//! edge; the builder never needs to know them.

use crate::error::{DbError, DbResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

/// A dynamically typed SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    /// A JSON document. A JSON object is the mapping type of this model and is never
    /// accepted as a filter value.
    Json(serde_json::Value),
    /// An ordered sequence, used by `in`, `between` and `apply` conditions.
    List(Vec<Value>),
}

impl Value {
    /// Raw bytes (`Vec<u8>` converts into a [`Value::List`] of integers otherwise).
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    /// Build a list value from anything convertible.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value is a key/value mapping.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Json(serde_json::Value::Object(_)))
    }

    /// Borrow the elements of a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Uuid(_) => "uuid",
            Value::Json(serde_json::Value::Object(_)) => "map",
            Value::Json(_) => "json",
            Value::List(_) => "list",
        }
    }

    /// Convert a JSON document into a value, unwrapping scalars.
    ///
    /// Arrays and objects stay JSON documents.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Json(other),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

macro_rules! impl_from_uint {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::UInt(u64::from(v))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64);
impl_from_uint!(u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v.naive_utc())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::list(v)
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::list(v.iter().cloned())
    }
}

/// Conversion from a [`Value`] cell into a Rust type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> DbResult<Self>;
}

fn mismatch<T>(expected: &str, got: &Value) -> DbResult<T> {
    Err(DbError::Other(format!(
        "cannot convert {} value into {expected}",
        got.kind()
    )))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> DbResult<Self> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::UInt(u) => i64::try_from(*u)
                .map_err(|_| DbError::Other(format!("{u} does not fit into i64"))),
            Value::Text(s) => s
                .parse()
                .map_err(|_| DbError::Other(format!("'{s}' is not an integer"))),
            other => mismatch("i64", other),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> DbResult<Self> {
        let v = i64::from_value(value)?;
        i32::try_from(v).map_err(|_| DbError::Other(format!("{v} does not fit into i32")))
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::UInt(u) => Ok(*u),
            Value::Int(i) => {
                u64::try_from(*i).map_err(|_| DbError::Other(format!("{i} is negative")))
            }
            other => mismatch("u64", other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            Value::UInt(u) => Ok(*u as f64),
            other => mismatch("f64", other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::UInt(u) => Ok(*u != 0),
            other => mismatch("bool", other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            Value::Bytes(b) => String::from_utf8(b.clone())
                .map_err(|e| DbError::Other(format!("invalid utf-8: {e}"))),
            other => mismatch("String", other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            Value::Text(s) => Ok(s.clone().into_bytes()),
            other => mismatch("Vec<u8>", other),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::DateTime(dt) => Ok(dt.date()),
            other => mismatch("NaiveDate", other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            other => mismatch("NaiveDateTime", other),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => {
                Uuid::parse_str(s).map_err(|e| DbError::Other(format!("invalid uuid: {e}")))
            }
            other => mismatch("Uuid", other),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::Json(j) => Ok(j.clone()),
            Value::Text(s) => Ok(serde_json::from_str(s)?),
            other => mismatch("JSON", other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> DbResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
