//! Conversions into column assignments for INSERT and UPDATE.
//!
//! ```ignore
//! // explicit pairs
//! dao.insert(&ctx, [("name", Value::from("li")), ("age", Value::from(18))]).await?;
//!
//! // any serde struct; keys come out in sorted order
//! #[derive(Serialize)]
//! struct NewStudent { name: String, age: i32 }
//! dao.insert(&ctx, Serialized(&student)).await?;
//! ```

use crate::condition::Assignment;
use crate::error::{DbError, DbResult};
use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// Something that can be written as a list of `column = value` assignments.
pub trait IntoAssignments {
    fn into_assignments(self) -> DbResult<Vec<Assignment>>;
}

impl IntoAssignments for Vec<Assignment> {
    fn into_assignments(self) -> DbResult<Vec<Assignment>> {
        Ok(self)
    }
}

impl<K, V> IntoAssignments for Vec<(K, V)>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_assignments(self) -> DbResult<Vec<Assignment>> {
        Ok(self
            .into_iter()
            .map(|(k, v)| Assignment::value(k, v))
            .collect())
    }
}

impl<K, V, const N: usize> IntoAssignments for [(K, V); N]
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_assignments(self) -> DbResult<Vec<Assignment>> {
        Ok(self
            .into_iter()
            .map(|(k, v)| Assignment::value(k, v))
            .collect())
    }
}

impl IntoAssignments for BTreeMap<String, Value> {
    fn into_assignments(self) -> DbResult<Vec<Assignment>> {
        Ok(self
            .into_iter()
            .map(|(k, v)| Assignment::value(k, v))
            .collect())
    }
}

/// Assignments taken from the fields of a [`Serialize`] value.
///
/// The value must serialize to a JSON object. Scalars become plain values; nested arrays
/// and objects are stored as JSON documents. `None` fields are written as NULL.
#[derive(Debug, Clone, Copy)]
pub struct Serialized<T>(pub T);

impl<T: Serialize> IntoAssignments for Serialized<T> {
    fn into_assignments(self) -> DbResult<Vec<Assignment>> {
        match serde_json::to_value(&self.0)? {
            serde_json::Value::Object(fields) => Ok(fields
                .into_iter()
                .map(|(k, v)| Assignment::value(k, Value::from_json(v)))
                .collect()),
            other => Err(DbError::Serialization(format!(
                "expected a struct or map, got {}",
                Value::from_json(other).kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Student {
        name: String,
        age: i32,
        tags: Vec<String>,
    }

    #[test]
    fn pairs_keep_order() {
        let data = [("name", Value::from("a")), ("age", Value::from(30))]
            .into_assignments()
            .unwrap();
        let fields: Vec<_> = data.iter().map(|a| a.field.as_str()).collect();
        assert_eq!(fields, ["name", "age"]);
    }

    #[test]
    fn serialized_struct_sorted_by_key() {
        let s = Student {
            name: "li".into(),
            age: 18,
            tags: vec!["x".into()],
        };
        let data = Serialized(&s).into_assignments().unwrap();
        let fields: Vec<_> = data.iter().map(|a| a.field.as_str()).collect();
        assert_eq!(fields, ["age", "name", "tags"]);
        assert_eq!(data[0].value, Value::Int(18));
        assert_eq!(data[1].value, Value::Text("li".into()));
        assert_eq!(data[2].value, Value::Json(serde_json::json!(["x"])));
    }

    #[test]
    fn serialized_scalar_rejected() {
        let err = Serialized(5).into_assignments().unwrap_err();
        assert!(matches!(err, DbError::Serialization(_)));
    }
}
