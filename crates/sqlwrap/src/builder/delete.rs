//! DELETE rendering.

use super::where_builder::build_where;
use super::{BuiltQuery, QuerySpec, resolve_table};
use crate::error::{DbError, DbResult};

/// Render `delete from t where ...`.
///
/// A DELETE without conditions is rejected.
pub fn build_delete(table: &str, spec: &QuerySpec) -> DbResult<BuiltQuery> {
    let table = resolve_table(table, spec)?;
    if spec.conditions.is_empty() {
        return Err(DbError::invalid(format!(
            "delete from {table}: deleting every row is not supported, add a condition"
        )));
    }

    let mut args = Vec::new();
    let clause = build_where(&spec.conditions, &mut args)?;
    Ok(BuiltQuery::new(
        format!("delete from {table} where {clause}"),
        args,
    ))
}
