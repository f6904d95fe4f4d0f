//! UPDATE rendering.

use super::insert::expression_text;
use super::where_builder::build_where;
use super::{BuiltQuery, QuerySpec, resolve_table};
use crate::condition::{AssignKind, Assignment};
use crate::error::{DbError, DbResult};
use crate::ident::write_quoted;

/// Render `` update t set `a` = ?, `b` = NOW() where ... ``.
///
/// Both the assignment list and the condition list must be non-empty: an UPDATE that would
/// touch every row is rejected. SET arguments come before WHERE arguments.
pub fn build_update(table: &str, spec: &QuerySpec, data: &[Assignment]) -> DbResult<BuiltQuery> {
    let table = resolve_table(table, spec)?;
    if data.is_empty() {
        return Err(DbError::invalid(format!(
            "update {table}: data must not be empty"
        )));
    }
    if spec.conditions.is_empty() {
        return Err(DbError::invalid(format!(
            "update {table}: updating every row is not supported, add a condition"
        )));
    }

    let mut args = Vec::with_capacity(data.len() + spec.conditions.len());
    let mut set = String::new();
    for (i, item) in data.iter().enumerate() {
        if i > 0 {
            set.push_str(", ");
        }
        write_quoted(&item.field, &mut set);
        set.push_str(" = ");
        match item.kind {
            AssignKind::Value => {
                set.push('?');
                args.push(item.value.clone());
            }
            AssignKind::Expression => set.push_str(expression_text(item)?),
        }
    }

    let clause = build_where(&spec.conditions, &mut args)?;
    let sql = format!("update {table} set {set} where {clause}");
    Ok(BuiltQuery::new(sql, args))
}
