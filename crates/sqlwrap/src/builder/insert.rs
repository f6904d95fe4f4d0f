//! INSERT rendering.

use super::{BuiltQuery, QuerySpec, resolve_table};
use crate::condition::{AssignKind, Assignment};
use crate::error::{DbError, DbResult};
use crate::ident::write_quoted;

/// Render `` insert into `t`(`a`, `b`) values (?, ?) ``.
///
/// Expression assignments are spliced into the values list instead of being bound.
pub fn build_insert(table: &str, spec: &QuerySpec, data: &[Assignment]) -> DbResult<BuiltQuery> {
    let table = resolve_table(table, spec)?;
    if data.is_empty() {
        return Err(DbError::invalid(format!(
            "insert into {table}: data must not be empty"
        )));
    }

    let mut args = Vec::with_capacity(data.len());
    let mut columns = String::new();
    let mut values = String::new();

    for (i, item) in data.iter().enumerate() {
        if i > 0 {
            columns.push_str(", ");
            values.push_str(", ");
        }
        write_quoted(&item.field, &mut columns);
        match item.kind {
            AssignKind::Value => {
                values.push('?');
                args.push(item.value.clone());
            }
            AssignKind::Expression => values.push_str(expression_text(item)?),
        }
    }

    let mut sql = String::from("insert into ");
    write_quoted(table, &mut sql);
    sql.push_str(&format!("({columns}) values ({values})"));
    Ok(BuiltQuery::new(sql, args))
}

pub(super) fn expression_text(item: &Assignment) -> DbResult<&str> {
    item.value.as_str().ok_or_else(|| {
        DbError::invalid(format!(
            "[{}] expression must be SQL text, got {}",
            item.field,
            item.value.kind()
        ))
    })
}
