//! SELECT, single-row SELECT and COUNT rendering.

use super::where_builder::build_where;
use super::{BuiltQuery, QuerySpec, resolve_table};
use crate::error::DbResult;

/// `(start, count)` of the `limit` clause of a paged SELECT.
///
/// `count` is the configured limit (1024 when unset); `start` is `(page - 1) * count` when
/// `page > 1`, otherwise the configured offset.
pub fn limit_window(spec: &QuerySpec) -> (u64, u64) {
    (spec.effective_offset(), spec.effective_limit())
}

/// Render a paged SELECT.
///
/// ```text
/// select <fields> from <table>[ <alias>][ <join>][ where ..][ group by ..][ having ..][ order by ..] limit <start>,<count>
/// ```
pub fn build_select(table: &str, spec: &QuerySpec) -> DbResult<BuiltQuery> {
    let table = resolve_table(table, spec)?;
    let mut args = Vec::new();

    let mut sql = format!("select {} from {table}", spec.select_list());
    push_source_tail(&mut sql, spec);

    if !spec.conditions.is_empty() {
        let clause = build_where(&spec.conditions, &mut args)?;
        sql.push_str(" where ");
        sql.push_str(&clause);
    }
    if !spec.group.is_empty() {
        sql.push_str(" group by ");
        sql.push_str(&spec.group);
    }
    if !spec.having.is_empty() {
        sql.push_str(" having ");
        sql.push_str(&spec.having);
    }
    if !spec.order.is_empty() {
        sql.push_str(" order by ");
        sql.push_str(&spec.order);
    }

    let (start, count) = limit_window(spec);
    sql.push_str(&format!(" limit {start},{count}"));

    Ok(BuiltQuery::new(sql, args))
}

/// Render a SELECT fixed to the first row: no grouping, no paging, `limit 0,1`.
pub fn build_select_one(table: &str, spec: &QuerySpec) -> DbResult<BuiltQuery> {
    let table = resolve_table(table, spec)?;
    let mut args = Vec::new();

    let mut sql = format!("select {} from {table}", spec.select_list());
    push_source_tail(&mut sql, spec);

    if !spec.conditions.is_empty() {
        let clause = build_where(&spec.conditions, &mut args)?;
        sql.push_str(" where ");
        sql.push_str(&clause);
    }
    if !spec.order.is_empty() {
        sql.push_str(" order by ");
        sql.push_str(&spec.order);
    }
    sql.push_str(" limit 0,1");

    Ok(BuiltQuery::new(sql, args))
}

/// Render `select count(1) as cn ...` over the spec's filters.
///
/// The select list of `spec` is ignored; the caller's spec is not modified.
pub fn build_count(table: &str, spec: &QuerySpec) -> DbResult<BuiltQuery> {
    let counting = QuerySpec {
        fields: vec!["count(1) as cn".to_string()],
        ..spec.clone()
    };
    build_select_one(table, &counting)
}

fn push_source_tail(sql: &mut String, spec: &QuerySpec) {
    if !spec.alias.is_empty() {
        sql.push(' ');
        sql.push_str(&spec.alias);
    }
    if !spec.join.is_empty() {
        // Each join was stored with its own leading space.
        sql.push(' ');
        sql.push_str(spec.join.trim_start());
    }
}
