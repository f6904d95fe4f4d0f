//! Statement rendering.
//!
//! Pure functions that turn a [`QuerySpec`] (and, for writes, a list of
//! [`Assignment`](crate::Assignment)s) into SQL text plus the ordered argument list.
//!
//! ## Dialect
//!
//! - Columns are back-quoted per segment; raw fragments (joins, group/order/having,
//!   `apply` text, expression assignments) are passed through untouched.
//! - Every user value becomes a `?` placeholder; arguments are returned in placeholder order.
//! - SELECT always carries `limit <start>,<count>`.
//! - UPDATE and DELETE refuse to run without a WHERE clause; INSERT and UPDATE refuse to
//!   run without assignments.

mod delete;
mod insert;
mod select;
mod spec;
mod update;
mod where_builder;

pub use delete::build_delete;
pub use insert::build_insert;
pub use select::{build_count, build_select, build_select_one, limit_window};
pub use spec::{DEFAULT_LIMIT, QuerySpec};
pub use update::build_update;
pub use where_builder::build_where;

use crate::error::{DbError, DbResult};
use crate::value::Value;

/// Rendered SQL text and its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub args: Vec<Value>,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: String, args: Vec<Value>) -> Self {
        Self { sql, args }
    }

    /// Number of `?` placeholders outside of quoted text.
    pub fn placeholder_count(&self) -> usize {
        let mut count = 0;
        let mut in_quote: Option<char> = None;
        for ch in self.sql.chars() {
            match (in_quote, ch) {
                (None, '\'' | '`' | '"') => in_quote = Some(ch),
                (Some(q), c) if c == q => in_quote = None,
                (None, '?') => count += 1,
                _ => {}
            }
        }
        count
    }
}

/// Table the statement targets: the spec's override, else the bound table.
fn resolve_table<'a>(table: &'a str, spec: &'a QuerySpec) -> DbResult<&'a str> {
    let table = if spec.table_name.is_empty() {
        table
    } else {
        spec.table_name.as_str()
    };
    if table.is_empty() {
        return Err(DbError::invalid("table name is empty"));
    }
    Ok(table)
}
