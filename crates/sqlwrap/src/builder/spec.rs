//! The logical description of a statement.

use crate::condition::Condition;

/// Row count used when no limit was configured.
pub const DEFAULT_LIMIT: u64 = 1024;

/// Everything a statement needs besides the target table and the written columns.
///
/// Owned by a single [`Wrapper`](crate::Wrapper); the builder only reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    /// SELECT list, joined with `,` verbatim. Empty means `*`.
    pub fields: Vec<String>,
    /// Table alias, rendered right after the table name.
    pub alias: String,
    /// Raw join clause(s), each prefixed with a space when added.
    pub join: String,
    /// AND-joined filter conditions.
    pub conditions: Vec<Condition>,
    /// Raw GROUP BY expression.
    pub group: String,
    /// Raw HAVING expression.
    pub having: String,
    /// Raw ORDER BY expression.
    pub order: String,
    pub offset: u64,
    /// `0` means [`DEFAULT_LIMIT`].
    pub limit: u64,
    /// 1-based page; when greater than 1 it replaces `offset`.
    pub page: u64,
    /// Overrides the bound table name when non-empty.
    pub table_name: String,
    /// Read from the primary even for SELECT.
    pub use_primary: bool,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective row count of a paged SELECT.
    pub fn effective_limit(&self) -> u64 {
        if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit
        }
    }

    /// Effective first row of a paged SELECT.
    pub fn effective_offset(&self) -> u64 {
        if self.page > 1 {
            (self.page - 1).saturating_mul(self.effective_limit())
        } else {
            self.offset
        }
    }

    pub(crate) fn select_list(&self) -> String {
        if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(",")
        }
    }
}
