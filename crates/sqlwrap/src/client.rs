//! Driver contract.
//!
//! sqlwrap does not talk to a database itself. A driver crate (or an application adapter)
//! implements these traits for its connection and transaction types:
//!
//! - [`Connection`]: the statement primitives shared by plain connections and transactions,
//!   so the router can substitute one for the other.
//! - [`Database`]: a connection that can start transactions; this is what the
//!   [registry](crate::registry) stores.
//! - [`TransactionHandle`]: a connection that finishes with commit or rollback.
//!
//! The traits are object safe so handles can be stored as `Arc<dyn Database>`.

use crate::error::{DbError, DbResult};
use crate::row::{Row, RowStream};
use crate::value::Value;
use async_trait::async_trait;

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Identifier generated by an INSERT, when the driver reports one.
    pub last_insert_id: Option<i64>,
}

impl ExecResult {
    pub fn new(rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }
}

/// Statement primitives over a live handle.
///
/// `sql` uses `?` placeholders; `args` are bound positionally.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute a query and return all rows.
    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Vec<Row>>;

    /// Execute a query and return the **first** row.
    ///
    /// Semantics:
    /// - 0 rows: returns [`DbError::NotFound`]
    /// - 1 or more rows: returns the first row
    async fn query_one(&self, sql: &str, args: &[Value]) -> DbResult<Row> {
        let rows = self.query(sql, args).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("Expected one row, got none"))
    }

    /// Execute a statement and report affected rows and the generated identifier.
    async fn execute(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult>;

    /// Execute a query and return a cursor for incremental consumption.
    async fn query_raw(&self, sql: &str, args: &[Value]) -> DbResult<RowStream>;
}

/// A transaction in progress.
#[async_trait]
pub trait TransactionHandle: Connection {
    async fn commit(self: Box<Self>) -> DbResult<()>;

    async fn rollback(self: Box<Self>) -> DbResult<()>;
}

/// A connection that can open transactions.
#[async_trait]
pub trait Database: Connection {
    async fn begin(&self) -> DbResult<Box<dyn TransactionHandle>>;
}
