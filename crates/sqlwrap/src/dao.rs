//! Per-table data access.
//!
//! A [`Dao`] pairs a [`TableBinding`] with a connection registry and runs
//! [`Wrapper`]-described statements. Every operation follows the same steps:
//!
//! 1. validate the binding
//! 2. surface the wrapper's deferred errors
//! 3. pick a connection (a transaction in the [`ExecContext`] always wins; writes use the
//!    primary; reads use the replica unless the wrapper asks for the primary)
//! 4. render the statement and run it, bounded by the context timeout
//!
//! Nothing reaches the driver when steps 1-3 fail.
//!
//! # Example
//!
//! ```ignore
//! let students = Dao::new(TableBinding::new("student", "master").with_replica("slave"));
//! let ctx = ExecContext::new();
//!
//! let id = students.insert(&ctx, [("name", Value::from("li")), ("age", Value::from(18))]).await?;
//! let rows: Vec<Student> = students
//!     .select_by_wrapper(&ctx, wrapper().ge("age", 18).order("id desc"))
//!     .await?;
//! ```

use crate::assign::IntoAssignments;
use crate::builder::{self, BuiltQuery};
use crate::config::{ExecContext, TableBinding};
use crate::error::{DbError, DbResult};
use crate::registry::{self, ConnectionRegistry};
use crate::router::{self, Handle};
use crate::row::{FromRow, Row};
use crate::value::Value;
use crate::wrapper::{Wrapper, wrapper};
use futures_util::StreamExt;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// Data access object for one logical table.
#[derive(Debug, Clone)]
pub struct Dao {
    binding: TableBinding,
    registry: Option<Arc<ConnectionRegistry>>,
}

impl Dao {
    /// A `Dao` resolving connections through the process-wide registry.
    pub fn new(binding: TableBinding) -> Self {
        Self {
            binding,
            registry: None,
        }
    }

    /// Resolve connections through `registry` instead of the process-wide one.
    pub fn with_registry(mut self, registry: Arc<ConnectionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn binding(&self) -> &TableBinding {
        &self.binding
    }

    pub fn table_name(&self) -> &str {
        &self.binding.table_name
    }

    // ==================== Writes ====================

    /// Insert one row and return the generated id.
    pub async fn insert<A: IntoAssignments>(&self, ctx: &ExecContext<'_>, data: A) -> DbResult<i64> {
        self.binding.check()?;
        let w = wrapper().set_all(data.into_assignments()?);
        self.insert_by_wrapper(ctx, w).await
    }

    /// Insert the wrapper's assignments and return the generated id.
    pub async fn insert_by_wrapper(&self, ctx: &ExecContext<'_>, w: Wrapper) -> DbResult<i64> {
        self.prepare(&w)?;
        let handle = self.handle(ctx, true)?;
        let query = builder::build_insert(self.table_name(), w.spec(), w.data())?;
        let result = self
            .run(ctx, "insert", &query, handle.connection().execute(&query.sql, &query.args))
            .await?;
        result.last_insert_id.ok_or_else(|| {
            DbError::Other(format!(
                "insert into '{}' did not report a generated id",
                self.table_name()
            ))
        })
    }

    /// Update the row whose `id_key` equals `id`; `id_key` itself is never written.
    pub async fn update_by_id<A: IntoAssignments>(
        &self,
        ctx: &ExecContext<'_>,
        data: A,
        id_key: &str,
        id: impl Into<Value>,
    ) -> DbResult<u64> {
        self.binding.check()?;
        let data = data
            .into_assignments()?
            .into_iter()
            .filter(|a| a.field != id_key);
        let w = wrapper().set_all(data).eq(id_key, id);
        self.update_by_wrapper(ctx, w).await
    }

    /// Apply the wrapper's assignments to the rows matching its conditions.
    pub async fn update_by_wrapper(&self, ctx: &ExecContext<'_>, w: Wrapper) -> DbResult<u64> {
        self.prepare(&w)?;
        let handle = self.handle(ctx, true)?;
        let query = builder::build_update(self.table_name(), w.spec(), w.data())?;
        let result = self
            .run(ctx, "update", &query, handle.connection().execute(&query.sql, &query.args))
            .await?;
        Ok(result.rows_affected)
    }

    /// Delete the row whose `id_key` equals `id`.
    pub async fn delete_by_id(
        &self,
        ctx: &ExecContext<'_>,
        id_key: &str,
        id: impl Into<Value>,
    ) -> DbResult<u64> {
        self.binding.check()?;
        self.delete_by_wrapper(ctx, wrapper().eq(id_key, id)).await
    }

    /// Delete the rows matching the wrapper's conditions.
    pub async fn delete_by_wrapper(&self, ctx: &ExecContext<'_>, w: Wrapper) -> DbResult<u64> {
        self.prepare(&w)?;
        let handle = self.handle(ctx, true)?;
        let query = builder::build_delete(self.table_name(), w.spec())?;
        let result = self
            .run(ctx, "delete", &query, handle.connection().execute(&query.sql, &query.args))
            .await?;
        Ok(result.rows_affected)
    }

    // ==================== Reads ====================

    /// Run the wrapper's paged SELECT and map every row.
    pub async fn select_by_wrapper<T: FromRow>(
        &self,
        ctx: &ExecContext<'_>,
        w: Wrapper,
    ) -> DbResult<Vec<T>> {
        self.prepare(&w)?;
        let handle = self.handle(ctx, w.spec().use_primary)?;
        let query = builder::build_select(self.table_name(), w.spec())?;
        let rows = self
            .run(ctx, "select", &query, handle.connection().query(&query.sql, &query.args))
            .await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Run the wrapper's paged SELECT, returning rows as column-to-value maps.
    ///
    /// Byte values are returned as text.
    pub async fn select_map_by_wrapper(
        &self,
        ctx: &ExecContext<'_>,
        w: Wrapper,
    ) -> DbResult<Vec<BTreeMap<String, Value>>> {
        self.prepare(&w)?;
        let handle = self.handle(ctx, w.spec().use_primary)?;
        let query = builder::build_select(self.table_name(), w.spec())?;
        let conn = handle.connection();
        let fetch = async {
            let mut stream = conn.query_raw(&query.sql, &query.args).await?;
            let mut out = Vec::new();
            while let Some(row) = stream.next().await {
                out.push(bytes_to_text(row?));
            }
            Ok::<_, DbError>(out)
        };
        self.run(ctx, "select_map", &query, fetch).await
    }

    /// Fetch the first row whose `id_key` equals `id`.
    ///
    /// Fails with [`DbError::NotFound`] when no row matches.
    pub async fn get_by_id<T: FromRow>(
        &self,
        ctx: &ExecContext<'_>,
        id_key: &str,
        id: impl Into<Value>,
    ) -> DbResult<T> {
        self.binding.check()?;
        let id = id.into();
        let w = wrapper().eq(id_key, id.clone());
        let handle = self.handle(ctx, false)?;
        let query = builder::build_select_one(self.table_name(), w.spec())?;
        let rows = self
            .run(ctx, "get", &query, handle.connection().query(&query.sql, &query.args))
            .await?;
        let row = rows.first().ok_or_else(|| {
            DbError::not_found(format!(
                "no row in '{}' with {id_key} = {id:?}",
                self.table_name()
            ))
        })?;
        T::from_row(row)
    }

    /// Count the rows matching the wrapper's conditions.
    pub async fn count_by_wrapper(&self, ctx: &ExecContext<'_>, w: Wrapper) -> DbResult<i64> {
        self.prepare(&w)?;
        let handle = self.handle(ctx, w.spec().use_primary)?;
        let query = builder::build_count(self.table_name(), w.spec())?;
        let row = self
            .run(ctx, "count", &query, handle.connection().query_one(&query.sql, &query.args))
            .await?;
        row.try_get::<i64>("cn")
    }

    // ==================== Internals ====================

    fn prepare(&self, w: &Wrapper) -> DbResult<()> {
        self.binding.check()?;
        w.check()
    }

    fn handle<'a>(&self, ctx: &ExecContext<'a>, force_primary: bool) -> DbResult<Handle<'a>> {
        let registry = match &self.registry {
            Some(registry) => Arc::clone(registry),
            None => registry::registry()?,
        };
        router::resolve(&registry, &self.binding, ctx.transaction(), force_primary)
    }

    async fn run<T, F>(
        &self,
        ctx: &ExecContext<'_>,
        op: &'static str,
        query: &BuiltQuery,
        fut: F,
    ) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        tracing::debug!(
            target: "sqlwrap.sql",
            op,
            table = %self.binding.table_name,
            sql = %query.sql,
            args = query.args.len(),
            "executing"
        );
        let result = match ctx.timeout() {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .unwrap_or_else(|_| Err(DbError::Timeout(limit))),
            None => fut.await,
        };
        if let Err(err) = &result {
            tracing::warn!(
                target: "sqlwrap.sql",
                op,
                table = %self.binding.table_name,
                sql = %query.sql,
                error = %err,
                "statement failed"
            );
        }
        result
    }
}

fn bytes_to_text(row: Row) -> BTreeMap<String, Value> {
    row.into_map()
        .into_iter()
        .map(|(column, value)| match value {
            Value::Bytes(raw) => (column, Value::Text(String::from_utf8_lossy(&raw).into_owned())),
            other => (column, other),
        })
        .collect()
}

#[cfg(test)]
mod tests;
