//! Result rows and row mapping.

use crate::error::{DbError, DbResult};
use crate::value::{FromValue, Value};
use futures_core::Stream;
use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// One result row: column names shared across the result set plus this row's cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row. `values` must line up with `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> DbResult<Self> {
        if columns.len() != values.len() {
            return Err(DbError::Other(format!(
                "row has {} values for {} columns",
                values.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw cell by position or column name.
    pub fn get(&self, index: impl ColumnIndex) -> Option<&Value> {
        index.position(self).map(|i| &self.values[i])
    }

    /// Typed cell by position or column name.
    pub fn try_get<T: FromValue>(&self, index: impl ColumnIndex) -> DbResult<T> {
        let label = index.label();
        let value = self
            .get(index)
            .ok_or_else(|| DbError::decode(label.clone(), "column not found"))?;
        T::from_value(value).map_err(|e| DbError::decode(label, e.to_string()))
    }

    /// Column name → value, consuming the row.
    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.columns.iter().cloned().zip(self.values).collect()
    }
}

/// Something that selects a column of a [`Row`].
pub trait ColumnIndex {
    fn position(&self, row: &Row) -> Option<usize>;
    fn label(&self) -> String;
}

impl ColumnIndex for usize {
    fn position(&self, row: &Row) -> Option<usize> {
        (*self < row.len()).then_some(*self)
    }

    fn label(&self) -> String {
        format!("#{self}")
    }
}

impl ColumnIndex for &str {
    fn position(&self, row: &Row) -> Option<usize> {
        row.columns.iter().position(|c| c == self)
    }

    fn label(&self) -> String {
        (*self).to_string()
    }
}

/// Trait for types that can be constructed from a result [`Row`].
///
/// # Example
/// ```ignore
/// struct Student { id: i64, name: String }
///
/// impl FromRow for Student {
///     fn from_row(row: &Row) -> DbResult<Self> {
///         Ok(Self { id: row.try_get("id")?, name: row.try_get("name")? })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> DbResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(row.clone())
    }
}

impl FromRow for BTreeMap<String, Value> {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(row.clone().into_map())
    }
}

/// A cursor over result rows, with the column names known up front.
///
/// Dropping the stream releases the underlying cursor.
#[must_use]
pub struct RowStream {
    columns: Arc<[String]>,
    inner: Pin<Box<dyn Stream<Item = DbResult<Row>> + Send>>,
}

impl RowStream {
    /// Create a new `RowStream` from any compatible stream.
    pub fn new<S>(columns: Arc<[String]>, stream: S) -> Self
    where
        S: Stream<Item = DbResult<Row>> + Send + 'static,
    {
        Self {
            columns,
            inner: Box::pin(stream),
        }
    }

    /// A stream over rows that are already in memory.
    pub fn from_rows(columns: Arc<[String]>, rows: Vec<Row>) -> Self {
        Self::new(columns, futures_util::stream::iter(rows.into_iter().map(Ok)))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Stream for RowStream {
    type Item = DbResult<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for RowStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}
