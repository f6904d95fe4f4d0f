//! Explicit transactions.
//!
//! A [`Transaction`] is opened on a named connection, passed to operations through
//! [`ExecContext::with_transaction`](crate::ExecContext::with_transaction), and finished
//! with [`Transaction::commit`] or [`Transaction::rollback`]. While it is attached to a
//! context every statement runs on it, whatever the table binding or wrapper hints say.
//!
//! # Example
//!
//! ```ignore
//! let tx = sqlwrap::begin("master").await?;
//! let ctx = ExecContext::new().with_transaction(&tx);
//! students.update_by_wrapper(&ctx, w1).await?;
//! scores.insert_by_wrapper(&ctx, w2).await?;
//! tx.commit().await?;
//! ```

use crate::client::{Connection, TransactionHandle};
use crate::error::DbResult;
use std::fmt;

/// A transaction bound to the connection it was started on.
///
/// Dropping it without committing leaves the outcome to the driver (usually a rollback).
pub struct Transaction {
    connection: String,
    handle: Box<dyn TransactionHandle>,
}

impl Transaction {
    /// Wrap a driver transaction started on `connection`.
    pub fn new(connection: impl Into<String>, handle: Box<dyn TransactionHandle>) -> Self {
        Self {
            connection: connection.into(),
            handle,
        }
    }

    /// Name of the connection the transaction runs on.
    pub fn connection_name(&self) -> &str {
        &self.connection
    }

    /// The transaction as a plain statement handle.
    pub fn as_connection(&self) -> &dyn Connection {
        &*self.handle
    }

    pub async fn commit(self) -> DbResult<()> {
        let name = self.connection;
        self.handle.commit().await?;
        tracing::debug!(target: "sqlwrap.tx", connection = %name, "transaction committed");
        Ok(())
    }

    pub async fn rollback(self) -> DbResult<()> {
        let name = self.connection;
        self.handle.rollback().await?;
        tracing::debug!(target: "sqlwrap.tx", connection = %name, "transaction rolled back");
        Ok(())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

/// Runs the given block inside a transaction on a named connection.
///
/// - Begins a transaction via `$registry.begin($name)`.
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)`; a failed rollback is reported alongside the original error.
///
/// The block must evaluate to `sqlwrap::DbResult<T>`, and so does the whole macro.
///
/// # Example
///
/// ```ignore
/// let registry = sqlwrap::registry()?;
/// sqlwrap::transaction!(registry, "master", tx, {
///     let ctx = ExecContext::new().with_transaction(&tx);
///     dao.delete_by_id(&ctx, "id", 1).await?;
///     Ok(())
/// })?;
/// ```
#[macro_export]
macro_rules! transaction {
    ($registry:expr, $name:expr, $tx:ident, $body:block) => {{
        match ($registry).begin($name).await {
            Ok($tx) => {
                let __sqlwrap_tx_body_result = async { $body }.await;
                match __sqlwrap_tx_body_result {
                    Ok(value) => $tx.commit().await.map(|()| value),
                    Err(error) => match $tx.rollback().await {
                        Ok(()) => Err(error),
                        Err(rollback_err) => Err($crate::DbError::Other(format!(
                            "{error} (rollback failed: {rollback_err})"
                        ))),
                    },
                }
            }
            Err(error) => Err(error),
        }
    }};
}
