//! Table bindings and per-call execution settings.

use crate::error::{DbError, DbResult};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Links a logical table to the connections that serve it.
///
/// Usually loaded from application config:
///
/// ```toml
/// [tables.student]
/// table_name = "student"
/// primary = "master"
/// replica = "slave"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBinding {
    pub table_name: String,
    pub primary: String,
    /// Connection for reads; reads go to `primary` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica: Option<String>,
}

impl TableBinding {
    pub fn new(table_name: impl Into<String>, primary: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            primary: primary.into(),
            replica: None,
        }
    }

    pub fn with_replica(mut self, replica: impl Into<String>) -> Self {
        self.replica = Some(replica.into());
        self
    }

    /// Name of the read connection.
    pub fn replica_name(&self) -> &str {
        match self.replica.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.primary,
        }
    }

    /// Both the table and the primary connection must be named.
    pub fn check(&self) -> DbResult<()> {
        if self.table_name.is_empty() {
            return Err(DbError::config("table binding has no table name"));
        }
        if self.primary.is_empty() {
            return Err(DbError::config(format!(
                "table '{}' has no primary connection",
                self.table_name
            )));
        }
        Ok(())
    }
}

/// Settings for a single call: the transaction to run in and an optional timeout.
///
/// ```ignore
/// let ctx = ExecContext::new()
///     .with_transaction(&tx)
///     .with_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecContext<'a> {
    tx: Option<&'a Transaction>,
    timeout: Option<Duration>,
}

impl<'a> ExecContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every statement of this call inside `tx`.
    pub fn with_transaction(mut self, tx: &'a Transaction) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Abandon the statement with [`DbError::Timeout`] once `timeout` elapses.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn transaction(&self) -> Option<&'a Transaction> {
        self.tx
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replica_defaults_to_primary() {
        let b = TableBinding::new("student", "master");
        assert_eq!(b.replica_name(), "master");
        assert_eq!(b.with_replica("slave").replica_name(), "slave");
    }

    #[test]
    fn missing_names_are_config_errors() {
        assert!(TableBinding::new("", "master").check().unwrap_err().is_config());
        assert!(TableBinding::new("student", "").check().unwrap_err().is_config());
        assert!(TableBinding::new("student", "master").check().is_ok());
    }

    #[test]
    fn binding_loads_from_toml() {
        let raw = r#"
            table_name = "student"
            primary = "master"
        "#;
        let b: TableBinding = toml::from_str(raw).unwrap();
        assert_eq!(b, TableBinding::new("student", "master"));

        let raw = r#"
            table_name = "student"
            primary = "master"
            replica = "slave"
        "#;
        let b: TableBinding = toml::from_str(raw).unwrap();
        assert_eq!(b.replica_name(), "slave");
    }
}
