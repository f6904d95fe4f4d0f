//! Named connection handles.
//!
//! Connections are registered once, at startup, under logical names (`"master"`,
//! `"slave"`, ...). A [`TableBinding`](crate::TableBinding) refers to them by name.
//!
//! The process-wide registry is write-once: [`init_registry`] succeeds exactly one time and
//! every later call fails, so lookups never need a lock.
//!
//! # Example
//!
//! ```ignore
//! let primary: Arc<dyn Database> = Arc::new(my_driver::connect(primary_dsn).await?);
//! let replica: Arc<dyn Database> = Arc::new(my_driver::connect(replica_dsn).await?);
//!
//! sqlwrap::init_registry([("master", primary), ("slave", replica)])?;
//! ```

use crate::client::Database;
use crate::error::{DbError, DbResult};
use crate::transaction::Transaction;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

static REGISTRY: OnceLock<Arc<ConnectionRegistry>> = OnceLock::new();

/// An immutable map from connection name to handle.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    links: HashMap<String, Arc<dyn Database>>,
}

impl ConnectionRegistry {
    pub fn new<I, K>(links: I) -> Self
    where
        I: IntoIterator<Item = (K, Arc<dyn Database>)>,
        K: Into<String>,
    {
        Self {
            links: links.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Look up a handle by name.
    pub fn get(&self, name: &str) -> DbResult<Arc<dyn Database>> {
        self.links
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::config(format!("connection '{name}' is not registered")))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.links.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    /// Begin a transaction on the named connection.
    pub async fn begin(&self, name: &str) -> DbResult<Transaction> {
        let db = self.get(name)?;
        let handle = db.begin().await?;
        tracing::debug!(target: "sqlwrap.tx", connection = name, "transaction started");
        Ok(Transaction::new(name, handle))
    }
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ConnectionRegistry")
            .field("links", &names)
            .finish()
    }
}

/// Install the process-wide registry. Fails if it was already installed.
pub fn init_registry<I, K>(links: I) -> DbResult<()>
where
    I: IntoIterator<Item = (K, Arc<dyn Database>)>,
    K: Into<String>,
{
    let registry = Arc::new(ConnectionRegistry::new(links));
    let names = registry.links.len();
    REGISTRY
        .set(registry)
        .map_err(|_| DbError::config("connection registry is already initialized"))?;
    tracing::info!(target: "sqlwrap.registry", connections = names, "connection registry initialized");
    Ok(())
}

/// The process-wide registry. Fails until [`init_registry`] has run.
pub fn registry() -> DbResult<Arc<ConnectionRegistry>> {
    REGISTRY
        .get()
        .cloned()
        .ok_or_else(|| DbError::config("connection registry is not initialized"))
}

/// Begin a transaction on a connection of the process-wide registry.
pub async fn begin(name: &str) -> DbResult<Transaction> {
    registry()?.begin(name).await
}
