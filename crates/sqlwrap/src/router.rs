//! Connection selection.
//!
//! Priority, highest first:
//!
//! 1. a transaction attached to the call
//! 2. the primary connection, for writes or when the wrapper asks for it
//! 3. the replica connection, falling back to the primary when none is configured

use crate::client::{Connection, Database};
use crate::config::TableBinding;
use crate::error::DbResult;
use crate::registry::ConnectionRegistry;
use crate::transaction::Transaction;
use std::fmt;
use std::sync::Arc;

/// Where a statement will run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget<'a> {
    Transaction,
    Primary(&'a str),
    Replica(&'a str),
}

impl RouteTarget<'_> {
    /// Connection name, or `None` when the statement runs in a transaction.
    pub fn connection_name(&self) -> Option<&str> {
        match self {
            Self::Transaction => None,
            Self::Primary(name) | Self::Replica(name) => Some(name),
        }
    }
}

impl fmt::Display for RouteTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction => f.write_str("transaction"),
            Self::Primary(name) => write!(f, "primary:{name}"),
            Self::Replica(name) => write!(f, "replica:{name}"),
        }
    }
}

/// Pick the target for a statement on `binding`.
pub fn route(binding: &TableBinding, in_transaction: bool, force_primary: bool) -> RouteTarget<'_> {
    if in_transaction {
        RouteTarget::Transaction
    } else if force_primary {
        RouteTarget::Primary(&binding.primary)
    } else {
        RouteTarget::Replica(binding.replica_name())
    }
}

/// A resolved handle: borrowed from the caller's transaction or looked up by name.
pub(crate) enum Handle<'a> {
    Transaction(&'a Transaction),
    Named(Arc<dyn Database>),
}

impl Handle<'_> {
    pub(crate) fn connection(&self) -> &dyn Connection {
        match self {
            Self::Transaction(tx) => tx.as_connection(),
            Self::Named(db) => db.as_ref(),
        }
    }
}

/// Route and look the handle up in `registry`.
pub(crate) fn resolve<'a>(
    registry: &ConnectionRegistry,
    binding: &TableBinding,
    tx: Option<&'a Transaction>,
    force_primary: bool,
) -> DbResult<Handle<'a>> {
    let target = route(binding, tx.is_some(), force_primary);
    tracing::debug!(
        target: "sqlwrap.route",
        table = %binding.table_name,
        route = %target,
        "connection selected"
    );
    if let Some(tx) = tx {
        return Ok(Handle::Transaction(tx));
    }
    let name = target.connection_name().unwrap_or(&binding.primary);
    Ok(Handle::Named(registry.get(name)?))
}
