//! Error types for sqlwrap

use thiserror::Error;

/// Result type alias for sqlwrap operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for building and executing statements
#[derive(Debug, Error)]
pub enum DbError {
    /// Missing table binding fields, registry misuse or an unknown connection name
    #[error("Configuration error: {0}")]
    Config(String),

    /// The statement cannot be rendered (bad operator, arity, missing WHERE, ...)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Errors accumulated by a [`Wrapper`](crate::Wrapper) while it was being built
    #[error("Wrapper error: {0}")]
    Wrapper(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error reported by the underlying driver, passed through untouched
    #[error("Driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl DbError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid query error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Wrap an error coming from a driver implementation
    pub fn driver<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Driver(Box::new(err))
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is an invalid query error
    pub fn is_invalid_query(&self) -> bool {
        matches!(self, Self::InvalidQuery(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
