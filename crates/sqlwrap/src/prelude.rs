//! Common imports:
//!
//! ```ignore
//! use sqlwrap::prelude::*;
//! ```

pub use crate::{
    Dao, DbError, DbResult, ExecContext, FromRow, Row, TableBinding, Transaction, Value, Wrapper,
    wrapper,
};
