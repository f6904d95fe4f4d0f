//! # sqlwrap
//!
//! A fluent SQL statement builder with primary/replica routing.
//!
//! ## Features
//!
//! - **Fluent wrappers**: describe a statement with chained calls; mistakes are collected
//!   and reported once, before anything reaches the database
//! - **Parameterized output**: every value becomes a `?` argument; columns are back-quoted
//! - **Read/write split**: reads go to the replica, writes to the primary, and a transaction
//!   overrides both
//! - **Safe defaults**: UPDATE and DELETE require a WHERE clause, SELECT is always limited
//! - **Driver neutral**: bring any driver by implementing [`Database`]
//!
//! ## Usage
//!
//! ```ignore
//! use sqlwrap::prelude::*;
//!
//! sqlwrap::init_registry([("master", primary), ("slave", replica)])?;
//!
//! let students = Dao::new(TableBinding::new("student", "master").with_replica("slave"));
//! let ctx = ExecContext::new();
//!
//! // SELECT * FROM student WHERE `age` >= ? AND `class_id` IN (?, ?) ORDER BY id desc LIMIT 0,20
//! let rows: Vec<Student> = students
//!     .select_by_wrapper(&ctx, wrapper().ge("age", 18).in_list("class_id", [1, 2]).order("id desc").limit(20))
//!     .await?;
//!
//! // UPDATE student SET `name` = ?, `updated_at` = NOW() WHERE `id` = ?
//! students
//!     .update_by_wrapper(&ctx, wrapper().set("name", "li").set_exp("updated_at", "NOW()").eq("id", 7))
//!     .await?;
//! ```

pub mod assign;
pub mod builder;
pub mod client;
pub mod condition;
pub mod config;
pub mod dao;
pub mod error;
pub mod ident;
pub mod prelude;
pub mod registry;
pub mod router;
pub mod row;
pub mod transaction;
pub mod value;
pub mod wrapper;

#[cfg(test)]
mod testing;

pub use assign::{IntoAssignments, Serialized};
pub use builder::{BuiltQuery, QuerySpec};
pub use client::{Connection, Database, ExecResult, TransactionHandle};
pub use condition::{AssignKind, Assignment, Condition, Op};
pub use config::{ExecContext, TableBinding};
pub use dao::Dao;
pub use error::{DbError, DbResult};
pub use ident::{null_to_default_num, null_to_default_str, quote_field};
pub use registry::{ConnectionRegistry, begin, init_registry, registry};
pub use router::{RouteTarget, route};
pub use row::{ColumnIndex, FromRow, Row, RowStream};
pub use transaction::Transaction;
pub use value::{FromValue, Value};
pub use wrapper::{Wrapper, wrapper};
