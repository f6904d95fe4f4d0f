//! In-memory driver used by the unit tests.
//!
//! Records every statement it receives and replays canned rows and execution results.
//! Clones share state, so a test can keep one copy and hand another to a registry.

use crate::client::{Connection, Database, ExecResult, TransactionHandle};
use crate::error::{DbError, DbResult};
use crate::registry::ConnectionRegistry;
use crate::row::{Row, RowStream};
use crate::value::Value;
use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One statement as the driver saw it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    /// `"<name>"` for the plain connection, `"<name>:tx"` inside a transaction.
    pub connection: String,
    pub sql: String,
    pub args: Vec<Value>,
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    exec: ExecResult,
    delay: Option<Duration>,
    row_delay: Option<Duration>,
    finished: Vec<String>,
}

#[derive(Clone)]
pub(crate) struct MemoryDatabase {
    name: String,
    state: Arc<Mutex<State>>,
}

impl MemoryDatabase {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::default(),
        }
    }

    /// Rows returned by every query.
    pub(crate) fn with_rows(self, columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.columns = columns.iter().map(|c| c.to_string()).collect();
            state.rows = rows;
        }
        self
    }

    /// Result returned by every `execute`.
    pub(crate) fn with_exec(self, exec: ExecResult) -> Self {
        self.state.lock().unwrap().exec = exec;
        self
    }

    /// Delay applied to every statement.
    pub(crate) fn with_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    /// Delay applied before each row of a `query_raw` stream.
    pub(crate) fn with_row_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().row_delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// `"<name>:tx commit"` / `"<name>:tx rollback"`, in order.
    pub(crate) fn finished(&self) -> Vec<String> {
        self.state.lock().unwrap().finished.clone()
    }

    pub(crate) fn handle(&self) -> Arc<dyn Database> {
        Arc::new(self.clone())
    }
}

/// A registry holding the given fakes under their own names.
pub(crate) fn registry_of(dbs: &[&MemoryDatabase]) -> Arc<ConnectionRegistry> {
    Arc::new(ConnectionRegistry::new(
        dbs.iter().map(|db| (db.name.clone(), db.handle())),
    ))
}

struct Recorder {
    label: String,
    state: Arc<Mutex<State>>,
}

impl Recorder {
    async fn record(&self, sql: &str, args: &[Value]) {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call {
                connection: self.label.clone(),
                sql: sql.to_string(),
                args: args.to_vec(),
            });
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn rows(&self) -> (Arc<[String]>, Vec<Row>) {
        let state = self.state.lock().unwrap();
        let columns: Arc<[String]> = Arc::from(state.columns.clone());
        let rows = state
            .rows
            .iter()
            .map(|values| Row::new(Arc::clone(&columns), values.clone()).unwrap())
            .collect();
        (columns, rows)
    }

    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Vec<Row>> {
        self.record(sql, args).await;
        Ok(self.rows().1)
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        self.record(sql, args).await;
        Ok(self.state.lock().unwrap().exec)
    }

    async fn query_raw(&self, sql: &str, args: &[Value]) -> DbResult<RowStream> {
        self.record(sql, args).await;
        let (columns, rows) = self.rows();
        let row_delay = self.state.lock().unwrap().row_delay;
        let Some(delay) = row_delay else {
            return Ok(RowStream::from_rows(columns, rows));
        };
        let slow = futures_util::stream::iter(rows).then(move |row| async move {
            tokio::time::sleep(delay).await;
            Ok::<_, DbError>(row)
        });
        Ok(RowStream::new(columns, slow))
    }
}

impl MemoryDatabase {
    fn recorder(&self) -> Recorder {
        Recorder {
            label: self.name.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

#[async_trait]
impl Connection for MemoryDatabase {
    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Vec<Row>> {
        self.recorder().query(sql, args).await
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        self.recorder().execute(sql, args).await
    }

    async fn query_raw(&self, sql: &str, args: &[Value]) -> DbResult<RowStream> {
        self.recorder().query_raw(sql, args).await
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn begin(&self) -> DbResult<Box<dyn TransactionHandle>> {
        Ok(Box::new(MemoryTransaction(Recorder {
            label: format!("{}:tx", self.name),
            state: Arc::clone(&self.state),
        })))
    }
}

struct MemoryTransaction(Recorder);

impl MemoryTransaction {
    fn finish(&self, outcome: &str) {
        let mut state = self.0.state.lock().unwrap();
        state.finished.push(format!("{} {outcome}", self.0.label));
    }
}

#[async_trait]
impl Connection for MemoryTransaction {
    async fn query(&self, sql: &str, args: &[Value]) -> DbResult<Vec<Row>> {
        self.0.query(sql, args).await
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        self.0.execute(sql, args).await
    }

    async fn query_raw(&self, sql: &str, args: &[Value]) -> DbResult<RowStream> {
        self.0.query_raw(sql, args).await
    }
}

#[async_trait]
impl TransactionHandle for MemoryTransaction {
    async fn commit(self: Box<Self>) -> DbResult<()> {
        self.finish("commit");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        self.finish("rollback");
        Ok(())
    }
}
