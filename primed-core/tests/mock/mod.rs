#![allow(dead_code)]

use primed_core::{
    DbError, DbErrorKind, Driver, Error, GenericSqlWriter, PrepareConfig, Result, RowLabeled,
    Session, SessionId, Value,
    stream::{self, Stream},
};
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

#[derive(Default, Debug, Clone, Copy)]
pub struct MockDriver;

impl Driver for MockDriver {
    type SqlWriter = GenericSqlWriter;

    const NAME: &'static str = "mock";

    fn sql_writer(&self) -> GenericSqlWriter {
        GenericSqlWriter::new()
    }
}

/// What the mock engine saw and what it should answer.
#[derive(Default, Debug)]
pub struct MockState {
    /// Statements currently prepared on the "server": name to SQL.
    pub prepared: BTreeMap<String, String>,
    pub prepare_calls: Vec<String>,
    pub execute_calls: Vec<(String, Vec<Value>)>,
    pub deallocate_calls: Vec<String>,
    /// PREPARE fails with this kind when the SQL contains the text.
    pub prepare_failures: Vec<(String, DbErrorKind)>,
    /// The next executions fail with these kinds, one per call.
    pub execute_failures: VecDeque<DbErrorKind>,
    pub rows: Vec<RowLabeled>,
    pub prepare_delay: Option<Duration>,
}

/// In memory session following the prepare, execute, deallocate protocol of a real engine.
pub struct MockSession {
    pub id: SessionId,
    pub config: PrepareConfig,
    pub state: Arc<Mutex<MockState>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            id: SessionId::next(),
            config: PrepareConfig::default(),
            state: Default::default(),
        }
    }
    pub fn with_config(mut self, config: PrepareConfig) -> Self {
        self.config = config;
        self
    }
    pub fn with_rows(self, rows: Vec<RowLabeled>) -> Self {
        self.state.lock().unwrap().rows = rows;
        self
    }
    pub fn set_rows(&self, rows: Vec<RowLabeled>) {
        self.state.lock().unwrap().rows = rows;
    }
    pub fn fail_prepare(&self, sql_part: &str, kind: DbErrorKind) {
        self.state
            .lock()
            .unwrap()
            .prepare_failures
            .push((sql_part.into(), kind));
    }
    pub fn fail_next_execute(&self, kind: DbErrorKind) {
        self.state.lock().unwrap().execute_failures.push_back(kind);
    }
    /// Drop every server side statement, as `DISCARD ALL` does.
    pub fn reset(&self) {
        self.state.lock().unwrap().prepared.clear();
    }
    pub fn prepare_count(&self) -> usize {
        self.state.lock().unwrap().prepare_calls.len()
    }
    pub fn execute_count(&self) -> usize {
        self.state.lock().unwrap().execute_calls.len()
    }
    pub fn prepared_names(&self) -> Vec<String> {
        self.state.lock().unwrap().prepared.keys().cloned().collect()
    }
}

pub fn rows(labels: &[&str], values: Vec<Vec<Value>>) -> Vec<RowLabeled> {
    let labels: Arc<[String]> = labels.iter().map(|v| v.to_string()).collect();
    values
        .into_iter()
        .map(|v| RowLabeled::new(labels.clone(), v.into_boxed_slice()))
        .collect()
}

fn db_error(kind: DbErrorKind, message: &str) -> Error {
    Error::new(DbError::new(kind, message))
}

impl Session for MockSession {
    type Driver = MockDriver;

    fn driver(&self) -> &Self::Driver {
        &MockDriver
    }

    fn id(&self) -> SessionId {
        self.id
    }

    fn config(&self) -> PrepareConfig {
        self.config
    }

    async fn prepare(&self, name: &str, sql: &str) -> Result<()> {
        let delay = self.state.lock().unwrap().prepare_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();
        state.prepare_calls.push(name.into());
        if let Some((_, kind)) = state
            .prepare_failures
            .iter()
            .find(|(part, _)| sql.contains(part.as_str()))
        {
            return Err(db_error(*kind, "scripted prepare failure"));
        }
        if state.prepared.contains_key(name) {
            return Err(db_error(
                DbErrorKind::AlreadyPrepared,
                "prepared statement already exists",
            ));
        }
        state.prepared.insert(name.into(), sql.into());
        Ok(())
    }

    fn execute(
        &self,
        name: &str,
        params: &[Value],
    ) -> impl Stream<Item = Result<RowLabeled>> + Send {
        let mut state = self.state.lock().unwrap();
        state.execute_calls.push((name.into(), params.to_vec()));
        let result = if let Some(kind) = state.execute_failures.pop_front() {
            vec![Err(db_error(kind, "scripted execute failure"))]
        } else if !state.prepared.contains_key(name) {
            vec![Err(db_error(
                DbErrorKind::SessionLost,
                "prepared statement does not exist",
            ))]
        } else {
            state.rows.iter().cloned().map(Ok).collect()
        };
        stream::iter(result)
    }

    async fn deallocate(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.deallocate_calls.push(name.into());
        match state.prepared.remove(name) {
            Some(..) => Ok(()),
            None => Err(db_error(
                DbErrorKind::SessionLost,
                "prepared statement does not exist",
            )),
        }
    }

    async fn batch_execute(&self, _sql: &str) -> Result<()> {
        Ok(())
    }
}
