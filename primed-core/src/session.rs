use crate::{AsValue, Driver, PrepareConfig, Record, Result, Value};
use futures::Stream;
use std::{
    fmt::{self, Display, Formatter},
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

/// Identity of one live database session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl SessionId {
    /// A process unique identifier.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

pub type RowNames = Arc<[String]>;
pub type Row = Box<[Value]>;

/// A row of values together with the column names.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RowLabeled {
    /// Column names.
    pub labels: RowNames,
    /// Data values (aligned by index with `labels`).
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values()[i])
    }
    /// Convert the column `name` into `T`.
    pub fn get<T: AsValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get_column(name)
            .ok_or_else(|| crate::Error::msg(format!("The row has no column `{}`", name)))?;
        T::try_from_value(value.clone())
    }
    pub fn into_record(self) -> Record {
        self.labels
            .iter()
            .cloned()
            .zip(self.values.into_vec())
            .collect()
    }
}

/// A live connection able to run the prepare, execute and deallocate protocol.
///
/// Failures reported by the engine must carry a [`crate::DbError`] in their chain so that the
/// preparation layer can tell a lost session from a broken statement.
pub trait Session: Send + Sync {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    fn id(&self) -> SessionId;

    fn config(&self) -> PrepareConfig {
        PrepareConfig::default()
    }

    /// Create the prepared statement `name` from `sql`, which uses `$n` parameters.
    fn prepare(&self, name: &str, sql: &str) -> impl Future<Output = Result<()>> + Send;

    /// Run the prepared statement `name` with `params` bound positionally.
    fn execute(&self, name: &str, params: &[Value]) -> impl Stream<Item = Result<RowLabeled>> + Send;

    fn deallocate(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Run plain SQL outside of the preparation layer (schema setup, session reset).
    fn batch_execute(&self, sql: &str) -> impl Future<Output = Result<()>> + Send;
}
