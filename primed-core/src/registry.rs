use crate::{
    Catalog, CompiledStatement, DbError, DbErrorKind, Error, PrepareError, Result, Session,
    SessionId, StatementKey, truncate_long,
};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

/// Preparation state of one statement variant inside one session.
struct PrepareSlot {
    prepared_name: String,
    prepared: AtomicBool,
    /// Completed PREPARE round trips, successful or not.
    attempts: AtomicU64,
    /// Held for the whole PREPARE round trip, callers arriving meanwhile wait on it.
    failure: tokio::sync::Mutex<Option<Failure>>,
}

/// Outcome of the last failed PREPARE, shared with the callers that waited for it.
#[derive(Debug, Clone)]
struct Failure {
    error: Option<PrepareError>,
    message: String,
}

impl Failure {
    fn new(error: &Error) -> Self {
        Self {
            error: PrepareError::find(error).cloned(),
            message: format!("{:#}", error),
        }
    }
    fn is_fatal(&self) -> bool {
        matches!(self.error, Some(PrepareError::StatementInvalid { .. }))
    }
    fn to_error(&self) -> Error {
        match &self.error {
            Some(e) => e.clone().into(),
            None => Error::msg(self.message.clone()),
        }
    }
}

impl PrepareSlot {
    fn new(prepared_name: String) -> Self {
        Self {
            prepared_name,
            prepared: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
            failure: tokio::sync::Mutex::new(None),
        }
    }
}

#[derive(Default)]
struct RegistryState {
    session: Option<SessionId>,
    slots: HashMap<StatementKey, Arc<PrepareSlot>>,
}

/// Outcome of [`StatementRegistry::prepare_eagerly`].
#[derive(Debug, Default)]
pub struct EagerReport {
    pub prepared: Vec<StatementKey>,
    /// Statements that will be prepared again on first use, with the reason.
    pub deferred: Vec<(StatementKey, Error)>,
}

impl EagerReport {
    pub fn is_complete(&self) -> bool {
        self.deferred.is_empty()
    }
}

/// Prepared statements of one database session.
///
/// Preparation is idempotent and coalesced: concurrent requests for the same key result in a
/// single PREPARE round trip, the other callers share its outcome.
#[derive(Default)]
pub struct StatementRegistry {
    state: Mutex<RegistryState>,
}

impl StatementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, session: SessionId, statement: &CompiledStatement) -> Arc<PrepareSlot> {
        let mut state = self.state.lock();
        if state.session != Some(session) {
            if let Some(previous) = state.session {
                log::debug!(
                    "Session changed from {} to {}, forgetting {} prepared statements",
                    previous,
                    session,
                    state.slots.len()
                );
            }
            state.slots.clear();
            state.session = Some(session);
        }
        state
            .slots
            .entry(statement.key.clone())
            .or_insert_with(|| Arc::new(PrepareSlot::new(statement.prepared_name.clone())))
            .clone()
    }

    /// Make sure `statement` is prepared in `session`, preparing it when needed.
    pub async fn ensure_prepared<S: Session>(
        &self,
        session: &S,
        statement: &CompiledStatement,
    ) -> Result<()> {
        let slot = self.slot(session.id(), statement);
        if slot.prepared.load(Ordering::Acquire) {
            return Ok(());
        }
        let seen = slot.attempts.load(Ordering::Acquire);
        let mut failure = slot.failure.lock().await;
        if slot.prepared.load(Ordering::Acquire) {
            return Ok(());
        }
        if let Some(previous) = &*failure
            && (previous.is_fatal() || slot.attempts.load(Ordering::Acquire) != seen)
        {
            return Err(previous.to_error());
        }
        log::debug!(
            "Preparing `{}` as `{}` in {}:\n{}",
            statement.key,
            statement.prepared_name,
            session.id(),
            truncate_long!(statement.sql)
        );
        let result = session
            .prepare(&statement.prepared_name, &statement.sql)
            .await;
        let result = match result {
            Ok(()) => Ok(()),
            Err(e) => classify(statement, e),
        };
        match &result {
            Ok(()) => {
                *failure = None;
                slot.prepared.store(true, Ordering::Release);
            }
            Err(e) => *failure = Some(Failure::new(e)),
        }
        slot.attempts.fetch_add(1, Ordering::AcqRel);
        result
    }

    pub fn is_prepared(&self, key: &StatementKey) -> bool {
        self.state
            .lock()
            .slots
            .get(key)
            .is_some_and(|v| v.prepared.load(Ordering::Acquire))
    }

    /// Keys confirmed prepared in the current session.
    pub fn prepared_keys(&self) -> Vec<StatementKey> {
        let mut result = self
            .state
            .lock()
            .slots
            .iter()
            .filter(|(_, v)| v.prepared.load(Ordering::Acquire))
            .map(|(k, _)| k.clone())
            .collect::<Vec<_>>();
        result.sort();
        result
    }

    /// Forget every statement, the session was replaced or reset.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        log::debug!(
            "Invalidating {} statements of {}",
            state.slots.len(),
            state
                .session
                .map_or_else(|| "no session".to_string(), |v| v.to_string())
        );
        state.slots.clear();
    }

    /// Prepare `keys` in bulk. Failures never abort the batch, they are logged and left for the
    /// first real use of each statement.
    pub async fn prepare_eagerly<S: Session>(
        &self,
        session: &S,
        catalog: &Catalog<S::Driver>,
        keys: impl IntoIterator<Item = StatementKey>,
    ) -> EagerReport {
        let mut report = EagerReport::default();
        for key in keys {
            let result = match catalog.compiled(&key) {
                Ok(statement) => self.ensure_prepared(session, &statement).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => report.prepared.push(key),
                Err(e) => {
                    log::warn!(
                        "Could not prepare `{}` in {}, it will be prepared on first use: {:#}",
                        key,
                        session.id(),
                        e
                    );
                    report.deferred.push((key, e));
                }
            }
        }
        log::debug!(
            "Prepared {} statements in {}, deferred {}",
            report.prepared.len(),
            session.id(),
            report.deferred.len()
        );
        report
    }

    /// Drop `key` from the session. Engine failures are logged and ignored.
    pub async fn deallocate<S: Session>(&self, session: &S, key: &StatementKey) {
        let slot = self.state.lock().slots.remove(key);
        if let Some(slot) = slot {
            deallocate_slot(session, key, &slot).await;
        }
    }

    /// Drop every prepared statement of the session.
    pub async fn deallocate_all<S: Session>(&self, session: &S) {
        let slots = self.state.lock().slots.drain().collect::<Vec<_>>();
        for (key, slot) in slots {
            deallocate_slot(session, &key, &slot).await;
        }
    }
}

async fn deallocate_slot<S: Session>(session: &S, key: &StatementKey, slot: &PrepareSlot) {
    if !slot.prepared.load(Ordering::Acquire) {
        return;
    }
    if let Err(e) = session.deallocate(&slot.prepared_name).await {
        log::warn!(
            "Could not deallocate `{}` ({}) in {}: {:#}",
            key,
            slot.prepared_name,
            session.id(),
            e
        );
    }
}

/// Map a failed PREPARE to the preparation taxonomy.
fn classify(statement: &CompiledStatement, error: Error) -> Result<()> {
    let statement_name = statement.key.to_string();
    match DbError::kind_of(&error) {
        DbErrorKind::AlreadyPrepared => {
            log::debug!(
                "`{}` was already prepared as `{}`",
                statement_name,
                statement.prepared_name
            );
            Ok(())
        }
        DbErrorKind::UndefinedObject => {
            let message = format!("{}", error);
            Err(error.context(PrepareError::SchemaNotReady {
                statement: statement_name,
                message,
            }))
        }
        DbErrorKind::InvalidStatement => {
            let message = format!("{}", error);
            Err(error.context(PrepareError::StatementInvalid {
                statement: statement_name,
                message,
            }))
        }
        _ => Err(error.context(format!(
            "While preparing `{}` as `{}`",
            statement_name, statement.prepared_name
        ))),
    }
}
