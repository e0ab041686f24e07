use crate::{
    Arguments, Catalog, CompiledStatement, DbError, DbErrorKind, EagerReport, Entity, Output,
    PrepareConfig, Result, RowLabeled, Session, StatementRegistry, map_rows,
};
use futures::TryStreamExt;
use std::sync::Arc;

/// How many times an execution is prepared again after the session lost its statements.
pub const SESSION_RETRY_LIMIT: usize = 1;

/// A session together with the statements prepared in it.
///
/// Executions on one `PreparedSession` are expected to be serialized by the caller, as the
/// underlying database session is.
pub struct PreparedSession<S: Session> {
    session: S,
    catalog: Arc<Catalog<S::Driver>>,
    registry: StatementRegistry,
    config: PrepareConfig,
}

impl<S: Session> PreparedSession<S> {
    pub fn new(session: S, catalog: Arc<Catalog<S::Driver>>) -> Self {
        let config = session.config();
        Self {
            session,
            catalog,
            registry: StatementRegistry::new(),
            config,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }
    pub fn catalog(&self) -> &Arc<Catalog<S::Driver>> {
        &self.catalog
    }
    pub fn registry(&self) -> &StatementRegistry {
        &self.registry
    }
    pub fn config(&self) -> &PrepareConfig {
        &self.config
    }

    /// Run the registered statement `name` and shape its rows by the terminal operation.
    pub async fn execute(&self, name: &str, arguments: &Arguments) -> Result<Output> {
        let statement = self.catalog.resolve(name, arguments, &self.config)?;
        let params = statement.bind(arguments)?;
        let rows = self.run(&statement, &params).await?;
        map_rows(&statement, statement.terminal, rows)
    }

    async fn run(
        &self,
        statement: &CompiledStatement,
        params: &[crate::Value],
    ) -> Result<Vec<RowLabeled>> {
        let mut retries = 0;
        loop {
            self.registry
                .ensure_prepared(&self.session, statement)
                .await?;
            log::debug!(
                "Executing `{}` in {} with {} parameters",
                statement.prepared_name,
                self.session.id(),
                params.len()
            );
            let result = self
                .session
                .execute(&statement.prepared_name, params)
                .try_collect::<Vec<_>>()
                .await;
            match result {
                Err(e)
                    if DbError::kind_of(&e) == DbErrorKind::SessionLost
                        && retries < SESSION_RETRY_LIMIT =>
                {
                    retries += 1;
                    log::warn!(
                        "The statement `{}` is missing from {}, preparing it again: {:#}",
                        statement.key,
                        self.session.id(),
                        e
                    );
                    self.registry.invalidate();
                }
                result => return result,
            }
        }
    }

    pub async fn fetch_all<E: Entity>(&self, name: &str, arguments: &Arguments) -> Result<Vec<E>> {
        self.execute(name, arguments).await?.into_entities()
    }
    pub async fn fetch_one<E: Entity>(&self, name: &str, arguments: &Arguments) -> Result<E> {
        self.execute(name, arguments).await?.into_entity()
    }
    pub async fn fetch_optional<E: Entity>(
        &self,
        name: &str,
        arguments: &Arguments,
    ) -> Result<Option<E>> {
        self.execute(name, arguments).await?.into_optional()
    }
    pub async fn count(&self, name: &str, arguments: &Arguments) -> Result<i64> {
        self.execute(name, arguments).await?.into_count()
    }

    /// Application ready signal, prepares the startup statements when `prepare_on_start` is set.
    pub async fn ready(&self) -> Option<EagerReport> {
        if !self.config.prepare_on_start {
            log::debug!("Skipping eager preparation in {}", self.session.id());
            return None;
        }
        Some(self.prepare_eagerly().await)
    }

    /// Prepare every startup statement of the catalog, see [`Catalog::startup_keys`].
    pub async fn prepare_eagerly(&self) -> EagerReport {
        self.registry
            .prepare_eagerly(&self.session, &self.catalog, self.catalog.startup_keys())
            .await
    }

    /// Forget the prepared statements, for example after the session was reset.
    pub fn invalidate(&self) {
        self.registry.invalidate();
    }

    pub async fn deallocate_all(&self) {
        self.registry.deallocate_all(&self.session).await
    }

    pub fn into_session(self) -> S {
        self.session
    }
}
