use crate::{
    Arguments, CardinalitySignature, CompiledStatement, Driver, MarkerSet, PrepareConfig,
    PrepareError, Result, SqlWriter, StatementKey, StatementSource, compile, source_markers,
};
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

/// A registered statement: its source and the markers collected from it.
#[derive(Debug, Clone)]
pub struct StatementDefinition {
    pub name: Arc<str>,
    pub source: StatementSource,
    pub markers: MarkerSet,
}

/// Process wide statement definitions and compiled variants.
///
/// Shared by every session of the same driver, compiled statements are built once per key and
/// never change afterwards.
pub struct Catalog<D: Driver> {
    writer: D::SqlWriter,
    definitions: RwLock<BTreeMap<Arc<str>, Arc<StatementDefinition>>>,
    compiled: RwLock<HashMap<StatementKey, Arc<CompiledStatement>>>,
}

impl<D: Driver> Catalog<D> {
    pub fn new(driver: &D) -> Self {
        Self {
            writer: driver.sql_writer(),
            definitions: Default::default(),
            compiled: Default::default(),
        }
    }

    /// Declare the statement `name`, its placeholders are validated immediately.
    pub fn register(&self, name: &str, source: impl Into<StatementSource>) -> Result<()> {
        let source = source.into();
        let mut definitions = self.definitions.write();
        if definitions.contains_key(name) {
            return Err(PrepareError::StatementAlreadyRegistered(name.into()).into());
        }
        let markers = source_markers(&source)?;
        let name: Arc<str> = Arc::from(name);
        log::debug!(
            "Registered statement `{}` ({}, {} placeholders)",
            name,
            source.terminal(),
            markers.len()
        );
        definitions.insert(
            name.clone(),
            Arc::new(StatementDefinition {
                name,
                source,
                markers,
            }),
        );
        Ok(())
    }

    pub fn definition(&self, name: &str) -> Result<Arc<StatementDefinition>> {
        self.definitions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PrepareError::StatementNotRegistered(name.into()).into())
    }

    pub fn names(&self) -> Vec<Arc<str>> {
        self.definitions.read().keys().cloned().collect()
    }

    /// Key of the variant able to hold `arguments`.
    pub fn key(
        &self,
        name: &str,
        arguments: &Arguments,
        config: &PrepareConfig,
    ) -> Result<StatementKey> {
        let definition = self.definition(name)?;
        let signature = definition.markers.signature(arguments, config)?;
        Ok(StatementKey::new(definition.name.clone(), signature))
    }

    /// Look up the variant `key`, compiling it the first time it is requested.
    pub fn compiled(&self, key: &StatementKey) -> Result<Arc<CompiledStatement>> {
        if let Some(compiled) = self.compiled.read().get(key) {
            return Ok(compiled.clone());
        }
        let definition = self.definition(&key.name)?;
        let mut cache = self.compiled.write();
        if let Some(compiled) = cache.get(key) {
            return Ok(compiled.clone());
        }
        let compiled = Arc::new(compile(
            self.writer.as_dyn(),
            &definition.name,
            &definition.source,
            &definition.markers,
            key.signature.clone(),
        )?);
        cache.insert(key.clone(), compiled.clone());
        Ok(compiled)
    }

    /// Shorthand for [`Catalog::key`] followed by [`Catalog::compiled`].
    pub fn resolve(
        &self,
        name: &str,
        arguments: &Arguments,
        config: &PrepareConfig,
    ) -> Result<Arc<CompiledStatement>> {
        self.compiled(&self.key(name, arguments, config)?)
    }

    /// Keys worth preparing when a session starts: statements without list placeholders and
    /// every variant compiled so far.
    pub fn startup_keys(&self) -> Vec<StatementKey> {
        let mut result = self
            .definitions
            .read()
            .values()
            .filter(|v| !v.markers.has_lists())
            .map(|v| StatementKey::new(v.name.clone(), CardinalitySignature::default()))
            .collect::<Vec<_>>();
        result.extend(
            self.compiled
                .read()
                .keys()
                .filter(|k| !k.signature.is_empty())
                .cloned(),
        );
        result.sort();
        result.dedup();
        result
    }

    pub fn compiled_count(&self) -> usize {
        self.compiled.read().len()
    }

    pub fn sql_writer(&self) -> &D::SqlWriter {
        &self.writer
    }
}
