use crate::Error;
use std::fmt::{self, Display, Formatter};

/// Failures raised by this crate while declaring, compiling, preparing or mapping statements.
///
/// They travel inside [`crate::Error`] like every other error, use [`PrepareError::find`] to
/// recover the variant from an error chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrepareError {
    #[error("Placeholder `{0}` appears more than once, all the placeholders in a query must have unique names")]
    DuplicatePlaceholder(String),
    #[error("No value was supplied for the placeholder `{0}`")]
    UnresolvedPlaceholder(String),
    #[error("Invalid placeholder name `{0}`, use only ascii letters, digits, `_` and `-`")]
    InvalidPlaceholder(String),
    #[error("Cannot mix named and positional placeholders in the statement `{0}`")]
    MixedPlaceholders(String),
    #[error("The placeholder `{name}` expects {expected}")]
    MismatchedArgument { name: String, expected: &'static str },
    #[error("The statement `{0}` needs a declared ordering to fetch the last row")]
    AmbiguousOrdering(String),
    #[error("The schema is not ready for the statement `{statement}`: {message}")]
    SchemaNotReady { statement: String, message: String },
    #[error("The statement `{statement}` is invalid: {message}")]
    StatementInvalid { statement: String, message: String },
    #[error("The statement `{0}` matching query does not exist")]
    DoesNotExist(String),
    #[error("The statement `{statement}` expected one row but it returned {count}")]
    MultipleObjectsReturned { statement: String, count: usize },
    #[error("The statement `{0}` has not been registered")]
    StatementNotRegistered(String),
    #[error("The statement `{0}` has already been registered")]
    StatementAlreadyRegistered(String),
}

impl PrepareError {
    /// Find the first `PrepareError` in the chain of `error`.
    pub fn find(error: &Error) -> Option<&PrepareError> {
        error
            .downcast_ref::<PrepareError>()
            .or_else(|| error.chain().find_map(|e| e.downcast_ref::<PrepareError>()))
    }
}

/// Class of a failure reported by the database engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbErrorKind {
    /// A statement with the same name already exists in the session.
    AlreadyPrepared,
    /// The prepared statement does not exist, the session was reset underneath.
    SessionLost,
    /// A relation, column or type referenced by the statement does not exist.
    UndefinedObject,
    /// The statement text cannot be planned (syntax, type mismatch, ...).
    InvalidStatement,
    Other,
}

/// Engine failure as reported by a [`crate::Session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbError {
    pub kind: DbErrorKind,
    /// Engine specific error code (SQLSTATE for Postgres).
    pub code: Option<String>,
    pub message: String,
}

impl DbError {
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
    /// Find the first `DbError` in the chain of `error`.
    pub fn find(error: &Error) -> Option<&DbError> {
        error
            .downcast_ref::<DbError>()
            .or_else(|| error.chain().find_map(|e| e.downcast_ref::<DbError>()))
    }
    /// Kind of the first `DbError` in the chain of `error`, `Other` when there is none.
    pub fn kind_of(error: &Error) -> DbErrorKind {
        Self::find(error).map_or(DbErrorKind::Other, |e| e.kind)
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "{} (code {})", self.message, code)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for DbError {}
