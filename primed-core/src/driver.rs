use crate::SqlWriter;

/// Database backend, it provides the dialect used to compile statements.
pub trait Driver: Send + Sync + 'static {
    type SqlWriter: SqlWriter;

    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;
}
