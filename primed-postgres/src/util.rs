use crate::ValueHolder;
use async_stream::try_stream;
use primed_core::{
    DbError, DbErrorKind, Error, RowLabeled, RowNames,
    stream::{Stream, StreamExt},
};
use std::pin::pin;

/// Classify a Postgres failure by its SQLSTATE.
pub(crate) fn error_kind(code: &str) -> DbErrorKind {
    match code {
        // invalid_sql_statement_name: the prepared statement is gone
        "26000" => DbErrorKind::SessionLost,
        // duplicate_prepared_statement
        "42P05" => DbErrorKind::AlreadyPrepared,
        // undefined_table, undefined_column, undefined_object, invalid_schema_name
        "42P01" | "42703" | "42704" | "3F000" => DbErrorKind::UndefinedObject,
        // syntax error or access rule violation
        c if c.starts_with("42") => DbErrorKind::InvalidStatement,
        _ => DbErrorKind::Other,
    }
}

/// Wrap a driver error, attaching the classified [`DbError`].
pub(crate) fn wrap_error(error: tokio_postgres::Error) -> Error {
    let db_error = match error.as_db_error() {
        Some(e) => DbError::new(error_kind(e.code().code()), e.message()).with_code(e.code().code()),
        None => DbError::new(DbErrorKind::Other, error.to_string()),
    };
    Error::new(error).context(db_error)
}

pub(crate) fn row_to_primed_row(row: tokio_postgres::Row) -> primed_core::Result<primed_core::Row> {
    (0..row.len())
        .map(|i| match row.try_get::<_, ValueHolder>(i) {
            Ok(v) => Ok(v.0),
            Err(..) => {
                let col = &row.columns()[i];
                Err(Error::msg(format!(
                    "Could not deserialize column {} `{}`: {}",
                    i,
                    col.name(),
                    col.type_()
                )))
            }
        })
        .collect::<primed_core::Result<primed_core::Row>>()
}

pub(crate) fn stream_postgres_row_to_primed_row<V>(
    stream: impl AsyncFnOnce() -> primed_core::Result<V>,
) -> impl Stream<Item = primed_core::Result<RowLabeled>>
where
    V: Stream<Item = Result<tokio_postgres::Row, tokio_postgres::Error>>,
{
    try_stream! {
        let stream = stream().await?;
        let mut stream = pin!(stream);
        let mut labels: Option<RowNames> = None;
        while let Some(row) = stream.next().await.transpose().map_err(wrap_error)? {
            let labels = labels.get_or_insert_with(|| {
                row.columns().iter().map(|c| c.name().to_string()).collect()
            });
            yield RowLabeled {
                labels: labels.clone(),
                values: row_to_primed_row(row)?,
            };
        }
    }
}
