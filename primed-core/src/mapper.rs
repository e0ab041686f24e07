use crate::{
    AsValue, CompiledStatement, Error, PrepareError, Record, Result, RowLabeled, TerminalOp,
};

/// A type that can be built from one result row.
pub trait Entity: Sized {
    fn from_row(row: RowLabeled) -> Result<Self>;
}

impl Entity for RowLabeled {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(row)
    }
}

impl Entity for Record {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(row.into_record())
    }
}

/// Rows shaped by the terminal operation of the statement that produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Rows(Vec<RowLabeled>),
    Row(RowLabeled),
    Optional(Option<RowLabeled>),
    Count(i64),
}

/// Shape `rows` according to `terminal`.
pub fn map_rows(
    statement: &CompiledStatement,
    terminal: TerminalOp,
    mut rows: Vec<RowLabeled>,
) -> Result<Output> {
    Ok(match terminal {
        TerminalOp::FetchAll => Output::Rows(rows),
        TerminalOp::FetchOne => match rows.len() {
            1 => Output::Row(rows.remove(0)),
            0 => return Err(PrepareError::DoesNotExist(statement.key.to_string()).into()),
            count => {
                return Err(PrepareError::MultipleObjectsReturned {
                    statement: statement.key.to_string(),
                    count,
                }
                .into());
            }
        },
        TerminalOp::FetchFirst | TerminalOp::FetchLast => {
            Output::Optional(rows.into_iter().next())
        }
        TerminalOp::Count => {
            let value = rows
                .into_iter()
                .next()
                .and_then(|row| row.values.into_vec().into_iter().next())
                .ok_or_else(|| {
                    Error::msg(format!(
                        "The count statement `{}` returned no value",
                        statement.key
                    ))
                })?;
            Output::Count(i64::try_from_value(value)?)
        }
    })
}

impl Output {
    /// All the rows, a missing optional row is an empty vector.
    pub fn into_rows(self) -> Result<Vec<RowLabeled>> {
        match self {
            Output::Rows(v) => Ok(v),
            Output::Row(v) => Ok(vec![v]),
            Output::Optional(v) => Ok(v.into_iter().collect()),
            Output::Count(..) => Err(Error::msg("A count does not produce rows")),
        }
    }
    pub fn into_records(self) -> Result<Vec<Record>> {
        Ok(self
            .into_rows()?
            .into_iter()
            .map(RowLabeled::into_record)
            .collect())
    }
    pub fn into_entities<E: Entity>(self) -> Result<Vec<E>> {
        self.into_rows()?.into_iter().map(E::from_row).collect()
    }
    /// The single row of a fetch one statement.
    pub fn into_entity<E: Entity>(self) -> Result<E> {
        match self {
            Output::Row(v) => E::from_row(v),
            Output::Optional(Some(v)) => E::from_row(v),
            Output::Optional(None) => Err(Error::msg("The statement returned no row")),
            Output::Rows(mut v) if v.len() == 1 => E::from_row(v.remove(0)),
            Output::Rows(v) => Err(Error::msg(format!(
                "Expected exactly one row, the statement returned {}",
                v.len()
            ))),
            Output::Count(..) => Err(Error::msg("A count does not produce rows")),
        }
    }
    /// The row of a fetch first or fetch last statement, if any.
    pub fn into_optional<E: Entity>(self) -> Result<Option<E>> {
        match self {
            Output::Optional(v) => v.map(E::from_row).transpose(),
            Output::Row(v) => E::from_row(v).map(Some),
            Output::Rows(v) => v.into_iter().next().map(E::from_row).transpose(),
            Output::Count(..) => Err(Error::msg("A count does not produce rows")),
        }
    }
    pub fn into_count(self) -> Result<i64> {
        match self {
            Output::Count(v) => Ok(v),
            _ => Err(Error::msg("The statement is not a count")),
        }
    }
}
