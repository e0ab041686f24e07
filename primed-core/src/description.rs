use crate::{ColumnRef, Expression, MarkerSet, Ordered, Result, TableRef};
use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
};

/// Read semantics of a statement, they decide how the rows are mapped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalOp {
    #[default]
    FetchAll,
    /// Exactly one row, zero or many rows are an error.
    FetchOne,
    FetchFirst,
    FetchLast,
    Count,
}

impl Display for TerminalOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TerminalOp::FetchAll => "fetch all",
            TerminalOp::FetchOne => "fetch one",
            TerminalOp::FetchFirst => "fetch first",
            TerminalOp::FetchLast => "fetch last",
            TerminalOp::Count => "count",
        })
    }
}

/// Abstract description of a SELECT statement.
///
/// ```rust
/// use primed_core::{QueryDescription, TableRef, col, param, param_list};
/// let query = QueryDescription::select(TableRef::new("trades"))
///     .filter(col("venue").eq(param("venue")).and(col("id").in_list(param_list("ids"))))
///     .order_by([col("id").asc()])
///     .all();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescription {
    pub table: TableRef,
    /// Projection, empty means every column.
    pub columns: Vec<ColumnRef>,
    pub filter: Option<Expression>,
    pub ordering: Vec<Ordered>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub terminal: TerminalOp,
}

impl QueryDescription {
    pub fn select(table: TableRef) -> Self {
        Self {
            table,
            columns: Vec::new(),
            filter: None,
            ordering: Vec::new(),
            limit: None,
            offset: None,
            terminal: TerminalOp::FetchAll,
        }
    }
    /// Project these columns instead of `*`.
    ///
    /// A prepared `SELECT *` keeps the row type it was planned with: after a column is added to
    /// the table, executions in the same session fail until the statement is deallocated.
    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cow<'static, str>>,
    {
        self.columns = columns.into_iter().map(ColumnRef::new).collect();
        self
    }
    /// Add a condition, combined with AND to the previous ones.
    pub fn filter(mut self, condition: Expression) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(previous) => previous.and(condition),
            None => condition,
        });
        self
    }
    pub fn order_by(mut self, ordering: impl IntoIterator<Item = Ordered>) -> Self {
        self.ordering.extend(ordering);
        self
    }
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
    pub fn all(self) -> Self {
        self.terminal(TerminalOp::FetchAll)
    }
    pub fn one(self) -> Self {
        self.terminal(TerminalOp::FetchOne)
    }
    pub fn first(self) -> Self {
        self.terminal(TerminalOp::FetchFirst)
    }
    pub fn last(self) -> Self {
        self.terminal(TerminalOp::FetchLast)
    }
    pub fn count(self) -> Self {
        self.terminal(TerminalOp::Count)
    }
    pub fn terminal(mut self, terminal: TerminalOp) -> Self {
        self.terminal = terminal;
        self
    }

    /// Placeholders of the filter and of the ordering.
    pub fn markers(&self) -> Result<MarkerSet> {
        MarkerSet::from_expressions(
            self.filter
                .iter()
                .chain(self.ordering.iter().map(|v| &v.expression)),
        )
    }
}

/// SQL text with `%s` or `%(name)s` markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSql {
    pub sql: Cow<'static, str>,
    pub terminal: TerminalOp,
}

impl RawSql {
    pub fn new(sql: impl Into<Cow<'static, str>>) -> Self {
        Self {
            sql: sql.into(),
            terminal: TerminalOp::FetchAll,
        }
    }
    pub fn terminal(mut self, terminal: TerminalOp) -> Self {
        self.terminal = terminal;
        self
    }
}

/// What a registered statement is compiled from.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementSource {
    Query(QueryDescription),
    Sql(RawSql),
}

impl StatementSource {
    pub fn terminal(&self) -> TerminalOp {
        match self {
            StatementSource::Query(v) => v.terminal,
            StatementSource::Sql(v) => v.terminal,
        }
    }
}

impl From<QueryDescription> for StatementSource {
    fn from(value: QueryDescription) -> Self {
        StatementSource::Query(value)
    }
}

impl From<RawSql> for StatementSource {
    fn from(value: RawSql) -> Self {
        StatementSource::Sql(value)
    }
}
