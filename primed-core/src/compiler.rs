use crate::{
    Arguments, CardinalitySignature, Context, Error, Fragment, Marker, MarkerName, MarkerSet,
    ParameterSlot, PlaceholderKind, PrepareError, QueryDescription, RawSegment, RawSql, Result,
    SqlWriter, StatementSource, TerminalOp, Value, bind_slots, statement_identifier,
};
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    sync::Arc,
};

/// Identity of one compiled variant: logical name plus list cardinalities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatementKey {
    pub name: Arc<str>,
    pub signature: CardinalitySignature,
}

impl StatementKey {
    pub fn new(name: impl Into<Arc<str>>, signature: CardinalitySignature) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }
}

impl Display for StatementKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.signature)
    }
}

/// Canonical SQL of one variant together with its parameter layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStatement {
    pub key: StatementKey,
    /// SQL with `$n` parameters, without trailing semicolon.
    pub sql: String,
    pub slots: Vec<ParameterSlot>,
    pub terminal: TerminalOp,
    /// Session level name used with `PREPARE` / `EXECUTE`.
    pub prepared_name: String,
}

impl CompiledStatement {
    /// Values of `arguments` in parameter order.
    pub fn bind(&self, arguments: &Arguments) -> Result<Vec<Value>> {
        bind_slots(&self.slots, arguments)
    }
    pub fn parameter_count(&self) -> usize {
        self.slots.len()
    }
}

/// Split raw SQL into text and markers.
///
/// `%s` is a positional marker, `%(name)s` a named one and `%%` a literal percent sign. Text
/// between single or double quotes is copied untouched.
pub fn scan_raw_sql(sql: &str) -> Result<(Vec<RawSegment<'_>>, MarkerSet)> {
    let mut segments = Vec::new();
    let mut positional = 0;
    let mut named = BTreeSet::new();
    let mut start = 0;
    let mut quote = None;
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                i += 1;
                continue;
            }
            None if c == b'\'' || c == b'"' => {
                quote = Some(c);
                i += 1;
                continue;
            }
            None if c != b'%' => {
                i += 1;
                continue;
            }
            None => {}
        }
        segments.push(RawSegment::Text(&sql[start..i]));
        match bytes.get(i + 1) {
            Some(b'%') => {
                segments.push(RawSegment::Text("%"));
                i += 2;
            }
            Some(b's') => {
                segments.push(RawSegment::Marker(MarkerName::Positional(positional)));
                positional += 1;
                i += 2;
            }
            Some(b'(') => {
                let rest = &sql[i + 2..];
                let Some(end) = rest.find(")s") else {
                    return Err(PrepareError::InvalidPlaceholder(
                        rest.chars().take(32).collect(),
                    )
                    .into());
                };
                let name: Arc<str> = Arc::from(&rest[..end]);
                named.insert(name.clone());
                segments.push(RawSegment::Marker(MarkerName::Named(name)));
                i += 2 + end + 2;
            }
            _ => {
                return Err(PrepareError::InvalidPlaceholder(
                    sql[i..].chars().take(2).collect(),
                )
                .into());
            }
        }
        start = i;
    }
    if quote.is_some() {
        return Err(Error::msg("Unterminated quoted text"));
    }
    segments.push(RawSegment::Text(&sql[start..]));
    segments.retain(|v| *v != RawSegment::Text(""));
    if positional > 0 && !named.is_empty() {
        return Err(PrepareError::MixedPlaceholders(truncate_sql(sql)).into());
    }
    let markers = MarkerSet::new(
        (0..positional)
            .map(MarkerName::Positional)
            .chain(named.into_iter().map(MarkerName::Named))
            .map(|name| Marker {
                name,
                kind: PlaceholderKind::Scalar,
            }),
    )?;
    Ok((segments, markers))
}

fn truncate_sql(sql: &str) -> String {
    format!("{}", crate::truncate_long!(sql))
}

/// Markers of a statement source, collected once when it is registered.
pub fn source_markers(source: &StatementSource) -> Result<MarkerSet> {
    match source {
        StatementSource::Query(query) => query.markers(),
        StatementSource::Sql(raw) => scan_raw_sql(raw.sql.trim_end().trim_end_matches(';'))
            .map(|(_, markers)| markers),
    }
}

/// Render the variant `signature` of the statement `name`.
///
/// Pure function, the result depends only on its inputs.
pub fn compile(
    writer: &dyn SqlWriter,
    name: &str,
    source: &StatementSource,
    markers: &MarkerSet,
    signature: CardinalitySignature,
) -> Result<CompiledStatement> {
    let slots = markers.resolve(&signature)?;
    let mut sql = String::with_capacity(256);
    let terminal = source.terminal();
    match source {
        StatementSource::Query(query) => {
            let query = terminal_query(name, query)?;
            let mut context = Context::new(Fragment::SqlSelect, &slots);
            writer.write_select(&mut context, &mut sql, &query);
            if context.counter as usize != slots.len() {
                return Err(Error::msg(format!(
                    "The statement `{}` wrote {} parameters, expected {}",
                    name,
                    context.counter,
                    slots.len()
                )));
            }
        }
        StatementSource::Sql(raw) => compile_raw(writer, name, raw, &slots, &mut sql)?,
    }
    let prepared_name = statement_identifier(name, &sql);
    log::debug!(
        "Compiled `{}{}` as `{}`:\n{}",
        name,
        signature,
        prepared_name,
        crate::truncate_long!(sql)
    );
    Ok(CompiledStatement {
        key: StatementKey::new(name, signature),
        sql,
        slots,
        terminal,
        prepared_name,
    })
}

/// Apply the ordering and limit implied by the terminal operation.
fn terminal_query(name: &str, query: &QueryDescription) -> Result<QueryDescription> {
    let mut query = query.clone();
    match query.terminal {
        TerminalOp::FetchFirst => {
            if query.ordering.is_empty() {
                query.ordering = query
                    .table
                    .primary_key
                    .iter()
                    .map(|v| crate::col(v.clone()).asc())
                    .collect();
            }
            query.limit = Some(query.limit.map_or(1, |v| v.min(1)));
        }
        TerminalOp::FetchLast => {
            if query.ordering.is_empty() {
                return Err(PrepareError::AmbiguousOrdering(name.into()).into());
            }
            if query.limit.is_some() || query.offset.is_some() {
                return Err(PrepareError::StatementInvalid {
                    statement: name.into(),
                    message: "fetch last cannot reverse a query with limit or offset".into(),
                }
                .into());
            }
            query.ordering = query.ordering.iter().map(|v| v.reversed()).collect();
            query.limit = Some(1);
        }
        _ => {}
    }
    Ok(query)
}

fn compile_raw(
    writer: &dyn SqlWriter,
    name: &str,
    raw: &RawSql,
    slots: &[ParameterSlot],
    out: &mut String,
) -> Result<()> {
    let text = raw.sql.trim().trim_end_matches(';').trim_end();
    let (segments, _) = scan_raw_sql(text)?;
    let mut context = Context::new(Fragment::SqlSelect, slots);
    match raw.terminal {
        TerminalOp::FetchLast => {
            return Err(PrepareError::AmbiguousOrdering(name.into()).into());
        }
        TerminalOp::Count => {
            out.push_str("SELECT COUNT(*)\nFROM (");
            writer.write_raw_sql(&mut context, out, &segments);
            out.push_str(") AS ");
            writer.write_identifier_quoted(&mut context, out, "counted");
        }
        TerminalOp::FetchFirst => {
            out.push_str("SELECT *\nFROM (");
            writer.write_raw_sql(&mut context, out, &segments);
            out.push_str(") AS ");
            writer.write_identifier_quoted(&mut context, out, "first");
            out.push_str("\nLIMIT 1");
        }
        _ => writer.write_raw_sql(&mut context, out, &segments),
    }
    Ok(())
}
