use crate::{Error, Expression, PrepareConfig, PrepareError, Result, Value};
use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt::{self, Display, Formatter, Write},
    sync::Arc,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlaceholderKind {
    Scalar,
    /// Bound to a list, its length is known only at execution time.
    List,
}

/// A named slot inside a predicate tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: Cow<'static, str>,
    pub kind: PlaceholderKind,
}

impl Placeholder {
    pub fn scalar(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            kind: PlaceholderKind::Scalar,
        }
    }
    pub fn list(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            kind: PlaceholderKind::List,
        }
    }
    pub fn is_list(&self) -> bool {
        self.kind == PlaceholderKind::List
    }
}

/// Identity of a marker within one statement.
///
/// Positional markers sort before named ones, named ones sort lexicographically. This order is
/// the parameter order of the compiled statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerName {
    /// Zero based index of a `%s` marker in raw SQL.
    Positional(u32),
    Named(Arc<str>),
}

impl Display for MarkerName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MarkerName::Positional(i) => write!(f, "#{}", i + 1),
            MarkerName::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub name: MarkerName,
    pub kind: PlaceholderKind,
}

/// Where the value of a parameter slot comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotSource {
    Scalar,
    /// Element `n` of a list marker.
    ListItem(u32),
    /// The whole list bound as one array parameter.
    ListArray,
}

/// One positional parameter (`$position`) of a compiled statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSlot {
    /// One based, as in the SQL text.
    pub position: u32,
    pub marker: MarkerName,
    pub source: SlotSource,
}

/// How a list marker is rendered for one compiled variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cardinality {
    /// Expanded into this many consecutive slots.
    Expanded(u32),
    /// Bound as a single array slot.
    Array,
}

/// Cardinality of every list marker of a statement, in marker order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardinalitySignature(pub Vec<Cardinality>);

impl CardinalitySignature {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for CardinalitySignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_char('[')?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(',')?;
            }
            match v {
                Cardinality::Expanded(n) => write!(f, "{}", n)?,
                Cardinality::Array => f.write_char('*')?,
            }
        }
        f.write_char(']')
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(PrepareError::InvalidPlaceholder(name.into()).into());
    }
    Ok(())
}

/// The markers of one statement, unique and sorted in parameter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSet(Vec<Marker>);

impl MarkerSet {
    /// Collect the markers, failing on duplicated names.
    pub fn new(markers: impl IntoIterator<Item = Marker>) -> Result<Self> {
        let mut markers = markers.into_iter().collect::<Vec<_>>();
        for marker in &markers {
            if let MarkerName::Named(name) = &marker.name {
                check_name(name)?;
            }
        }
        markers.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(w) = markers.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(PrepareError::DuplicatePlaceholder(w[0].name.to_string()).into());
        }
        Ok(Self(markers))
    }

    /// Collect the placeholders of predicate trees. The result does not depend on the order of
    /// the clauses.
    pub fn from_expressions<'a>(expressions: impl IntoIterator<Item = &'a Expression>) -> Result<Self> {
        let mut markers = Vec::new();
        for expression in expressions {
            expression.for_each_placeholder(&mut |p| {
                markers.push(Marker {
                    name: MarkerName::Named(Arc::from(p.name.as_ref())),
                    kind: p.kind,
                })
            });
        }
        Self::new(markers)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Marker> {
        self.0.iter()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn has_lists(&self) -> bool {
        self.0.iter().any(|m| m.kind == PlaceholderKind::List)
    }

    /// The signature of the variant that can hold `arguments`.
    pub fn signature(
        &self,
        arguments: &Arguments,
        config: &PrepareConfig,
    ) -> Result<CardinalitySignature> {
        self.0
            .iter()
            .filter(|m| m.kind == PlaceholderKind::List)
            .map(|marker| {
                let value = arguments
                    .get(&marker.name)
                    .ok_or_else(|| PrepareError::UnresolvedPlaceholder(marker.name.to_string()))?;
                let len = match value {
                    Value::List(Some(v), ..) => v.len(),
                    Value::List(None, ..) | Value::Null => 0,
                    _ => {
                        return Err(PrepareError::MismatchedArgument {
                            name: marker.name.to_string(),
                            expected: "a list",
                        }
                        .into());
                    }
                };
                Ok(if len > config.list_expansion_limit as usize {
                    Cardinality::Array
                } else {
                    Cardinality::Expanded(len as u32)
                })
            })
            .collect::<Result<_>>()
            .map(CardinalitySignature)
    }

    /// Assign the positional slots for the variant described by `signature`.
    pub fn resolve(&self, signature: &CardinalitySignature) -> Result<Vec<ParameterSlot>> {
        let mut lists = signature.0.iter();
        let mut slots = Vec::with_capacity(self.0.len());
        let mut position = 1;
        let mut push = |marker: &MarkerName, source| {
            slots.push(ParameterSlot {
                position,
                marker: marker.clone(),
                source,
            });
            position += 1;
        };
        for marker in &self.0 {
            match marker.kind {
                PlaceholderKind::Scalar => push(&marker.name, SlotSource::Scalar),
                PlaceholderKind::List => match lists.next() {
                    Some(Cardinality::Expanded(n)) => {
                        for i in 0..*n {
                            push(&marker.name, SlotSource::ListItem(i));
                        }
                    }
                    Some(Cardinality::Array) => push(&marker.name, SlotSource::ListArray),
                    None => {
                        return Err(Error::msg(format!(
                            "The signature {} does not cover the list placeholder `{}`",
                            signature, marker.name
                        )));
                    }
                },
            }
        }
        if lists.next().is_some() {
            return Err(Error::msg(format!(
                "The signature {} has more entries than the list placeholders",
                signature
            )));
        }
        Ok(slots)
    }
}

/// Runtime values for the markers of one execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    positional: Vec<Value>,
    named: BTreeMap<Arc<str>, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: Default::default(),
        }
    }
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.named.insert(Arc::from(name), value.into());
        self
    }
    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.positional.push(value.into());
        self
    }
    pub fn get(&self, marker: &MarkerName) -> Option<&Value> {
        match marker {
            MarkerName::Positional(i) => self.positional.get(*i as usize),
            MarkerName::Named(name) => self.named.get(name),
        }
    }
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

/// Build named [`Arguments`]: `args! { "id" => 1, "ids" => vec![1, 2] }`.
#[macro_export]
macro_rules! args {
    () => { $crate::Arguments::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut arguments = $crate::Arguments::new();
        $(arguments.set($name, $value);)+
        arguments
    }};
}

/// Values of `arguments` in the order of `slots`.
pub fn bind_slots(slots: &[ParameterSlot], arguments: &Arguments) -> Result<Vec<Value>> {
    slots
        .iter()
        .map(|slot| {
            let value = arguments
                .get(&slot.marker)
                .ok_or_else(|| PrepareError::UnresolvedPlaceholder(slot.marker.to_string()))?;
            Ok(match slot.source {
                SlotSource::Scalar | SlotSource::ListArray => value.clone(),
                SlotSource::ListItem(i) => value
                    .as_list()
                    .and_then(|v| v.get(i as usize))
                    .cloned()
                    .ok_or_else(|| PrepareError::MismatchedArgument {
                        name: slot.marker.to_string(),
                        expected: "a list covering every expanded slot",
                    })?,
            })
        })
        .collect()
}
