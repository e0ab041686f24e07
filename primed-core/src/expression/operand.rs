use crate::{ColumnRef, OpPrecedence, Placeholder, SqlWriter, Value};
use std::borrow::Cow;

/// Leaf of a predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Null,
    LitBool(bool),
    LitInt(i64),
    LitFloat(f64),
    LitStr(Cow<'static, str>),
    Column(ColumnRef),
    /// A value fixed when the statement is declared, rendered inline as a literal.
    Variable(Value),
    /// A slot bound at execution time.
    Placeholder(Placeholder),
    Asterisk,
}

impl OpPrecedence for Operand {
    fn precedence(&self, _writer: &dyn SqlWriter) -> i32 {
        1_000_000_000
    }
}
