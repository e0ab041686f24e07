use crate::{Expression, writer::SqlWriter};

/// Provides numeric precedence for expressions allowing sql writers to insert parentheses.
pub trait OpPrecedence {
    /// Lower numbers bind weaker, writers parenthesize when child precedence <= operator precedence.
    fn precedence(&self, writer: &dyn SqlWriter) -> i32;
}

impl<T: OpPrecedence> OpPrecedence for &T {
    fn precedence(&self, writer: &dyn SqlWriter) -> i32 {
        (*self).precedence(writer)
    }
}

impl OpPrecedence for Expression {
    fn precedence(&self, writer: &dyn SqlWriter) -> i32 {
        match self {
            Expression::Operand(v) => v.precedence(writer),
            Expression::Unary(v) => v.precedence(writer),
            Expression::Binary(v) => v.precedence(writer),
        }
    }
}
