use crate::{
    BinaryOp, BinaryOpType, ColumnRef, Operand, Order, Ordered, Placeholder, UnaryOp, UnaryOpType,
    Value,
    writer::{Context, SqlWriter},
};
use std::borrow::Cow;

/// Owned predicate tree, as produced by the query building layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Operand(Operand),
    Unary(Box<UnaryOp>),
    Binary(Box<BinaryOp>),
}

/// Column reference expression.
pub fn col(name: impl Into<Cow<'static, str>>) -> Expression {
    Expression::Operand(Operand::Column(ColumnRef::new(name)))
}

/// Scalar placeholder expression.
pub fn param(name: impl Into<Cow<'static, str>>) -> Expression {
    Placeholder::scalar(name).into()
}

/// List placeholder expression, meant as right hand side of `in_list` / `not_in_list`.
pub fn param_list(name: impl Into<Cow<'static, str>>) -> Expression {
    Placeholder::list(name).into()
}

/// Literal value fixed at declaration time.
pub fn lit(value: impl Into<Value>) -> Expression {
    Expression::Operand(Operand::Variable(value.into()))
}

macro_rules! binary_builders {
    ($($name:ident => $op:path),+ $(,)?) => {
        $(
            pub fn $name(self, rhs: impl Into<Expression>) -> Expression {
                self.binary($op, rhs)
            }
        )+
    };
}

impl Expression {
    pub fn binary(self, op: BinaryOpType, rhs: impl Into<Expression>) -> Expression {
        Expression::Binary(Box::new(BinaryOp {
            op,
            lhs: self,
            rhs: rhs.into(),
        }))
    }

    binary_builders!(
        eq => BinaryOpType::Equal,
        ne => BinaryOpType::NotEqual,
        lt => BinaryOpType::Less,
        gt => BinaryOpType::Greater,
        le => BinaryOpType::LessEqual,
        ge => BinaryOpType::GreaterEqual,
        is => BinaryOpType::Is,
        is_not => BinaryOpType::IsNot,
        like => BinaryOpType::Like,
        not_like => BinaryOpType::NotLike,
        in_list => BinaryOpType::In,
        not_in_list => BinaryOpType::NotIn,
        and => BinaryOpType::And,
        or => BinaryOpType::Or,
        add => BinaryOpType::Addition,
        sub => BinaryOpType::Subtraction,
        mul => BinaryOpType::Multiplication,
        div => BinaryOpType::Division,
        rem => BinaryOpType::Remainder,
    );

    pub fn not(self) -> Expression {
        Expression::Unary(Box::new(UnaryOp {
            op: UnaryOpType::Not,
            arg: self,
        }))
    }
    pub fn neg(self) -> Expression {
        Expression::Unary(Box::new(UnaryOp {
            op: UnaryOpType::Negative,
            arg: self,
        }))
    }
    pub fn asc(self) -> Ordered {
        Ordered {
            order: Order::ASC,
            expression: self,
        }
    }
    pub fn desc(self) -> Ordered {
        Ordered {
            order: Order::DESC,
            expression: self,
        }
    }

    /// Serialize the expression into the output string using the sql writer.
    pub fn write_query(&self, writer: &dyn SqlWriter, context: &mut Context, out: &mut String) {
        match self {
            Expression::Operand(v) => writer.write_expression_operand(context, out, v),
            Expression::Unary(v) => writer.write_expression_unary_op(context, out, v),
            Expression::Binary(v) => writer.write_expression_binary_op(context, out, v),
        }
    }

    /// Visit every placeholder of the tree, depth first and left to right.
    pub fn for_each_placeholder<'a>(&'a self, f: &mut impl FnMut(&'a Placeholder)) {
        match self {
            Expression::Operand(Operand::Placeholder(v)) => f(v),
            Expression::Operand(..) => {}
            Expression::Unary(v) => v.arg.for_each_placeholder(f),
            Expression::Binary(v) => {
                v.lhs.for_each_placeholder(f);
                v.rhs.for_each_placeholder(f);
            }
        }
    }

    pub fn as_placeholder(&self) -> Option<&Placeholder> {
        match self {
            Expression::Operand(Operand::Placeholder(v)) => Some(v),
            _ => None,
        }
    }
}

impl From<Operand> for Expression {
    fn from(value: Operand) -> Self {
        Expression::Operand(value)
    }
}

impl From<Placeholder> for Expression {
    fn from(value: Placeholder) -> Self {
        Expression::Operand(Operand::Placeholder(value))
    }
}

impl From<ColumnRef> for Expression {
    fn from(value: ColumnRef) -> Self {
        Expression::Operand(Operand::Column(value))
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Operand(Operand::Variable(value))
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Expression::Operand(Operand::LitBool(value))
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Expression::Operand(Operand::LitInt(value))
    }
}

impl From<i32> for Expression {
    fn from(value: i32) -> Self {
        Expression::Operand(Operand::LitInt(value as i64))
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::Operand(Operand::LitFloat(value))
    }
}

impl From<&'static str> for Expression {
    fn from(value: &'static str) -> Self {
        Expression::Operand(Operand::LitStr(Cow::Borrowed(value)))
    }
}
