use crate::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    ASC,
    DESC,
}

impl Order {
    pub fn reverse(self) -> Self {
        match self {
            Order::ASC => Order::DESC,
            Order::DESC => Order::ASC,
        }
    }
}

/// An expression inside ORDER BY.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordered {
    pub order: Order,
    pub expression: Expression,
}

impl Ordered {
    pub fn reversed(&self) -> Self {
        Self {
            order: self.order.reverse(),
            expression: self.expression.clone(),
        }
    }
}
