use crate::{
    BinaryOp, BinaryOpType, ColumnRef, Expression, Fragment, MarkerName, OpPrecedence, Operand,
    Order, Ordered, Placeholder, QueryDescription, SlotSource, TableRef, TerminalOp, UnaryOp,
    UnaryOpType, Value, possibly_parenthesized, separated_by, writer::Context,
};
use std::fmt::Write;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $context:ident, $out:ident, $value:expr) => {{
        if $value.is_infinite() {
            $this.write_value_string(
                $context,
                $out,
                if $value.is_sign_negative() {
                    "-Infinity"
                } else {
                    "Infinity"
                },
            );
        } else if $value.is_nan() {
            $this.write_value_string($context, $out, "NaN");
        } else {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        }
    }};
}

/// A piece of raw SQL text, see [`crate::scan_raw_sql`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSegment<'a> {
    Text(&'a str),
    Marker(MarkerName),
}

/// Dialect printer converting statement descriptions into concrete SQL strings.
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    fn write_table_ref(&self, context: &mut Context, out: &mut String, value: &TableRef) {
        if !value.schema.is_empty() {
            self.write_identifier_quoted(context, out, &value.schema);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, &value.name);
    }

    fn write_column_ref(&self, context: &mut Context, out: &mut String, value: &ColumnRef) {
        if context.qualify_columns && !value.table.is_empty() {
            self.write_identifier_quoted(context, out, &value.table);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, &value.name);
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, context: &mut Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, context, out, *v),
            Value::Float64(Some(v)) => write_float!(self, context, out, *v),
            Value::Decimal(Some(v)) => drop(write!(out, "{}", v)),
            Value::Varchar(Some(v)) => self.write_value_string(context, out, v),
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v),
            Value::Date(Some(v)) => self.write_value_date(context, out, v, false),
            Value::Time(Some(v)) => self.write_value_time(context, out, v, false),
            Value::Timestamp(Some(v)) => self.write_value_timestamp(context, out, v),
            Value::TimestampWithTimezone(Some(v)) => self.write_value_timestamptz(context, out, v),
            Value::Uuid(Some(v)) => drop(write!(out, "'{}'", v)),
            Value::List(Some(v), ..) => self.write_value_list(context, out, v),
            _ => log::error!("Cannot write {:?}", value),
        };
    }

    fn write_value_none(&self, _context: &mut Context, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(context, out, value, '\'', "''");
        out.push('\'');
    }

    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        for b in value {
            let _ = write!(out, "{:02x}", b);
        }
        out.push('\'');
    }

    /// Render a DATE literal (optionally as part of TIMESTAMP composition).
    fn write_value_date(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &Date,
        timestamp: bool,
    ) {
        let b = if timestamp { "" } else { "'" };
        let _ = write!(
            out,
            "{b}{:04}-{:02}-{:02}{b}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }

    /// Render a TIME literal (optionally as part of TIMESTAMP composition).
    fn write_value_time(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &Time,
        timestamp: bool,
    ) {
        let mut subsecond = value.nanosecond();
        let mut width = 9;
        while width > 1 && subsecond % 10 == 0 {
            subsecond /= 10;
            width -= 1;
        }
        let b = if timestamp { "" } else { "'" };
        let _ = write!(
            out,
            "{b}{:02}:{:02}:{:02}.{:0width$}{b}",
            value.hour(),
            value.minute(),
            value.second(),
            subsecond
        );
    }

    fn write_value_timestamp(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &PrimitiveDateTime,
    ) {
        out.push('\'');
        self.write_value_date(context, out, &value.date(), true);
        out.push('T');
        self.write_value_time(context, out, &value.time(), true);
        out.push('\'');
    }

    /// Render a TIMESTAMPTZ literal normalized to UTC.
    fn write_value_timestamptz(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &OffsetDateTime,
    ) {
        let date_time = value.to_utc();
        out.push('\'');
        self.write_value_date(context, out, &date_time.date(), true);
        out.push('T');
        self.write_value_time(context, out, &date_time.time(), true);
        out.push_str("+00:00'");
    }

    fn write_value_list(&self, context: &mut Context, out: &mut String, value: &[Value]) {
        out.push('[');
        separated_by(
            out,
            value,
            |out, v| {
                self.write_value(context, out, v);
            },
            ",",
        );
        out.push(']');
    }

    /// Precedence table for unary operators.
    fn expression_unary_op_precedence(&self, value: &UnaryOpType) -> i32 {
        match value {
            UnaryOpType::Negative => 1250,
            UnaryOpType::Not => 250,
        }
    }

    /// Precedence table for binary operators.
    fn expression_binary_op_precedence(&self, value: &BinaryOpType) -> i32 {
        match value {
            BinaryOpType::Or => 100,
            BinaryOpType::And => 200,
            BinaryOpType::Equal => 300,
            BinaryOpType::NotEqual => 300,
            BinaryOpType::Less => 300,
            BinaryOpType::Greater => 300,
            BinaryOpType::LessEqual => 300,
            BinaryOpType::GreaterEqual => 300,
            BinaryOpType::Is => 400,
            BinaryOpType::IsNot => 400,
            BinaryOpType::Like => 400,
            BinaryOpType::NotLike => 400,
            BinaryOpType::In => 400,
            BinaryOpType::NotIn => 400,
            BinaryOpType::Subtraction => 800,
            BinaryOpType::Addition => 800,
            BinaryOpType::Multiplication => 900,
            BinaryOpType::Division => 900,
            BinaryOpType::Remainder => 900,
        }
    }

    /// Render an operand (literal / column / placeholder).
    fn write_expression_operand(&self, context: &mut Context, out: &mut String, value: &Operand) {
        match value {
            Operand::Null => self.write_value_none(context, out),
            Operand::LitBool(v) => self.write_value_bool(context, out, *v),
            Operand::LitInt(v) => write_integer!(out, *v),
            Operand::LitFloat(v) => write_float!(self, context, out, *v),
            Operand::LitStr(v) => self.write_value_string(context, out, v),
            Operand::Column(v) => self.write_column_ref(context, out, v),
            Operand::Variable(v) => self.write_value(context, out, v),
            Operand::Placeholder(v) => self.write_expression_placeholder(context, out, v),
            Operand::Asterisk => out.push('*'),
        };
    }

    /// Render the parameter slots of a placeholder.
    fn write_expression_placeholder(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Placeholder,
    ) {
        let slots = context.slots_of(&value.name).collect::<Vec<_>>();
        match slots.as_slice() {
            [] if value.is_list() => self.write_empty_list(context, out),
            [] => log::error!(
                "The placeholder `{}` has no parameter slot assigned",
                value.name
            ),
            [slot] if slot.source != SlotSource::ListItem(0) => {
                self.write_parameter(context, out, slot.position)
            }
            slots => {
                out.push('(');
                separated_by(
                    out,
                    slots,
                    |out, slot| self.write_parameter(context, out, slot.position),
                    ", ",
                );
                out.push(')');
            }
        }
    }

    /// Render the positional parameter `$position`.
    fn write_parameter(&self, context: &mut Context, out: &mut String, position: u32) {
        context.counter += 1;
        out.push('$');
        write_integer!(out, position);
    }

    /// An empty list outside of `IN`.
    fn write_empty_list(&self, _context: &mut Context, out: &mut String) {
        out.push_str("'{}'");
    }

    /// Right hand side of `IN` / `NOT IN` for an empty list, an empty array adopts the type of the
    /// left hand side.
    fn write_empty_in(&self, _context: &mut Context, out: &mut String, negated: bool) {
        out.push_str(if negated { " <> ALL('{}')" } else { " = ANY('{}')" });
    }

    fn write_expression_unary_op(&self, context: &mut Context, out: &mut String, value: &UnaryOp) {
        match value.op {
            UnaryOpType::Negative => out.push('-'),
            UnaryOpType::Not => out.push_str("NOT "),
        };
        possibly_parenthesized!(
            out,
            value.arg.precedence(self.as_dyn()) <= self.expression_unary_op_precedence(&value.op),
            value.arg.write_query(self.as_dyn(), context, out)
        );
    }

    /// Render binary operator expression handling precedence / parenthesis.
    fn write_expression_binary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &BinaryOp,
    ) {
        if matches!(value.op, BinaryOpType::In | BinaryOpType::NotIn) {
            return self.write_expression_in(context, out, value);
        }
        let infix = match value.op {
            BinaryOpType::Multiplication => " * ",
            BinaryOpType::Division => " / ",
            BinaryOpType::Remainder => " % ",
            BinaryOpType::Addition => " + ",
            BinaryOpType::Subtraction => " - ",
            BinaryOpType::Is => " IS ",
            BinaryOpType::IsNot => " IS NOT ",
            BinaryOpType::Like => " LIKE ",
            BinaryOpType::NotLike => " NOT LIKE ",
            BinaryOpType::Equal => " = ",
            BinaryOpType::NotEqual => " != ",
            BinaryOpType::Less => " < ",
            BinaryOpType::LessEqual => " <= ",
            BinaryOpType::Greater => " > ",
            BinaryOpType::GreaterEqual => " >= ",
            BinaryOpType::And => " AND ",
            BinaryOpType::Or => " OR ",
            BinaryOpType::In | BinaryOpType::NotIn => unreachable!(),
        };
        let precedence = self.expression_binary_op_precedence(&value.op);
        possibly_parenthesized!(
            out,
            value.lhs.precedence(self.as_dyn()) < precedence,
            value.lhs.write_query(self.as_dyn(), context, out)
        );
        out.push_str(infix);
        possibly_parenthesized!(
            out,
            value.rhs.precedence(self.as_dyn()) <= precedence,
            value.rhs.write_query(self.as_dyn(), context, out)
        );
    }

    /// Render `IN` / `NOT IN`, lists bound as one array become `= ANY` / `<> ALL`.
    fn write_expression_in(&self, context: &mut Context, out: &mut String, value: &BinaryOp) {
        let negated = value.op == BinaryOpType::NotIn;
        let precedence = self.expression_binary_op_precedence(&value.op);
        possibly_parenthesized!(
            out,
            value.lhs.precedence(self.as_dyn()) <= precedence,
            value.lhs.write_query(self.as_dyn(), context, out)
        );
        let empty = match &value.rhs {
            Expression::Operand(Operand::Placeholder(p)) => {
                p.is_list() && context.slots_of(&p.name).next().is_none()
            }
            Expression::Operand(Operand::Variable(Value::List(v, ..))) => {
                v.as_ref().is_none_or(Vec::is_empty)
            }
            _ => false,
        };
        if empty {
            return self.write_empty_in(context, out, negated);
        }
        let array_slot = value.rhs.as_placeholder().and_then(|p| {
            context
                .slots_of(&p.name)
                .find(|s| s.source == SlotSource::ListArray)
                .map(|s| s.position)
        });
        if let Some(position) = array_slot {
            out.push_str(if negated { " <> ALL(" } else { " = ANY(" });
            self.write_parameter(context, out, position);
            out.push(')');
            return;
        }
        out.push_str(if negated { " NOT IN " } else { " IN " });
        match &value.rhs {
            Expression::Operand(Operand::Placeholder(p)) if p.is_list() => {
                value.rhs.write_query(self.as_dyn(), context, out)
            }
            Expression::Operand(Operand::Variable(Value::List(Some(v), ..))) => {
                out.push('(');
                separated_by(out, v, |out, v| self.write_value(context, out, v), ", ");
                out.push(')');
            }
            rhs => {
                out.push('(');
                rhs.write_query(self.as_dyn(), context, out);
                out.push(')');
            }
        }
    }

    /// Render ordered expression inside ORDER BY.
    fn write_expression_ordered(&self, context: &mut Context, out: &mut String, value: &Ordered) {
        value.expression.write_query(self.as_dyn(), context, out);
        out.push_str(match value.order {
            Order::ASC => " ASC",
            Order::DESC => " DESC",
        });
    }

    /// Emit the SELECT statement of a query description, without the trailing semicolon.
    ///
    /// `Count` replaces the projection, a limited count counts a subquery.
    fn write_select(&self, context: &mut Context, out: &mut String, query: &QueryDescription) {
        let count = query.terminal == TerminalOp::Count;
        let sliced = query.limit.is_some() || query.offset.is_some();
        out.reserve(128 + query.columns.len() * 32);
        out.push_str("SELECT ");
        if count {
            out.push_str("COUNT(*)");
            if sliced {
                out.push_str("\nFROM (SELECT 1");
            }
        } else if query.columns.is_empty() {
            out.push('*');
        } else {
            separated_by(
                out,
                &query.columns,
                |out, col| self.write_column_ref(context, out, col),
                ", ",
            );
        }
        out.push_str("\nFROM ");
        self.write_table_ref(
            &mut context.switch_fragment(Fragment::SqlSelectFrom).current,
            out,
            &query.table,
        );
        if let Some(filter) = &query.filter {
            out.push_str("\nWHERE ");
            filter.write_query(
                self.as_dyn(),
                &mut context.switch_fragment(Fragment::SqlSelectWhere).current,
                out,
            );
        }
        if !query.ordering.is_empty() && (!count || sliced) {
            out.push_str("\nORDER BY ");
            let mut order_context = context.switch_fragment(Fragment::SqlSelectOrderBy);
            separated_by(
                out,
                &query.ordering,
                |out, v| self.write_expression_ordered(&mut order_context.current, out, v),
                ", ",
            );
        }
        if let Some(limit) = query.limit {
            let _ = write!(out, "\nLIMIT {}", limit);
        }
        if let Some(offset) = query.offset {
            let _ = write!(out, "\nOFFSET {}", offset);
        }
        if count && sliced {
            out.push_str(") AS ");
            self.write_identifier_quoted(context, out, "counted");
        }
    }

    /// Emit raw SQL text with its markers replaced by positional parameters.
    fn write_raw_sql(&self, context: &mut Context, out: &mut String, segments: &[RawSegment]) {
        for segment in segments {
            match segment {
                RawSegment::Text(v) => out.push_str(v),
                RawSegment::Marker(marker) => {
                    let slots = context.slots;
                    match slots.iter().find(|s| &s.marker == marker) {
                        Some(slot) => self.write_parameter(context, out, slot.position),
                        None => log::error!("The marker `{}` has no parameter slot assigned", marker),
                    }
                }
            }
        }
    }

    /// Emit `PREPARE name AS sql;`.
    fn write_prepare(&self, out: &mut String, name: &str, sql: &str) {
        let mut context = Context::default();
        out.reserve(16 + name.len() + sql.len());
        out.push_str("PREPARE ");
        self.write_identifier_quoted(&mut context, out, name);
        out.push_str(" AS\n");
        out.push_str(sql);
        out.push(';');
    }

    /// Emit `EXECUTE name(params);` with the parameters written as literals.
    fn write_execute(&self, out: &mut String, name: &str, params: &[Value]) {
        let mut context = Context::new(Fragment::SqlExecute, &[]);
        out.push_str("EXECUTE ");
        self.write_identifier_quoted(&mut context, out, name);
        if !params.is_empty() {
            out.push('(');
            separated_by(
                out,
                params,
                |out, v| self.write_value(&mut context, out, v),
                ", ",
            );
            out.push(')');
        }
        out.push(';');
    }

    /// Emit `DEALLOCATE name;`.
    fn write_deallocate(&self, out: &mut String, name: &str) {
        let mut context = Context::default();
        out.push_str("DEALLOCATE ");
        self.write_identifier_quoted(&mut context, out, name);
        out.push(';');
    }
}

/// Fallback generic SQL writer (PostgreSQL conventions).
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
