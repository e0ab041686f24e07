use primed_core::{Context, SqlWriter, Value, separated_by};
use std::fmt::Write;

#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresSqlWriter {}

impl PostgresSqlWriter {
    /// Name of the Postgres type matching the variant of `value`.
    pub fn column_type(value: &Value) -> Option<&'static str> {
        Some(match value {
            Value::Boolean(..) => "BOOLEAN",
            Value::Int16(..) => "SMALLINT",
            Value::Int32(..) => "INTEGER",
            Value::Int64(..) => "BIGINT",
            Value::Float32(..) => "REAL",
            Value::Float64(..) => "DOUBLE PRECISION",
            Value::Decimal(..) => "NUMERIC",
            Value::Varchar(..) => "TEXT",
            Value::Blob(..) => "BYTEA",
            Value::Date(..) => "DATE",
            Value::Time(..) => "TIME",
            Value::Timestamp(..) => "TIMESTAMP",
            Value::TimestampWithTimezone(..) => "TIMESTAMP WITH TIME ZONE",
            Value::Uuid(..) => "UUID",
            _ => return None,
        })
    }
}

impl SqlWriter for PostgresSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push_str("'::BYTEA");
    }

    fn write_value_list(&self, context: &mut Context, out: &mut String, value: &[Value]) {
        let element = value
            .iter()
            .find(|v| !v.is_null())
            .and_then(Self::column_type);
        if value.is_empty() {
            out.push_str("'{}'");
        } else {
            out.push_str("ARRAY[");
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
        if let Some(element) = element {
            let _ = write!(out, "::{}[]", element);
        }
    }
}
