use crate::{
    BinaryOp, Context, DatePart, FormatterRegistry, IntervalUnit, SqlWriter, TypeKey, Value,
    clock_entries, index_of_entries, new_uuid,
};
use std::{fmt::Write, sync::LazyLock};
use time::Duration;

static FORMATTERS: LazyLock<FormatterRegistry> = LazyLock::new(|| {
    let mut entries = clock_entries("LOCALTIMESTAMP", "NOW() AT TIME ZONE 'UTC'", None);
    entries.push(new_uuid("gen_random_uuid()"));
    entries.extend(index_of_entries("STRPOS({0}, {1}) - 1"));
    FormatterRegistry::new(entries)
});

#[derive(Default)]
pub struct PostgresSqlWriter {}

impl PostgresSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for PostgresSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn formatters(&self) -> &'static FormatterRegistry {
        &FORMATTERS
    }

    fn supports_array_parameter(&self) -> bool {
        true
    }

    fn max_parameters(&self) -> usize {
        32767
    }

    fn write_column_type(&self, context: &Context, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..) => out.push_str("BOOLEAN"),
            Value::Int8(..) => out.push_str("SMALLINT"),
            Value::Int16(..) => out.push_str("SMALLINT"),
            Value::Int32(..) => out.push_str("INTEGER"),
            Value::Int64(..) => out.push_str("BIGINT"),
            Value::UInt8(..) => out.push_str("SMALLINT"),
            Value::UInt16(..) => out.push_str("INTEGER"),
            Value::UInt32(..) => out.push_str("BIGINT"),
            Value::UInt64(..) => out.push_str("NUMERIC(19)"),
            Value::Float32(..) => out.push_str("REAL"),
            Value::Float64(..) => out.push_str("DOUBLE PRECISION"),
            Value::Decimal(..) => out.push_str("NUMERIC(38,10)"),
            Value::Char(..) => out.push_str("CHARACTER(1)"),
            Value::Varchar(..) => out.push_str("TEXT"),
            Value::Blob(..) => out.push_str("BYTEA"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Time(..) => out.push_str("TIME"),
            Value::Timestamp(..) => out.push_str("TIMESTAMP"),
            Value::TimestampWithTimezone(..) => out.push_str("TIMESTAMP WITH TIME ZONE"),
            Value::Interval(..) => out.push_str("INTERVAL"),
            Value::Uuid(..) => out.push_str("UUID"),
            Value::List(.., inner) => {
                self.write_column_type(context, out, inner);
                out.push_str("[]");
            }
            Value::Null => log::error!("Cannot write the type of a NULL prototype"),
        };
    }

    fn write_value_blob(&self, _context: &Context, out: &mut String, value: &[u8]) {
        out.push_str("'\\x");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push_str("'::BYTEA");
    }

    fn write_value_interval(&self, _context: &Context, out: &mut String, value: &Duration) {
        let _ = write!(out, "INTERVAL '{} microseconds'", value.whole_microseconds());
    }

    fn binary_operator(&self, op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::BitXor => "#",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "<>",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::Coalesce => "COALESCE",
        }
    }

    fn write_date_part(&self, context: &Context, out: &mut String, part: DatePart, operand: &str) {
        match part {
            DatePart::Date => self.write_cast(context, out, operand, &Value::Date(None)),
            DatePart::Time => self.write_cast(context, out, operand, &Value::Time(None)),
            // EXTRACT yields the fractional seconds as well
            DatePart::Second => drop(write!(out, "FLOOR(EXTRACT(SECOND FROM {}))", operand)),
            part => drop(write!(out, "EXTRACT({} FROM {})", part.keyword(), operand)),
        }
    }

    fn write_date_add(
        &self,
        _context: &Context,
        out: &mut String,
        date: &str,
        _date_type: TypeKey,
        interval: &str,
        subtract: bool,
    ) {
        let _ = write!(
            out,
            "{} {} ({})",
            date,
            if subtract { '-' } else { '+' },
            interval
        );
    }

    fn write_interval_from(
        &self,
        _context: &Context,
        out: &mut String,
        amount: &str,
        unit: IntervalUnit,
    ) {
        let _ = write!(out, "{} * INTERVAL '1 {}'", amount, unit.name());
    }

    fn write_interval_micros(&self, _context: &Context, out: &mut String, interval: &str) {
        let _ = write!(out, "EXTRACT(EPOCH FROM {}) * 1000000", interval);
    }

    fn write_truncated_division(&self, _context: &Context, out: &mut String, lhs: &str, rhs: i64) {
        let _ = write!(out, "CAST(TRUNC(({}) / {}) AS BIGINT)", lhs, rhs);
    }
}
