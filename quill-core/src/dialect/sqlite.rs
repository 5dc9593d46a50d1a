use crate::{
    BinaryOp, Context, DatePart, FormatterRegistry, Result, SelectStatement, SqlWriter, TypeKey,
    Value, clock_entries, index_of_entries, math_entries, new_uuid, substring_entries,
};
use std::{fmt::Write, sync::LazyLock};

static FORMATTERS: LazyLock<FormatterRegistry> = LazyLock::new(|| {
    let mut entries = clock_entries(
        "RTRIM(RTRIM(strftime('%Y-%m-%d %H:%M:%f', 'now', 'localtime'), '0'), '.')",
        "RTRIM(RTRIM(strftime('%Y-%m-%d %H:%M:%f', 'now'), '0'), '.')",
        Some("date('now', 'localtime')"),
    );
    entries.push(new_uuid("lower(hex(randomblob(16)))"));
    entries.extend(math_entries(&[("max", "MAX", 2), ("min", "MIN", 2)]));
    entries.extend(substring_entries("SUBSTR", None));
    entries.extend(index_of_entries("INSTR({0}, {1}) - 1"));
    FormatterRegistry::new(entries)
});

#[derive(Default)]
pub struct SqliteSqlWriter {}

impl SqliteSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for SqliteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn formatters(&self) -> &'static FormatterRegistry {
        &FORMATTERS
    }

    fn max_parameters(&self) -> usize {
        999
    }

    fn write_column_type(&self, _context: &Context, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..)
            | Value::Int8(..)
            | Value::Int16(..)
            | Value::Int32(..)
            | Value::Int64(..)
            | Value::UInt8(..)
            | Value::UInt16(..)
            | Value::UInt32(..)
            | Value::UInt64(..)
            | Value::Interval(..) => out.push_str("INTEGER"),
            Value::Float32(..) | Value::Float64(..) | Value::Decimal(..) => out.push_str("REAL"),
            Value::Char(..)
            | Value::Varchar(..)
            | Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..)
            | Value::Uuid(..)
            | Value::List(..) => out.push_str("TEXT"),
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Null => log::error!("Cannot write the type of a NULL prototype"),
        }
    }

    fn write_value_infinity(&self, _context: &Context, out: &mut String, negative: bool) {
        if negative {
            out.push('-');
        }
        out.push_str("1.0e+10000");
    }

    fn write_binary(
        &self,
        _context: &Context,
        out: &mut String,
        op: BinaryOp,
        lhs: &str,
        rhs: &str,
    ) -> Result<()> {
        let _ = match op {
            // No XOR operator
            BinaryOp::BitXor => write!(out, "({} | {}) - ({} & {})", lhs, rhs, lhs, rhs),
            BinaryOp::Coalesce => write!(out, "COALESCE({}, {})", lhs, rhs),
            _ => write!(out, "{} {} {}", lhs, self.binary_operator(op), rhs),
        };
        Ok(())
    }

    fn write_date_part(&self, _context: &Context, out: &mut String, part: DatePart, operand: &str) {
        let format = match part {
            DatePart::Year => "%Y",
            DatePart::Month => "%m",
            DatePart::Day => "%d",
            DatePart::Hour => "%H",
            DatePart::Minute => "%M",
            DatePart::Second => "%S",
            DatePart::Date | DatePart::Time => {
                let function = if part == DatePart::Date { "date" } else { "time" };
                let _ = write!(out, "{}({})", function, operand);
                return;
            }
        };
        let _ = write!(out, "CAST(strftime('{}', {}) AS INTEGER)", format, operand);
    }

    fn write_date_add(
        &self,
        _context: &Context,
        out: &mut String,
        date: &str,
        date_type: TypeKey,
        interval: &str,
        subtract: bool,
    ) {
        let sign = if subtract { "-" } else { "" };
        let modifier = format!("(({}({}) / 1000000.0) || ' seconds')", sign, interval);
        // Same text as the stored values: trailing zeros of the fraction are dropped, milliseconds at most
        let _ = match date_type {
            TypeKey::Date => write!(out, "date({}, {})", date, modifier),
            TypeKey::Time => write!(
                out,
                "RTRIM(RTRIM(strftime('%H:%M:%f', {}, {}), '0'), '.')",
                date, modifier
            ),
            TypeKey::DateTimeTz => write!(
                out,
                "(RTRIM(RTRIM(strftime('%Y-%m-%d %H:%M:%f', {}, {}), '0'), '.') || '+00:00')",
                date, modifier
            ),
            _ => write!(
                out,
                "RTRIM(RTRIM(strftime('%Y-%m-%d %H:%M:%f', {}, {}), '0'), '.')",
                date, modifier
            ),
        };
    }

    fn write_paging(
        &self,
        _context: &Context,
        out: &mut String,
        select: &SelectStatement,
    ) -> Result<()> {
        match (select.skip, select.take) {
            (skip, Some(take)) => {
                let _ = write!(out, "\nLIMIT {}", take);
                if let Some(skip) = skip {
                    let _ = write!(out, " OFFSET {}", skip);
                }
            }
            (Some(skip), None) => {
                let _ = write!(out, "\nLIMIT -1 OFFSET {}", skip);
            }
            (None, None) => {}
        }
        Ok(())
    }

    fn write_column_identity(&self, _context: &Context, _out: &mut String) {}

    fn write_primary_key_inline(&self, _context: &Context, out: &mut String, auto_increment: bool) {
        out.push_str(" PRIMARY KEY");
        if auto_increment {
            out.push_str(" AUTOINCREMENT");
        }
    }
}
