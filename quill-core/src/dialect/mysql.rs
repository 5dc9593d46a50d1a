use crate::{
    Context, DatePart, EntityMapper, Fragment, FormatterRegistry, MemberMapper, Result,
    SelectStatement, SqlWriter, TypeKey, Value, clock_entries, index_of_entries, length_entries,
    new_uuid, separated_by,
};
use std::{fmt::Write, sync::LazyLock};

static FORMATTERS: LazyLock<FormatterRegistry> = LazyLock::new(|| {
    let mut entries = clock_entries("NOW()", "UTC_TIMESTAMP()", Some("CURDATE()"));
    entries.push(new_uuid("UUID()"));
    entries.extend(length_entries("CHAR_LENGTH"));
    entries.extend(index_of_entries("INSTR({0}, {1}) - 1"));
    FormatterRegistry::new(entries)
});

#[derive(Default)]
pub struct MySqlSqlWriter {}

impl MySqlSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for MySqlSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn name(&self) -> &'static str {
        "mysql"
    }

    fn formatters(&self) -> &'static FormatterRegistry {
        &FORMATTERS
    }

    fn max_parameters(&self) -> usize {
        65535
    }

    fn write_identifier_quoted(&self, context: &Context, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(context, out, value, '`', "``");
        out.push('`');
    }

    fn write_column_type(&self, context: &Context, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..) => out.push_str("BOOLEAN"),
            Value::Int8(..) => out.push_str("TINYINT"),
            Value::Int16(..) => out.push_str("SMALLINT"),
            Value::Int32(..) => out.push_str("INTEGER"),
            Value::Int64(..) => out.push_str("BIGINT"),
            Value::UInt8(..) => out.push_str("TINYINT UNSIGNED"),
            Value::UInt16(..) => out.push_str("SMALLINT UNSIGNED"),
            Value::UInt32(..) => out.push_str("INTEGER UNSIGNED"),
            Value::UInt64(..) => out.push_str("BIGINT UNSIGNED"),
            Value::Float32(..) => out.push_str("FLOAT"),
            Value::Float64(..) => out.push_str("DOUBLE"),
            Value::Decimal(..) => out.push_str("DECIMAL(38,10)"),
            Value::Char(..) => out.push_str("CHAR(1)"),
            Value::Varchar(..) if context.fragment == Fragment::SqlCreateTable => {
                out.push_str("VARCHAR(255)")
            }
            Value::Varchar(..) => out.push_str("TEXT"),
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Time(..) => out.push_str("TIME"),
            Value::Timestamp(..) => out.push_str("DATETIME(6)"),
            Value::TimestampWithTimezone(..) => out.push_str("DATETIME(6)"),
            Value::Interval(..) => out.push_str("BIGINT"),
            Value::Uuid(..) => out.push_str("CHAR(36)"),
            Value::List(..) => out.push_str("JSON"),
            Value::Null => log::error!("Cannot write the type of a NULL prototype"),
        };
    }

    fn write_cast_type(&self, _context: &Context, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..)
            | Value::Int8(..)
            | Value::Int16(..)
            | Value::Int32(..)
            | Value::Int64(..)
            | Value::Interval(..) => out.push_str("SIGNED"),
            Value::UInt8(..) | Value::UInt16(..) | Value::UInt32(..) | Value::UInt64(..) => {
                out.push_str("UNSIGNED")
            }
            Value::Float32(..) => out.push_str("FLOAT"),
            Value::Float64(..) => out.push_str("DOUBLE"),
            Value::Decimal(..) => out.push_str("DECIMAL(38,10)"),
            Value::Blob(..) => out.push_str("BINARY"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Time(..) => out.push_str("TIME"),
            Value::Timestamp(..) | Value::TimestampWithTimezone(..) => out.push_str("DATETIME(6)"),
            Value::List(..) => out.push_str("JSON"),
            _ => out.push_str("CHAR"),
        }
    }

    fn write_value_infinity(&self, _context: &Context, out: &mut String, negative: bool) {
        if negative {
            out.push('-');
        }
        out.push_str("1.0e+308");
    }

    fn write_value_string(&self, context: &Context, out: &mut String, value: &str) {
        out.push('\'');
        let mut escaped = String::with_capacity(value.len());
        self.write_escaped(context, &mut escaped, value, '\\', "\\\\");
        self.write_escaped(context, out, &escaped, '\'', "''");
        out.push('\'');
    }

    fn write_concat(&self, _context: &Context, out: &mut String, parts: &[String]) {
        out.push_str("CONCAT(");
        separated_by(out, parts, |out, v| out.push_str(v), ", ");
        out.push(')');
    }

    /// The backslash is already the default escape character of `LIKE`.
    fn write_like(
        &self,
        _context: &Context,
        out: &mut String,
        lhs: &str,
        pattern: &str,
        negated: bool,
        _escape: bool,
    ) {
        out.push_str(lhs);
        out.push_str(if negated { " NOT LIKE " } else { " LIKE " });
        out.push_str(pattern);
    }

    fn write_date_part(&self, context: &Context, out: &mut String, part: DatePart, operand: &str) {
        match part {
            DatePart::Time => {
                let _ = write!(out, "TIME({})", operand);
            }
            DatePart::Date => self.write_cast(context, out, operand, &Value::Date(None)),
            part => {
                let _ = write!(out, "{}({})", part.keyword(), operand);
            }
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
            "{}({}, INTERVAL ({}) MICROSECOND)",
            if subtract { "DATE_SUB" } else { "DATE_ADD" },
            date,
            interval
        );
    }

    fn write_truncated_division(&self, _context: &Context, out: &mut String, lhs: &str, rhs: i64) {
        let _ = write!(out, "({}) DIV {}", lhs, rhs);
    }

    fn write_paging(
        &self,
        _context: &Context,
        out: &mut String,
        select: &SelectStatement,
    ) -> Result<()> {
        match (select.skip, select.take) {
            (Some(skip), Some(take)) => drop(write!(out, "\nLIMIT {}, {}", skip, take)),
            (None, Some(take)) => drop(write!(out, "\nLIMIT {}", take)),
            (Some(skip), None) => drop(write!(out, "\nLIMIT {}, 18446744073709551615", skip)),
            (None, None) => {}
        }
        Ok(())
    }

    fn write_insert_default_values(&self, _context: &Context, out: &mut String) {
        out.push_str(" () VALUES ()");
    }

    fn write_identity_retrieval(
        &self,
        _context: &Context,
        out: &mut String,
        _mapper: &EntityMapper,
        _identity: &MemberMapper,
    ) -> Result<()> {
        out.push_str(";\nSELECT LAST_INSERT_ID()");
        Ok(())
    }

    fn write_column_identity(&self, _context: &Context, out: &mut String) {
        out.push_str(" AUTO_INCREMENT");
    }
}
