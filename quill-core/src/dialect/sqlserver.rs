use crate::{
    BinaryOp, Context, DatePart, EntityMapper, FormatterRegistry, MemberMapper, QuillError,
    Result, SelectStatement, SqlWriter, TypeKey, Value, case_extremes, clock_entries,
    index_of_entries, length_entries, math_entries, new_uuid, separated_by, substring_entries,
};
use std::{fmt::Write, sync::LazyLock};

static FORMATTERS: LazyLock<FormatterRegistry> = LazyLock::new(|| {
    let mut entries = clock_entries("GETDATE()", "GETUTCDATE()", Some("CAST(GETDATE() AS DATE)"));
    entries.push(new_uuid("NEWID()"));
    entries.extend(length_entries("LEN"));
    entries.extend(index_of_entries("CHARINDEX({1}, {0}) - 1"));
    entries.extend(substring_entries("SUBSTRING", Some("LEN")));
    entries.extend(math_entries(&[("ceil", "CEILING", 1)]));
    entries.extend(case_extremes());
    FormatterRegistry::new(entries)
});

#[derive(Default)]
pub struct SqlServerSqlWriter {}

impl SqlServerSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for SqlServerSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn formatters(&self) -> &'static FormatterRegistry {
        &FORMATTERS
    }

    fn max_parameters(&self) -> usize {
        2100
    }

    fn write_column_type(&self, _context: &Context, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..) => out.push_str("BIT"),
            Value::Int8(..) => out.push_str("SMALLINT"),
            Value::Int16(..) => out.push_str("SMALLINT"),
            Value::Int32(..) => out.push_str("INT"),
            Value::Int64(..) => out.push_str("BIGINT"),
            Value::UInt8(..) => out.push_str("TINYINT"),
            Value::UInt16(..) => out.push_str("INT"),
            Value::UInt32(..) => out.push_str("BIGINT"),
            Value::UInt64(..) => out.push_str("DECIMAL(20,0)"),
            Value::Float32(..) => out.push_str("REAL"),
            Value::Float64(..) => out.push_str("FLOAT"),
            Value::Decimal(..) => out.push_str("DECIMAL(38,10)"),
            Value::Char(..) => out.push_str("NCHAR(1)"),
            Value::Varchar(..) => out.push_str("NVARCHAR(MAX)"),
            Value::Blob(..) => out.push_str("VARBINARY(MAX)"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Time(..) => out.push_str("TIME"),
            Value::Timestamp(..) => out.push_str("DATETIME2"),
            Value::TimestampWithTimezone(..) => out.push_str("DATETIMEOFFSET"),
            Value::Interval(..) => out.push_str("BIGINT"),
            Value::Uuid(..) => out.push_str("UNIQUEIDENTIFIER"),
            Value::List(..) => out.push_str("NVARCHAR(MAX)"),
            Value::Null => log::error!("Cannot write the type of a NULL prototype"),
        };
    }

    fn write_value_bool(&self, _context: &Context, out: &mut String, value: bool) {
        out.push(if value { '1' } else { '0' });
    }

    fn write_value_blob(&self, _context: &Context, out: &mut String, value: &[u8]) {
        out.push_str("0x");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
    }

    fn write_binary(
        &self,
        _context: &Context,
        out: &mut String,
        op: BinaryOp,
        lhs: &str,
        rhs: &str,
    ) -> Result<()> {
        match op {
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight => {
                return Err(QuillError::unsupported(
                    "bit shifts are not available in SQL Server",
                    TypeKey::Int,
                    self.binary_operator(op),
                )
                .into());
            }
            BinaryOp::Coalesce => drop(write!(out, "COALESCE({}, {})", lhs, rhs)),
            _ => drop(write!(out, "{} {} {}", lhs, self.binary_operator(op), rhs)),
        }
        Ok(())
    }

    fn write_concat(&self, _context: &Context, out: &mut String, parts: &[String]) {
        separated_by(out, parts, |out, v| out.push_str(v), " + ");
    }

    fn write_date_part(&self, context: &Context, out: &mut String, part: DatePart, operand: &str) {
        match part {
            DatePart::Date => self.write_cast(context, out, operand, &Value::Date(None)),
            DatePart::Time => self.write_cast(context, out, operand, &Value::Time(None)),
            part => drop(write!(out, "DATEPART({}, {})", part.keyword(), operand)),
        }
    }

    /// `DATEADD` takes a 32 bits amount, whole seconds and the remainder are added separately.
    fn write_date_add(
        &self,
        _context: &Context,
        out: &mut String,
        date: &str,
        _date_type: TypeKey,
        interval: &str,
        subtract: bool,
    ) {
        let sign = if subtract { "-" } else { "" };
        let _ = write!(
            out,
            "DATEADD(SECOND, {sign}({i}) / 1000000, DATEADD(MICROSECOND, {sign}({i}) % 1000000, {d}))",
            sign = sign,
            i = interval,
            d = date
        );
    }

    fn write_select_top(&self, _context: &Context, out: &mut String, select: &SelectStatement) {
        if let (None, Some(take)) = (select.skip, select.take) {
            let _ = write!(out, "TOP ({}) ", take);
        }
    }

    fn write_paging(
        &self,
        _context: &Context,
        out: &mut String,
        select: &SelectStatement,
    ) -> Result<()> {
        let Some(skip) = select.skip else {
            return Ok(());
        };
        if select.order_by.is_empty() {
            return Err(QuillError::Paging {
                dialect: self.name(),
                message: "OFFSET requires an ORDER BY clause".into(),
            }
            .into());
        }
        let _ = write!(out, "\nOFFSET {} ROWS", skip);
        if let Some(take) = select.take {
            let _ = write!(out, " FETCH NEXT {} ROWS ONLY", take);
        }
        Ok(())
    }

    fn write_identity_retrieval(
        &self,
        _context: &Context,
        out: &mut String,
        _mapper: &EntityMapper,
        _identity: &MemberMapper,
    ) -> Result<()> {
        out.push_str(";\nSELECT @@IDENTITY");
        Ok(())
    }

    fn write_column_identity(&self, _context: &Context, out: &mut String) {
        out.push_str(" IDENTITY(1,1)");
    }

    fn write_if_not_exists(&self, _context: &Context, _out: &mut String) {}
}
