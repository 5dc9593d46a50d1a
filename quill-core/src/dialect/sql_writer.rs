use crate::{
    BinaryOp, Context, DeleteStatement, EntityMapper, Fragment, FormatterRegistry,
    InsertStatement, MemberMapper, Order, QuillError, Result, SelectStatement, TypeKey,
    UpdateStatement, Value, formatter, separated_by, write_temporal,
};
use std::fmt::Write;
use time::Duration;

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $context:ident, $out:ident, $value:expr) => {{
        if $value.is_infinite() {
            $this.write_value_infinity($context, $out, $value.is_sign_negative());
        } else if $value.is_nan() {
            $this.write_value_nan($context, $out);
        } else {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        }
    }};
}

/// Component of a temporal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePart {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Date,
    Time,
}

impl DatePart {
    pub fn keyword(&self) -> &'static str {
        match self {
            DatePart::Year => "YEAR",
            DatePart::Month => "MONTH",
            DatePart::Day => "DAY",
            DatePart::Hour => "HOUR",
            DatePart::Minute => "MINUTE",
            DatePart::Second => "SECOND",
            DatePart::Date => "DATE",
            DatePart::Time => "TIME",
        }
    }
}

/// Unit of the interval constructors, `Interval::days(n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
}

impl IntervalUnit {
    pub fn micros(&self) -> i64 {
        match self {
            IntervalUnit::Week => 604_800_000_000,
            IntervalUnit::Day => 86_400_000_000,
            IntervalUnit::Hour => 3_600_000_000,
            IntervalUnit::Minute => 60_000_000,
            IntervalUnit::Second => 1_000_000,
            IntervalUnit::Millisecond => 1_000,
            IntervalUnit::Microsecond => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IntervalUnit::Week => "week",
            IntervalUnit::Day => "day",
            IntervalUnit::Hour => "hour",
            IntervalUnit::Minute => "minute",
            IntervalUnit::Second => "second",
            IntervalUnit::Millisecond => "millisecond",
            IntervalUnit::Microsecond => "microsecond",
        }
    }
}

/// Dialect printer converting compiled fragments and statements into concrete SQL strings.
///
/// Every method has a default close to ANSI SQL, dialects override the pieces that differ.
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Name of the dialect, part of the cache keys.
    fn name(&self) -> &'static str;

    /// Member and method formatters of the dialect.
    fn formatters(&self) -> &'static FormatterRegistry {
        &formatter::STANDARD
    }

    fn parameter_prefix(&self) -> &'static str {
        "@"
    }

    /// Whether a whole list can be bound to a single parameter.
    fn supports_array_parameter(&self) -> bool {
        false
    }

    /// Maximum number of parameters in a single command.
    fn max_parameters(&self) -> usize {
        2000
    }

    /// Whether the current fragment context allows alias declaration.
    fn alias_declaration(&self, context: &Context) -> bool {
        matches!(context.fragment, Fragment::SqlSelectFrom | Fragment::SqlJoin)
    }

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &Context,
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
    fn write_identifier_quoted(&self, context: &Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    /// Render a table reference with optional alias.
    fn write_table_ref(
        &self,
        context: &Context,
        out: &mut String,
        mapper: &EntityMapper,
        alias: &str,
    ) {
        if !mapper.schema.is_empty() {
            self.write_identifier_quoted(context, out, &mapper.schema);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, &mapper.table);
        if self.alias_declaration(context) && !alias.is_empty() {
            let _ = write!(out, " {}", alias);
        }
    }

    /// Render a column reference, qualified with the table alias when there is one.
    fn write_column_ref(&self, context: &Context, out: &mut String, alias: &str, name: &str) {
        if context.qualify_columns && !alias.is_empty() {
            out.push_str(alias);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, name);
    }

    /// Render the SQL type for a `Value` prototype.
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
            Value::UInt64(..) => out.push_str("DECIMAL(20,0)"),
            Value::Float32(..) => out.push_str("REAL"),
            Value::Float64(..) => out.push_str("DOUBLE PRECISION"),
            Value::Decimal(..) => out.push_str("DECIMAL(38,10)"),
            Value::Char(..) => out.push_str("CHAR(1)"),
            Value::Varchar(..) => out.push_str("VARCHAR(4000)"),
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Time(..) => out.push_str("TIME"),
            Value::Timestamp(..) => out.push_str("TIMESTAMP"),
            Value::TimestampWithTimezone(..) => out.push_str("TIMESTAMP WITH TIME ZONE"),
            Value::Interval(..) => out.push_str("BIGINT"),
            Value::Uuid(..) => out.push_str("CHAR(36)"),
            Value::List(.., inner) => {
                self.write_column_type(context, out, inner);
                out.push_str(" ARRAY");
            }
            Value::Null => log::error!("Cannot write the type of a NULL prototype"),
        }
    }

    /// Type name used as the target of `CAST`.
    fn write_cast_type(&self, context: &Context, out: &mut String, value: &Value) {
        self.write_column_type(context, out, value);
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, context: &Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Int8(Some(v)) => write_integer!(out, *v),
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::UInt8(Some(v)) => write_integer!(out, *v),
            Value::UInt16(Some(v)) => write_integer!(out, *v),
            Value::UInt32(Some(v)) => write_integer!(out, *v),
            Value::UInt64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(self, context, out, *v),
            Value::Float64(Some(v)) => write_float!(self, context, out, *v),
            Value::Decimal(Some(v)) => drop(write!(out, "{}", v)),
            Value::Char(Some(v)) => {
                let mut buf = [0u8; 4];
                self.write_value_string(context, out, v.encode_utf8(&mut buf));
            }
            Value::Varchar(Some(v)) => self.write_value_string(context, out, v),
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v.as_ref()),
            Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..) => self.write_value_temporal(context, out, value),
            Value::Interval(Some(v)) => self.write_value_interval(context, out, v),
            Value::Uuid(Some(v)) => drop(write!(out, "'{}'", v)),
            Value::List(Some(v), ..) => {
                out.push('(');
                separated_by(out, v, |out, v| self.write_value(context, out, v), ", ");
                out.push(')');
            }
            _ => log::error!("Cannot write {:?}", value),
        };
    }

    /// Render NULL literal.
    fn write_value_none(&self, _context: &Context, out: &mut String) {
        out.push_str("NULL");
    }

    /// Render boolean literal.
    fn write_value_bool(&self, _context: &Context, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    /// Predicate always true or always false.
    fn write_bool_predicate(&self, _context: &Context, out: &mut String, value: bool) {
        out.push_str(if value { "1 = 1" } else { "1 = 0" });
    }

    fn write_value_infinity(&self, context: &Context, out: &mut String, negative: bool) {
        out.push_str("CAST(");
        self.write_value_string(context, out, if negative { "-Infinity" } else { "Infinity" });
        out.push_str(" AS ");
        self.write_cast_type(context, out, &Value::Float64(None));
        out.push(')');
    }

    fn write_value_nan(&self, context: &Context, out: &mut String) {
        out.push_str("CAST(");
        self.write_value_string(context, out, "NaN");
        out.push_str(" AS ");
        self.write_cast_type(context, out, &Value::Float64(None));
        out.push(')');
    }

    /// Render and escape a string literal using single quotes.
    fn write_value_string(&self, context: &Context, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(context, out, value, '\'', "''");
        out.push('\'');
    }

    /// Render a blob literal using hex escapes.
    fn write_value_blob(&self, _context: &Context, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\'');
    }

    /// Render a date, time or timestamp literal.
    fn write_value_temporal(&self, _context: &Context, out: &mut String, value: &Value) {
        out.push('\'');
        write_temporal(out, value);
        out.push('\'');
    }

    /// Intervals are stored as a count of microseconds unless the dialect has a native type.
    fn write_value_interval(&self, _context: &Context, out: &mut String, value: &Duration) {
        write_integer!(out, value.whole_microseconds() as i64);
    }

    /// Render a parameter placeholder.
    fn write_parameter(&self, _context: &Context, out: &mut String, prefix: &str, name: &str) {
        out.push_str(prefix);
        out.push_str(name);
    }

    /// Textual operator of a binary expression.
    fn binary_operator(&self, op: BinaryOp) -> &'static str {
        match op {
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
            BinaryOp::BitXor => "^",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::Coalesce => "COALESCE",
        }
    }

    /// Render a binary expression out of operands already parenthesized.
    fn write_binary(
        &self,
        _context: &Context,
        out: &mut String,
        op: BinaryOp,
        lhs: &str,
        rhs: &str,
    ) -> Result<()> {
        if op == BinaryOp::Coalesce {
            let _ = write!(out, "COALESCE({}, {})", lhs, rhs);
        } else {
            let _ = write!(out, "{} {} {}", lhs, self.binary_operator(op), rhs);
        }
        Ok(())
    }

    fn write_bitwise_not(
        &self,
        _context: &Context,
        out: &mut String,
        operand: &str,
    ) -> Result<()> {
        out.push('~');
        out.push_str(operand);
        Ok(())
    }

    /// String concatenation.
    fn write_concat(&self, _context: &Context, out: &mut String, parts: &[String]) {
        separated_by(out, parts, |out, v| out.push_str(v), " || ");
    }

    fn write_like(
        &self,
        context: &Context,
        out: &mut String,
        lhs: &str,
        pattern: &str,
        negated: bool,
        escape: bool,
    ) {
        out.push_str(lhs);
        out.push_str(if negated { " NOT LIKE " } else { " LIKE " });
        out.push_str(pattern);
        if escape {
            out.push_str(" ESCAPE ");
            self.write_value_string(context, out, "\\");
        }
    }

    fn write_cast(&self, context: &Context, out: &mut String, operand: &str, to: &Value) {
        out.push_str("CAST(");
        out.push_str(operand);
        out.push_str(" AS ");
        self.write_cast_type(&context.switch_fragment(Fragment::Casting), out, to);
        out.push(')');
    }

    fn write_date_part(&self, context: &Context, out: &mut String, part: DatePart, operand: &str) {
        match part {
            DatePart::Date => self.write_cast(context, out, operand, &Value::Date(None)),
            DatePart::Time => self.write_cast(context, out, operand, &Value::Time(None)),
            _ => drop(write!(out, "EXTRACT({} FROM {})", part.keyword(), operand)),
        }
    }

    /// Add (or subtract) an interval to a date, the interval in the dialect representation.
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
            "{} {} ({}) * INTERVAL '1' MICROSECOND",
            date,
            if subtract { '-' } else { '+' },
            interval
        );
    }

    /// Interval out of an amount of units.
    fn write_interval_from(
        &self,
        _context: &Context,
        out: &mut String,
        amount: &str,
        unit: IntervalUnit,
    ) {
        if unit == IntervalUnit::Microsecond {
            out.push_str(amount);
        } else {
            let _ = write!(out, "{} * {}", amount, unit.micros());
        }
    }

    /// Microseconds contained in an interval expression.
    fn write_interval_micros(&self, _context: &Context, out: &mut String, interval: &str) {
        out.push_str(interval);
    }

    /// Integral division truncating toward zero.
    fn write_truncated_division(
        &self,
        _context: &Context,
        out: &mut String,
        lhs: &str,
        rhs: i64,
    ) {
        let _ = write!(out, "CAST(({}) / {} AS BIGINT)", lhs, rhs);
    }

    fn write_select_top(&self, _context: &Context, _out: &mut String, _select: &SelectStatement) {}

    /// Emit the paging clause of a SELECT.
    fn write_paging(
        &self,
        _context: &Context,
        out: &mut String,
        select: &SelectStatement,
    ) -> Result<()> {
        if let Some(take) = select.take {
            out.push_str("\nLIMIT ");
            write_integer!(out, take);
        }
        if let Some(skip) = select.skip {
            out.push_str("\nOFFSET ");
            write_integer!(out, skip);
        }
        Ok(())
    }

    /// Emit SELECT statement without the terminating semicolon.
    fn write_select_body(&self, out: &mut String, select: &SelectStatement) -> Result<()> {
        self.write_select_clauses(out, select)?;
        self.write_paging(&Context::new(Fragment::SqlSelect, true), out, select)
    }

    /// Every SELECT clause up to ORDER BY, paging excluded.
    fn write_select_clauses(&self, out: &mut String, select: &SelectStatement) -> Result<()> {
        let context = Context::new(Fragment::SqlSelect, true);
        out.push_str("SELECT ");
        if select.distinct {
            out.push_str("DISTINCT ");
        }
        self.write_select_top(&context, out, select);
        separated_by(
            out,
            &select.columns,
            |out, col| {
                out.push_str(&col.sql);
                if let Some(alias) = &col.alias {
                    out.push_str(" AS ");
                    self.write_identifier_quoted(&context, out, alias);
                }
            },
            ", ",
        );
        out.push_str("\nFROM ");
        out.push_str(&select.from);
        if let Some(filter) = &select.filter {
            out.push_str("\nWHERE ");
            out.push_str(filter);
        }
        if !select.group_by.is_empty() {
            out.push_str("\nGROUP BY ");
            separated_by(out, &select.group_by, |out, v| out.push_str(v), ", ");
        }
        if let Some(having) = &select.having {
            out.push_str("\nHAVING ");
            out.push_str(having);
        }
        if !select.order_by.is_empty() {
            out.push_str("\nORDER BY ");
            self.write_order_by(&context.switch_fragment(Fragment::SqlSelectOrderBy), out, select);
        }
        Ok(())
    }

    fn write_order_by(&self, _context: &Context, out: &mut String, select: &SelectStatement) {
        separated_by(
            out,
            &select.order_by,
            |out, (sql, order)| {
                out.push_str(sql);
                out.push_str(match order {
                    Order::Asc => " ASC",
                    Order::Desc => " DESC",
                });
            },
            ", ",
        );
    }

    /// Emit SELECT statement (projection, FROM, WHERE, GROUP BY, HAVING, ORDER, paging).
    fn write_select(&self, out: &mut String, select: &SelectStatement) -> Result<()> {
        out.reserve(128 + select.columns.len() * 32);
        if !out.is_empty() {
            out.push('\n');
        }
        self.write_select_body(out, select)?;
        out.push(';');
        Ok(())
    }

    /// Emit the count of the rows the SELECT would return, ignoring its paging.
    fn write_count(&self, out: &mut String, select: &SelectStatement) -> Result<()> {
        if !out.is_empty() {
            out.push('\n');
        }
        if select.distinct || !select.group_by.is_empty() {
            out.push_str("SELECT COUNT(*) FROM (\n");
            self.write_select_body(out, &select.unordered())?;
            out.push_str("\n) q");
        } else {
            out.push_str("SELECT COUNT(*)\nFROM ");
            out.push_str(&select.from);
            if let Some(filter) = &select.filter {
                out.push_str("\nWHERE ");
                out.push_str(filter);
            }
        }
        out.push(';');
        Ok(())
    }

    /// Emit a single row INSERT.
    fn write_insert(&self, out: &mut String, insert: &InsertStatement) -> Result<()> {
        out.reserve(64 + insert.columns.len() * 32);
        if !out.is_empty() {
            out.push('\n');
        }
        let context = Context::new(Fragment::SqlInsertInto, false);
        out.push_str("INSERT INTO ");
        self.write_table_ref(&context, out, insert.mapper, "");
        if insert.columns.is_empty() {
            self.write_insert_default_values(&context, out);
        } else {
            out.push_str(" (");
            separated_by(
                out,
                &insert.columns,
                |out, v| {
                    self.write_identifier_quoted(
                        &context,
                        out,
                        &insert.mapper.members[*v].field_name,
                    )
                },
                ", ",
            );
            out.push_str(") VALUES (");
            separated_by(out, &insert.values, |out, v| out.push_str(v), ", ");
            out.push(')');
        }
        if let Some(identity) = insert.returning {
            self.write_identity_retrieval(
                &context.switch_fragment(Fragment::SqlInsertIntoValues),
                out,
                insert.mapper,
                &insert.mapper.members[identity],
            )?;
        }
        out.push(';');
        Ok(())
    }

    fn write_insert_default_values(&self, _context: &Context, out: &mut String) {
        out.push_str(" DEFAULT VALUES");
    }

    /// Clause or statement returning the generated identity of an insert.
    fn write_identity_retrieval(
        &self,
        context: &Context,
        out: &mut String,
        _mapper: &EntityMapper,
        identity: &MemberMapper,
    ) -> Result<()> {
        out.push_str(" RETURNING ");
        self.write_identifier_quoted(context, out, &identity.field_name);
        Ok(())
    }

    /// Emit UPDATE by primary key.
    fn write_update(&self, out: &mut String, update: &UpdateStatement) -> Result<()> {
        if update.keys.is_empty() {
            return Err(QuillError::unsupported(
                "update of an entity without primary key",
                update.mapper.name(),
                "update",
            )
            .into());
        }
        if !out.is_empty() {
            out.push('\n');
        }
        let context = Context::new(Fragment::SqlUpdate, false);
        out.push_str("UPDATE ");
        self.write_table_ref(&context, out, update.mapper, "");
        out.push_str(" SET ");
        separated_by(
            out,
            &update.assignments,
            |out, (member, value)| {
                self.write_identifier_quoted(
                    &context,
                    out,
                    &update.mapper.members[*member].field_name,
                );
                out.push_str(" = ");
                out.push_str(value);
            },
            ", ",
        );
        out.push_str("\nWHERE ");
        self.write_key_filter(
            &context.switch_fragment(Fragment::SqlUpdateWhere),
            out,
            update.mapper,
            &update.keys,
        );
        out.push(';');
        Ok(())
    }

    fn write_key_filter(
        &self,
        context: &Context,
        out: &mut String,
        mapper: &EntityMapper,
        keys: &[(usize, String)],
    ) {
        separated_by(
            out,
            keys,
            |out, (member, value)| {
                self.write_identifier_quoted(context, out, &mapper.members[*member].field_name);
                out.push_str(" = ");
                out.push_str(value);
            },
            " AND ",
        );
    }

    /// Emit DELETE statement with WHERE clause.
    fn write_delete(&self, out: &mut String, delete: &DeleteStatement) -> Result<()> {
        if !out.is_empty() {
            out.push('\n');
        }
        let context = Context::new(Fragment::SqlDeleteFrom, false);
        out.push_str("DELETE FROM ");
        self.write_table_ref(&context, out, delete.mapper, "");
        if let Some(filter) = &delete.filter {
            out.push_str("\nWHERE ");
            out.push_str(filter);
        }
        out.push(';');
        Ok(())
    }

    /// Join statements, each already terminated by a semicolon, into one command.
    fn write_batch(&self, out: &mut String, statements: &[String]) {
        separated_by(out, statements, |out, v| out.push_str(v), "\n");
    }

    /// Emit CREATE TABLE with columns and primary key.
    fn write_create_table(
        &self,
        out: &mut String,
        mapper: &EntityMapper,
        if_not_exists: bool,
    ) -> Result<()> {
        let context = Context::new(Fragment::SqlCreateTable, false);
        out.reserve(128 + mapper.members.len() * 64);
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("CREATE TABLE ");
        if if_not_exists {
            self.write_if_not_exists(&context, out);
        }
        self.write_table_ref(&context, out, mapper, "");
        out.push_str(" (\n");
        let single_key = mapper.primary_keys.len() == 1;
        let mut result = Ok(());
        separated_by(
            out,
            mapper.columns(),
            |out, (i, member)| {
                if result.is_ok() {
                    result = self.write_create_table_column_fragment(
                        &context,
                        out,
                        mapper,
                        member,
                        single_key && mapper.primary_keys[0] == i,
                    );
                }
            },
            ",\n",
        );
        result?;
        if mapper.primary_keys.len() > 1 {
            out.push_str(",\nPRIMARY KEY (");
            separated_by(
                out,
                &mapper.primary_keys,
                |out, v| {
                    self.write_identifier_quoted(&context, out, &mapper.members[*v].field_name)
                },
                ", ",
            );
            out.push(')');
        }
        out.push_str("\n);");
        Ok(())
    }

    /// Emit single column definition fragment.
    fn write_create_table_column_fragment(
        &self,
        context: &Context,
        out: &mut String,
        mapper: &EntityMapper,
        member: &MemberMapper,
        inline_primary_key: bool,
    ) -> Result<()> {
        let prototype = member.stored_prototype();
        if prototype == Value::Null || member.db_type().is_err() {
            return Err(QuillError::TypeMapping {
                declaring: mapper.name().into(),
                member: member.name.into(),
                message: format!("{} has no column type", prototype.type_name()),
            }
            .into());
        }
        self.write_identifier_quoted(context, out, &member.field_name);
        out.push(' ');
        self.write_column_type(context, out, &prototype);
        if member.auto_increment {
            self.write_column_identity(context, out);
        }
        if !member.nullable && !inline_primary_key {
            out.push_str(" NOT NULL");
        }
        if inline_primary_key {
            self.write_primary_key_inline(context, out, member.auto_increment);
        }
        Ok(())
    }

    fn write_column_identity(&self, _context: &Context, out: &mut String) {
        out.push_str(" GENERATED BY DEFAULT AS IDENTITY");
    }

    fn write_primary_key_inline(
        &self,
        _context: &Context,
        out: &mut String,
        _auto_increment: bool,
    ) {
        out.push_str(" PRIMARY KEY");
    }

    /// Dialects lacking the clause ignore the request.
    fn write_if_not_exists(&self, _context: &Context, out: &mut String) {
        out.push_str("IF NOT EXISTS ");
    }

    fn write_if_exists(&self, _context: &Context, out: &mut String) {
        out.push_str("IF EXISTS ");
    }

    /// Emit DROP TABLE statement.
    fn write_drop_table(&self, out: &mut String, mapper: &EntityMapper, if_exists: bool) {
        let context = Context::new(Fragment::SqlDropTable, false);
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("DROP TABLE ");
        if if_exists {
            self.write_if_exists(&context, out);
        }
        self.write_table_ref(&context, out, mapper, "");
        out.push(';');
    }
}

/// Fallback generic SQL writer, ANSI syntax.
#[derive(Default)]
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

    fn name(&self) -> &'static str {
        "generic"
    }
}
