use crate::{
    BinaryOp, COMPARISON, Context, DatePart, EntityMapper, FormatCall, FormatterEntry, FormatterRegistry,
    MemberMapper, Params, QuillError, Result, SelectColumn, SelectStatement, SqlSegment,
    SqlWriter, TypeKey, Value, Visitor, clock_entries, index_of_entries, new_uuid, separated_by,
    substring_entries, write_temporal,
};
use std::{fmt::Write, sync::LazyLock};

/// The empty string is NULL in Oracle, emptiness checks become null checks.
fn is_null(v: &mut Visitor<'_>, call: FormatCall) -> Result<SqlSegment> {
    let negated = call.deferred.negated();
    let operands = call.operands();
    let Some(target) = operands.first() else {
        return Err(QuillError::Internal("emptiness check without operand".into()).into());
    };
    let text = v.render_operand(target, COMPARISON + 1)?;
    let check = if negated { "IS NOT NULL" } else { "IS NULL" };
    Ok(SqlSegment::predicate(format!("{} {}", text, check), COMPARISON).merge(target))
}

static FORMATTERS: LazyLock<FormatterRegistry> = LazyLock::new(|| {
    let mut entries = clock_entries(
        "LOCALTIMESTAMP",
        "SYS_EXTRACT_UTC(SYSTIMESTAMP)",
        Some("TRUNC(SYSDATE)"),
    );
    entries.push(new_uuid("SYS_GUID()"));
    entries.extend(substring_entries("SUBSTR", None));
    entries.extend(index_of_entries("INSTR({0}, {1}) - 1"));
    entries.push(FormatterEntry::member(TypeKey::Str, "is_empty", is_null).negatable());
    entries.push(FormatterEntry::member(TypeKey::Str, "is_null_or_empty", is_null).negatable());
    entries.push(
        FormatterEntry::static_method(
            TypeKey::Str,
            "is_null_or_empty",
            Params::Exact(&[TypeKey::Str]),
            is_null,
        )
        .negatable(),
    );
    FormatterRegistry::new(entries)
});

/// Name of the row number column added by the paging wrapper.
pub const ROW_NUMBER_COLUMN: &str = "rn__";

#[derive(Default)]
pub struct OracleSqlWriter {}

impl OracleSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for OracleSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn name(&self) -> &'static str {
        "oracle"
    }

    fn formatters(&self) -> &'static FormatterRegistry {
        &FORMATTERS
    }

    fn parameter_prefix(&self) -> &'static str {
        ":"
    }

    fn max_parameters(&self) -> usize {
        1000
    }

    fn write_column_type(&self, _context: &Context, out: &mut String, value: &Value) {
        match value {
            Value::Boolean(..) => out.push_str("NUMBER(1)"),
            Value::Int8(..) | Value::UInt8(..) => out.push_str("NUMBER(3)"),
            Value::Int16(..) | Value::UInt16(..) => out.push_str("NUMBER(5)"),
            Value::Int32(..) | Value::UInt32(..) => out.push_str("NUMBER(10)"),
            Value::Int64(..) | Value::Interval(..) => out.push_str("NUMBER(19)"),
            Value::UInt64(..) => out.push_str("NUMBER(20)"),
            Value::Float32(..) => out.push_str("BINARY_FLOAT"),
            Value::Float64(..) => out.push_str("BINARY_DOUBLE"),
            Value::Decimal(..) => out.push_str("NUMBER(38,10)"),
            Value::Char(..) => out.push_str("CHAR(1)"),
            Value::Varchar(..) | Value::List(..) => out.push_str("VARCHAR2(4000)"),
            Value::Blob(..) => out.push_str("BLOB"),
            Value::Date(..) => out.push_str("DATE"),
            Value::Time(..) | Value::Timestamp(..) => out.push_str("TIMESTAMP"),
            Value::TimestampWithTimezone(..) => out.push_str("TIMESTAMP WITH TIME ZONE"),
            Value::Uuid(..) => out.push_str("CHAR(36)"),
            Value::Null => log::error!("Cannot write the type of a NULL prototype"),
        };
    }

    fn write_value_bool(&self, _context: &Context, out: &mut String, value: bool) {
        out.push(if value { '1' } else { '0' });
    }

    fn write_value_blob(&self, _context: &Context, out: &mut String, value: &[u8]) {
        out.push_str("HEXTORAW('");
        for b in value {
            let _ = write!(out, "{:02X}", b);
        }
        out.push_str("')");
    }

    fn write_value_temporal(&self, _context: &Context, out: &mut String, value: &Value) {
        match value {
            Value::Date(..) => out.push_str("DATE '"),
            Value::Timestamp(..) | Value::TimestampWithTimezone(..) => out.push_str("TIMESTAMP '"),
            _ => out.push('\''),
        }
        write_temporal(out, value);
        out.push('\'');
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
            BinaryOp::Remainder => drop(write!(out, "MOD({}, {})", lhs, rhs)),
            BinaryOp::BitAnd => drop(write!(out, "BITAND({}, {})", lhs, rhs)),
            BinaryOp::BitOr => drop(write!(out, "({} + {} - BITAND({}, {}))", lhs, rhs, lhs, rhs)),
            BinaryOp::BitXor => drop(write!(
                out,
                "({} + {} - 2 * BITAND({}, {}))",
                lhs, rhs, lhs, rhs
            )),
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight => {
                return Err(QuillError::unsupported(
                    "bit shifts are not available in Oracle",
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

    fn write_bitwise_not(&self, _context: &Context, out: &mut String, operand: &str) -> Result<()> {
        let _ = write!(out, "(-1 - {})", operand);
        Ok(())
    }

    fn write_date_part(&self, _context: &Context, out: &mut String, part: DatePart, operand: &str) {
        match part {
            DatePart::Date => drop(write!(out, "TRUNC({})", operand)),
            DatePart::Time => drop(write!(out, "TO_CHAR({}, 'HH24:MI:SS')", operand)),
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
            "{} {} NUMTODSINTERVAL(({}) / 1000000, 'SECOND')",
            date,
            if subtract { '-' } else { '+' },
            interval
        );
    }

    fn write_truncated_division(&self, _context: &Context, out: &mut String, lhs: &str, rhs: i64) {
        let _ = write!(out, "TRUNC(({}) / {})", lhs, rhs);
    }

    /// Paging wraps the query numbering its rows, the inner columns are renamed `c0`, `c1`, ...
    fn write_select_body(&self, out: &mut String, select: &SelectStatement) -> Result<()> {
        if !select.is_paged() {
            return self.write_select_clauses(out, select);
        }
        if select.order_by.is_empty() {
            return Err(QuillError::Paging {
                dialect: self.name(),
                message: "ROW_NUMBER paging requires an ORDER BY clause".into(),
            }
            .into());
        }
        let context = Context::new(crate::Fragment::SqlSelect, true);
        let aliased = select
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| SelectColumn {
                sql: column.sql.clone(),
                alias: Some(format!("c{}", i)),
            })
            .collect::<Vec<_>>();
        let mut numbered = String::new();
        if select.distinct {
            // Rows are numbered after DISTINCT removed the duplicates, ordering by the selected aliases
            let order_by = select
                .order_by
                .iter()
                .map(|(sql, order)| {
                    let index = select.columns.iter().position(|v| v.sql == *sql).ok_or_else(|| {
                        QuillError::Paging {
                            dialect: self.name(),
                            message: format!(
                                "the DISTINCT query is ordered by `{}` which is not selected",
                                sql
                            ),
                        }
                    })?;
                    Ok((format!("\"c{}\"", index), *order))
                })
                .collect::<Result<Vec<_>>>()?;
            let mut over = String::new();
            self.write_order_by(
                &context,
                &mut over,
                &SelectStatement {
                    order_by,
                    ..select.unordered()
                },
            );
            numbered.push_str("SELECT ");
            separated_by(
                &mut numbered,
                0..select.columns.len(),
                |out, i| {
                    let _ = write!(out, "\"c{}\"", i);
                },
                ", ",
            );
            let _ = write!(
                numbered,
                ", ROW_NUMBER() OVER (ORDER BY {}) AS \"{}\" FROM (\n",
                over, ROW_NUMBER_COLUMN
            );
            self.write_select_clauses(
                &mut numbered,
                &SelectStatement {
                    columns: aliased,
                    ..select.unordered()
                },
            )?;
            numbered.push_str("\n) d");
        } else {
            let mut over = String::new();
            self.write_order_by(&context, &mut over, select);
            let mut columns = aliased;
            columns.push(SelectColumn {
                sql: format!("ROW_NUMBER() OVER (ORDER BY {})", over),
                alias: Some(ROW_NUMBER_COLUMN.into()),
            });
            self.write_select_clauses(
                &mut numbered,
                &SelectStatement {
                    columns,
                    ..select.unordered()
                },
            )?;
        }
        out.push_str("SELECT ");
        separated_by(
            out,
            select.columns.iter().enumerate(),
            |out, (i, column)| {
                let _ = write!(out, "\"c{}\"", i);
                if let Some(alias) = &column.alias {
                    out.push_str(" AS ");
                    self.write_identifier_quoted(&context, out, alias);
                }
            },
            ", ",
        );
        out.push_str(" FROM (\n");
        out.push_str(&numbered);
        out.push_str("\n) q\nWHERE ");
        let skip = select.skip.unwrap_or(0);
        let _ = write!(out, "\"{}\" > {}", ROW_NUMBER_COLUMN, skip);
        if let Some(take) = select.take {
            let _ = write!(
                out,
                " AND \"{}\" <= {}",
                ROW_NUMBER_COLUMN,
                skip.saturating_add(take)
            );
        }
        let _ = write!(out, "\nORDER BY \"{}\"", ROW_NUMBER_COLUMN);
        Ok(())
    }

    /// `RETURNING .. INTO` needs an output bind, which commands cannot carry.
    fn write_identity_retrieval(
        &self,
        _context: &Context,
        _out: &mut String,
        mapper: &EntityMapper,
        identity: &MemberMapper,
    ) -> Result<()> {
        Err(QuillError::unsupported(
            format!("returning the generated `{}` from an insert", identity.name),
            mapper.name(),
            "insert",
        )
        .into())
    }

    /// Several statements run as one anonymous block.
    fn write_batch(&self, out: &mut String, statements: &[String]) {
        if statements.len() < 2 {
            separated_by(out, statements, |out, v| out.push_str(v), "\n");
            return;
        }
        out.push_str("BEGIN\n");
        separated_by(out, statements, |out, v| out.push_str(v), "\n");
        out.push_str("\nEND;");
    }

    fn write_if_not_exists(&self, _context: &Context, _out: &mut String) {}

    fn write_if_exists(&self, _context: &Context, _out: &mut String) {}
}
