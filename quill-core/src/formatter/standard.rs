use crate::{
    ATOMIC, BinaryOp, DatePart, FormatCall, FormatterEntry, IntervalUnit, Params, QuillError,
    Result, SegmentKind, SqlSegment, TypeKey, Value, Visitor, eval_binary,
};

const STR: &[TypeKey] = &[TypeKey::Str];
const STR_STR: &[TypeKey] = &[TypeKey::Str, TypeKey::Str];
const NUM: &[TypeKey] = &[TypeKey::Float];
const NUM_NUM: &[TypeKey] = &[TypeKey::Float, TypeKey::Float];
const ANY: &[TypeKey] = &[TypeKey::Any];
const INT: &[TypeKey] = &[TypeKey::Int];
const INT_INT: &[TypeKey] = &[TypeKey::Int, TypeKey::Int];
const STR_INT: &[TypeKey] = &[TypeKey::Str, TypeKey::Int];
const STR_INT_INT: &[TypeKey] = &[TypeKey::Str, TypeKey::Int, TypeKey::Int];
const STR_STR_STR: &[TypeKey] = &[TypeKey::Str, TypeKey::Str, TypeKey::Str];
const LIST_ANY: &[TypeKey] = &[TypeKey::List, TypeKey::Any];

/// Result of the comparison operators, `LIKE` included.
pub const COMPARISON: i32 = 40;

pub(crate) fn operand(operands: &[SqlSegment], index: usize) -> Result<&SqlSegment> {
    operands.get(index).ok_or_else(|| {
        QuillError::Internal(format!("formatter expected operand {}", index)).into()
    })
}

pub fn render_all(visitor: &mut Visitor<'_>, operands: &[SqlSegment]) -> Result<Vec<String>> {
    operands.iter().map(|v| visitor.render(v)).collect()
}

fn result_type(operands: &[SqlSegment]) -> TypeKey {
    operands.first().map(|v| v.value_type).unwrap_or(TypeKey::Any)
}

/// Function call `NAME(receiver, args...)`, typed as the first operand unless `value_type` is given.
pub fn function(
    name: &'static str,
    value_type: Option<TypeKey>,
) -> impl Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static {
    move |v: &mut Visitor<'_>, call: FormatCall| {
        let operands = call.operands();
        let args = render_all(v, &operands)?;
        let value_type = value_type.unwrap_or_else(|| result_type(&operands));
        Ok(SqlSegment::call(format!("{}({})", name, args.join(", ")), value_type).merge_all(&operands))
    }
}

/// Fixed SQL text, `CURRENT_TIMESTAMP`.
pub fn keyword(
    sql: &'static str,
    value_type: TypeKey,
) -> impl Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static {
    move |_: &mut Visitor<'_>, _: FormatCall| Ok(SqlSegment::call(sql.into(), value_type))
}

fn fill(pattern: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(pattern.len() + args.iter().map(String::len).sum::<usize>());
    let mut rest = pattern;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let placeholder = rest
            .find('}')
            .and_then(|end| Some((end, rest[1..end].parse::<usize>().ok()?)));
        match placeholder {
            Some((end, i)) if i < args.len() => {
                out.push_str(&args[i]);
                rest = &rest[end + 1..];
            }
            _ => {
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// SQL text with the operands replacing `{0}`, `{1}`, ... in order receiver first.
pub fn template(
    pattern: &'static str,
    value_type: Option<TypeKey>,
    precedence: i32,
) -> impl Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static {
    move |v: &mut Visitor<'_>, call: FormatCall| {
        let operands = call.operands();
        let args = render_all(v, &operands)?;
        let value_type = value_type.unwrap_or_else(|| result_type(&operands));
        Ok(
            SqlSegment::sql(SegmentKind::Call, fill(pattern, &args), value_type, precedence)
                .merge_all(&operands),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wildcard {
    Contains,
    StartsWith,
    EndsWith,
}

fn escape_like(value: &str) -> (String, bool) {
    let mut out = String::with_capacity(value.len() + 2);
    let mut escaped = false;
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
            escaped = true;
        }
        out.push(c);
    }
    (out, escaped)
}

fn like_pattern(
    wildcard: Wildcard,
) -> impl Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static {
    move |v: &mut Visitor<'_>, call: FormatCall| {
        let negated = call.deferred.negated();
        let operands = call.operands();
        let (target, pattern) = (operand(&operands, 0)?, operand(&operands, 1)?);
        let lhs = v.render_operand(target, COMPARISON + 1)?;
        let text = match pattern.constant_value() {
            Some(Value::Varchar(Some(text))) => Some(text.clone()),
            Some(Value::Char(Some(c))) => Some(c.to_string()),
            _ => None,
        };
        let (rhs, escape) = match text {
            Some(text) => {
                let (text, escape) = escape_like(&text);
                let text = match wildcard {
                    Wildcard::Contains => format!("%{}%", text),
                    Wildcard::StartsWith => format!("{}%", text),
                    Wildcard::EndsWith => format!("%{}", text),
                };
                (v.render_constant(Value::Varchar(Some(text))), escape)
            }
            None => {
                let inner = v.render_operand(pattern, BinaryOp::Add.precedence() + 1)?;
                let mut percent = String::new();
                v.writer.write_value_string(&v.context, &mut percent, "%");
                let parts = match wildcard {
                    Wildcard::Contains => vec![percent.clone(), inner, percent],
                    Wildcard::StartsWith => vec![inner, percent],
                    Wildcard::EndsWith => vec![percent, inner],
                };
                let mut out = String::new();
                v.writer.write_concat(&v.context, &mut out, &parts);
                (out, false)
            }
        };
        let mut out = String::new();
        v.writer
            .write_like(&v.context, &mut out, &lhs, &rhs, negated, escape);
        Ok(SqlSegment::predicate(out, COMPARISON).merge_all(&operands))
    }
}

fn like(v: &mut Visitor<'_>, call: FormatCall) -> Result<SqlSegment> {
    let negated = call.deferred.negated();
    let operands = call.operands();
    let lhs = v.render_operand(operand(&operands, 0)?, COMPARISON + 1)?;
    let rhs = v.render_operand(operand(&operands, 1)?, COMPARISON + 1)?;
    let mut out = String::new();
    v.writer
        .write_like(&v.context, &mut out, &lhs, &rhs, negated, false);
    Ok(SqlSegment::predicate(out, COMPARISON).merge_all(&operands))
}

fn equals(v: &mut Visitor<'_>, call: FormatCall) -> Result<SqlSegment> {
    let negated = call.deferred.negated();
    let operands = call.operands();
    let (lhs, rhs) = (operand(&operands, 0)?, operand(&operands, 1)?);
    let null = |v: &SqlSegment| v.constant_value().is_some_and(Value::is_null);
    if null(lhs) || null(rhs) {
        let target = if null(lhs) { rhs } else { lhs };
        let text = v.render_operand(target, COMPARISON + 1)?;
        let check = if negated { "IS NOT NULL" } else { "IS NULL" };
        return Ok(SqlSegment::predicate(format!("{} {}", text, check), COMPARISON).merge(target));
    }
    let l = v.coerce_segment(lhs.clone(), rhs)?;
    let r = v.coerce_segment(rhs.clone(), lhs)?;
    let op = if negated {
        BinaryOp::NotEqual
    } else {
        BinaryOp::Equal
    };
    let l = v.render_operand(&l, COMPARISON + 1)?;
    let r = v.render_operand(&r, COMPARISON + 1)?;
    let mut out = String::new();
    v.writer.write_binary(&v.context, &mut out, op, &l, &r)?;
    Ok(SqlSegment::sql(SegmentKind::Comparison, out, TypeKey::Bool, COMPARISON).merge_all(&operands))
}

fn empty_literal(v: &Visitor<'_>) -> String {
    let mut out = String::new();
    v.writer.write_value_string(&v.context, &mut out, "");
    out
}

fn is_empty(v: &mut Visitor<'_>, call: FormatCall) -> Result<SqlSegment> {
    let negated = call.deferred.negated();
    let operands = call.operands();
    let target = operand(&operands, 0)?;
    let text = v.render_operand(target, COMPARISON + 1)?;
    let empty = empty_literal(v);
    let op = if negated { "<>" } else { "=" };
    Ok(SqlSegment::predicate(format!("{} {} {}", text, op, empty), COMPARISON).merge(target))
}

fn is_null_or_empty(v: &mut Visitor<'_>, call: FormatCall) -> Result<SqlSegment> {
    let negated = call.deferred.negated();
    let operands = call.operands();
    let target = operand(&operands, 0)?;
    let t = v.render_operand(target, COMPARISON + 1)?;
    let empty = empty_literal(v);
    let text = if negated {
        format!("({} IS NOT NULL AND {} <> {})", t, t, empty)
    } else {
        format!("({} IS NULL OR {} = {})", t, t, empty)
    };
    Ok(SqlSegment::predicate(text, ATOMIC).merge(target))
}

/// Membership of a value in a sequence, the sequence comes first among the operands.
fn in_list(v: &mut Visitor<'_>, call: FormatCall) -> Result<SqlSegment> {
    let negated = call.deferred.negated();
    let operands = call.operands();
    let (list, item) = (operand(&operands, 0)?, operand(&operands, 1)?);
    let target = v.render_operand(item, COMPARISON + 1)?;
    let Some(value) = list.constant_value() else {
        if list.kind != SegmentKind::List {
            return Err(QuillError::unsupported(
                "membership in a sequence computed by the database",
                TypeKey::Seq,
                "contains",
            )
            .into());
        }
        let text = format!(
            "{} {}IN ({})",
            target,
            if negated { "NOT " } else { "" },
            v.render(list)?
        );
        return Ok(SqlSegment::predicate(text, COMPARISON).merge_all(&operands));
    };
    let values = match value {
        Value::List(Some(items), ..) => items.clone(),
        null if null.is_null() => Vec::new(),
        other => {
            return Err(QuillError::unsupported(
                format!("{} is not a sequence", other.type_name()),
                TypeKey::Seq,
                "contains",
            )
            .into());
        }
    };
    if values.is_empty() {
        if negated {
            return Ok(SqlSegment::constant(Value::Boolean(Some(true))));
        }
        return Ok(SqlSegment::predicate(format!("{} IN (NULL)", target), COMPARISON).merge(item));
    }
    let values = values
        .into_iter()
        .map(|value| v.coerce(value, item))
        .collect::<Result<Vec<_>>>()?;
    if v.writer.supports_array_parameter() && !v.options.inline_constants {
        let prototype = values.first().map(Value::as_null).unwrap_or_default();
        let parameter = v.add_parameter(Value::List(Some(values), Box::new(prototype)));
        let text = if negated {
            format!("{} <> ALL({})", target, parameter)
        } else {
            format!("{} = ANY({})", target, parameter)
        };
        return Ok(SqlSegment::predicate(text, COMPARISON).merge(item));
    }
    let rendered = values
        .into_iter()
        .map(|value| v.render_constant(value))
        .collect::<Vec<_>>();
    let text = format!(
        "{} {}IN ({})",
        target,
        if negated { "NOT " } else { "" },
        rendered.join(", ")
    );
    Ok(SqlSegment::predicate(text, COMPARISON).merge(item))
}

fn concat(v: &mut Visitor<'_>, call: FormatCall) -> Result<SqlSegment> {
    let operands = call.operands();
    let precedence = BinaryOp::Add.precedence();
    let parts = operands
        .iter()
        .map(|s| v.render_operand(s, precedence + 1))
        .collect::<Result<Vec<_>>>()?;
    let mut out = String::new();
    v.writer.write_concat(&v.context, &mut out, &parts);
    Ok(SqlSegment::sql(SegmentKind::Concat, out, TypeKey::Str, precedence).merge_all(&operands))
}

/// `Str::format("{} ({})", a, b)`, the literal pieces interleaved with the arguments.
fn format(v: &mut Visitor<'_>, call: FormatCall) -> Result<SqlSegment> {
    let operands = call.operands();
    let Some((format, args)) = operands.split_first() else {
        return Err(QuillError::Internal("format without arguments".into()).into());
    };
    let Some(Value::Varchar(Some(format_text))) = format.constant_value() else {
        return Err(QuillError::unsupported(
            "the format string must be a constant",
            TypeKey::Str,
            "format",
        )
        .into());
    };
    let pieces = format_text.split("{}").collect::<Vec<_>>();
    if pieces.len() != args.len() + 1 {
        return Err(QuillError::unsupported(
            format!(
                "{} placeholders but {} arguments",
                pieces.len() - 1,
                args.len()
            ),
            TypeKey::Str,
            "format",
        )
        .into());
    }
    let precedence = BinaryOp::Add.precedence();
    let mut parts = Vec::with_capacity(pieces.len() * 2);
    for (i, piece) in pieces.iter().enumerate() {
        if !piece.is_empty() {
            let mut literal = String::new();
            v.writer.write_value_string(&v.context, &mut literal, piece);
            parts.push(literal);
        }
        if let Some(arg) = args.get(i) {
            parts.push(v.render_operand(arg, precedence + 1)?);
        }
    }
    if parts.is_empty() {
        return Ok(SqlSegment::constant(Value::Varchar(Some(String::new()))));
    }
    let mut out = String::new();
    v.writer.write_concat(&v.context, &mut out, &parts);
    Ok(SqlSegment::sql(SegmentKind::Concat, out, TypeKey::Str, precedence).merge_all(args))
}

/// `substring(s, start, len)` with a zero based start, `default_length` completes the two
/// arguments form for dialects requiring the length.
pub fn substring(
    name: &'static str,
    default_length: Option<&'static str>,
) -> impl Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static {
    move |v: &mut Visitor<'_>, call: FormatCall| {
        let operands = call.operands();
        let (target, start) = (operand(&operands, 0)?, operand(&operands, 1)?);
        let text = v.render(target)?;
        let start = match start.constant_value() {
            Some(value) => {
                let shifted = eval_binary(BinaryOp::Add, value, &Value::Int64(Some(1)))?;
                v.render_constant(shifted)
            }
            None => format!(
                "{} + 1",
                v.render_operand(start, BinaryOp::Add.precedence())?
            ),
        };
        let length = match (operands.get(2), default_length) {
            (Some(length), ..) => Some(v.render(length)?),
            (None, Some(function)) => Some(format!("{}({})", function, text)),
            (None, None) => None,
        };
        let mut out = format!("{}({}, {}", name, text, start);
        if let Some(length) = length {
            out.push_str(", ");
            out.push_str(&length);
        }
        out.push(')');
        Ok(SqlSegment::call(out, TypeKey::Str).merge_all(&operands))
    }
}

pub fn date_part(
    part: DatePart,
) -> impl Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static {
    move |v: &mut Visitor<'_>, call: FormatCall| {
        let operands = call.operands();
        let target = operand(&operands, 0)?;
        let text = v.render(target)?;
        let mut out = String::new();
        v.writer.write_date_part(&v.context, &mut out, part, &text);
        let value_type = match part {
            DatePart::Date => TypeKey::Date,
            DatePart::Time => TypeKey::Time,
            _ => TypeKey::Int,
        };
        Ok(SqlSegment::call(out, value_type).merge(target))
    }
}

fn interval_from(
    unit: IntervalUnit,
) -> impl Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static {
    move |v: &mut Visitor<'_>, call: FormatCall| {
        let operands = call.operands();
        let amount = operand(&operands, 0)?;
        let precedence = BinaryOp::Multiply.precedence();
        let text = v.render_operand(amount, precedence + 1)?;
        let mut out = String::new();
        v.writer.write_interval_from(&v.context, &mut out, &text, unit);
        Ok(
            SqlSegment::sql(SegmentKind::Arithmetic, out, TypeKey::Interval, precedence)
                .merge(amount),
        )
    }
}

fn interval_micros(v: &mut Visitor<'_>, call: &FormatCall) -> Result<String> {
    let target = call
        .receiver
        .as_ref()
        .ok_or_else(|| QuillError::Internal("interval member without receiver".into()))?;
    let text = v.render_operand(target, ATOMIC)?;
    let mut out = String::new();
    v.writer.write_interval_micros(&v.context, &mut out, &text);
    Ok(out)
}

fn whole(
    unit: IntervalUnit,
) -> impl Fn(&mut Visitor<'_>, FormatCall) -> Result<SqlSegment> + Send + Sync + 'static {
    move |v: &mut Visitor<'_>, call: FormatCall| {
        let micros = interval_micros(v, &call)?;
        let mut out = String::new();
        v.writer
            .write_truncated_division(&v.context, &mut out, &micros, unit.micros());
        Ok(SqlSegment::call(out, TypeKey::Int).merge_all(&call.operands()))
    }
}

fn as_seconds(v: &mut Visitor<'_>, call: FormatCall) -> Result<SqlSegment> {
    let micros = interval_micros(v, &call)?;
    Ok(SqlSegment::sql(
        SegmentKind::Arithmetic,
        format!("({}) / 1000000.0", micros),
        TypeKey::Float,
        BinaryOp::Divide.precedence(),
    )
    .merge_all(&call.operands()))
}

/// Static math function also callable as a method of its first argument, `x.abs()`.
fn math(
    entries: &mut Vec<FormatterEntry>,
    name: &'static str,
    sql: &'static str,
    arity: usize,
    value_type: Option<TypeKey>,
) {
    let (statics, instance) = match arity {
        1 => (Params::Exact(NUM), Params::None),
        _ => (Params::Exact(NUM_NUM), Params::Exact(NUM)),
    };
    entries.push(FormatterEntry::static_method(
        TypeKey::Math,
        name,
        statics,
        function(sql, value_type),
    ));
    entries.push(FormatterEntry::method(
        TypeKey::Float,
        name,
        instance,
        function(sql, value_type),
    ));
}

/// Formatters shared by every dialect, consulted after the dialect ones.
pub fn standard_entries() -> Vec<FormatterEntry> {
    use FormatterEntry as F;
    use TypeKey::*;
    let mut entries = vec![
        // Membership, the order of the three shapes decides which one wins
        F::static_method(Seq, "contains", Params::Exact(LIST_ANY), in_list).negatable(),
        F::method(List, "contains", Params::Exact(ANY), in_list).negatable(),
        F::method(Str, "contains", Params::Exact(STR), like_pattern(Wildcard::Contains))
            .negatable(),
        F::method(Str, "starts_with", Params::Exact(STR), like_pattern(Wildcard::StartsWith))
            .negatable(),
        F::method(Str, "ends_with", Params::Exact(STR), like_pattern(Wildcard::EndsWith))
            .negatable(),
        F::method(Str, "eq", Params::Exact(STR), equals).negatable(),
        F::method(Str, "equals", Params::Exact(STR), equals).negatable(),
        F::method(Str, "like", Params::Exact(STR), like).negatable(),
        F::static_method(Str, "like", Params::Exact(STR_STR), like).negatable(),
        F::member(Str, "is_empty", is_empty).negatable(),
        F::member(Str, "is_null_or_empty", is_null_or_empty).negatable(),
        F::static_method(Str, "is_null_or_empty", Params::Exact(STR), is_null_or_empty)
            .negatable(),
        F::member(Str, "len", function("LENGTH", Some(Int))),
        F::member(Str, "length", function("LENGTH", Some(Int))),
        F::member(Str, "to_uppercase", function("UPPER", Some(Str))),
        F::member(Str, "to_upper", function("UPPER", Some(Str))),
        F::member(Str, "to_lowercase", function("LOWER", Some(Str))),
        F::member(Str, "to_lower", function("LOWER", Some(Str))),
        F::member(Str, "trim", function("TRIM", Some(Str))),
        F::member(Str, "trim_start", function("LTRIM", Some(Str))),
        F::member(Str, "trim_end", function("RTRIM", Some(Str))),
        F::method(Str, "replace", Params::Exact(STR_STR), function("REPLACE", Some(Str))),
        F::method(Str, "substring", Params::Exact(INT), substring("SUBSTRING", None)),
        F::method(Str, "substring", Params::Exact(INT_INT), substring("SUBSTRING", None)),
        F::method(
            Str,
            "index_of",
            Params::Exact(STR),
            template("POSITION({1} IN {0}) - 1", Some(Int), 60),
        ),
        F::static_method(Str, "concat", Params::Variadic(1), concat),
        F::static_method(Str, "format", Params::Variadic(1), format),
        F::static_method(Str, "substring", Params::Exact(STR_INT), substring("SUBSTRING", None)),
        F::static_method(
            Str,
            "substring",
            Params::Exact(STR_INT_INT),
            substring("SUBSTRING", None),
        ),
        F::static_method(
            Str,
            "index_of",
            Params::Exact(STR_STR),
            template("POSITION({1} IN {0}) - 1", Some(Int), 60),
        ),
        F::static_method(Str, "replace", Params::Exact(STR_STR_STR), function("REPLACE", Some(Str))),
        // Clock
        F::static_member(DateTime, "now", keyword("CURRENT_TIMESTAMP", DateTime)),
        F::static_member(DateTime, "utc_now", keyword("CURRENT_TIMESTAMP", DateTime)),
        F::static_member(DateTime, "today", keyword("CURRENT_DATE", Date)),
        F::static_member(Date, "today", keyword("CURRENT_DATE", Date)),
        // Interval
        F::static_method(Interval, "weeks", Params::Exact(INT), interval_from(IntervalUnit::Week)),
        F::static_method(Interval, "days", Params::Exact(INT), interval_from(IntervalUnit::Day)),
        F::static_method(Interval, "hours", Params::Exact(INT), interval_from(IntervalUnit::Hour)),
        F::static_method(
            Interval,
            "minutes",
            Params::Exact(INT),
            interval_from(IntervalUnit::Minute),
        ),
        F::static_method(
            Interval,
            "seconds",
            Params::Exact(INT),
            interval_from(IntervalUnit::Second),
        ),
        F::static_method(
            Interval,
            "milliseconds",
            Params::Exact(INT),
            interval_from(IntervalUnit::Millisecond),
        ),
        F::static_method(
            Interval,
            "microseconds",
            Params::Exact(INT),
            interval_from(IntervalUnit::Microsecond),
        ),
        F::member(Interval, "whole_weeks", whole(IntervalUnit::Week)),
        F::member(Interval, "whole_days", whole(IntervalUnit::Day)),
        F::member(Interval, "whole_hours", whole(IntervalUnit::Hour)),
        F::member(Interval, "whole_minutes", whole(IntervalUnit::Minute)),
        F::member(Interval, "whole_seconds", whole(IntervalUnit::Second)),
        F::member(Interval, "whole_milliseconds", whole(IntervalUnit::Millisecond)),
        F::member(Interval, "as_seconds_f64", as_seconds),
        // Aggregates
        F::static_method(Sql, "count", Params::Exact(ANY), function("COUNT", Some(Int))),
        F::static_member(Sql, "count_all", keyword("COUNT(*)", Int)),
        F::static_method(
            Sql,
            "count_distinct",
            Params::Exact(ANY),
            template("COUNT(DISTINCT {0})", Some(Int), ATOMIC),
        ),
        F::static_method(Sql, "sum", Params::Exact(ANY), function("SUM", None)),
        F::static_method(Sql, "avg", Params::Exact(ANY), function("AVG", Some(Float))),
        F::static_method(Sql, "min", Params::Exact(ANY), function("MIN", None)),
        F::static_method(Sql, "max", Params::Exact(ANY), function("MAX", None)),
    ];
    for declaring in [Date, DateTime, DateTimeTz] {
        for (name, part) in [
            ("year", DatePart::Year),
            ("month", DatePart::Month),
            ("day", DatePart::Day),
            ("hour", DatePart::Hour),
            ("minute", DatePart::Minute),
            ("second", DatePart::Second),
            ("date", DatePart::Date),
            ("time", DatePart::Time),
        ] {
            entries.push(F::member(declaring, name, date_part(part)));
        }
    }
    for (name, part) in [
        ("hour", DatePart::Hour),
        ("minute", DatePart::Minute),
        ("second", DatePart::Second),
    ] {
        entries.push(F::member(Time, name, date_part(part)));
    }
    math(&mut entries, "abs", "ABS", 1, None);
    math(&mut entries, "floor", "FLOOR", 1, None);
    math(&mut entries, "ceil", "CEIL", 1, None);
    math(&mut entries, "round", "ROUND", 1, None);
    math(&mut entries, "round", "ROUND", 2, None);
    math(&mut entries, "sqrt", "SQRT", 1, Some(Float));
    math(&mut entries, "pow", "POWER", 2, Some(Float));
    math(&mut entries, "powi", "POWER", 2, Some(Float));
    math(&mut entries, "powf", "POWER", 2, Some(Float));
    math(&mut entries, "signum", "SIGN", 1, None);
    math(&mut entries, "max", "GREATEST", 2, None);
    math(&mut entries, "min", "LEAST", 2, None);
    entries
}

/// Math entries of a dialect, overriding the standard ones by name.
pub fn math_entries(overrides: &[(&'static str, &'static str, usize)]) -> Vec<FormatterEntry> {
    let mut entries = Vec::new();
    for (name, sql, arity) in overrides {
        math(&mut entries, name, sql, *arity, None);
    }
    entries
}

/// `CASE` based maximum and minimum for dialects without `GREATEST` and `LEAST`.
pub fn case_extremes() -> Vec<FormatterEntry> {
    let mut entries = Vec::new();
    for (name, pattern) in [
        ("max", "CASE WHEN {0} >= {1} THEN {0} ELSE {1} END"),
        ("min", "CASE WHEN {0} <= {1} THEN {0} ELSE {1} END"),
    ] {
        entries.push(FormatterEntry::static_method(
            TypeKey::Math,
            name,
            Params::Exact(NUM_NUM),
            template(pattern, None, ATOMIC),
        ));
        entries.push(FormatterEntry::method(
            TypeKey::Float,
            name,
            Params::Exact(NUM),
            template(pattern, None, ATOMIC),
        ));
    }
    entries
}

/// `index_of` for both the method and the static form.
pub fn index_of_entries(pattern: &'static str) -> Vec<FormatterEntry> {
    vec![
        FormatterEntry::method(
            TypeKey::Str,
            "index_of",
            Params::Exact(STR),
            template(pattern, Some(TypeKey::Int), 60),
        ),
        FormatterEntry::static_method(
            TypeKey::Str,
            "index_of",
            Params::Exact(STR_STR),
            template(pattern, Some(TypeKey::Int), 60),
        ),
    ]
}

/// `substring` for the method and static forms, with and without length.
pub fn substring_entries(
    name: &'static str,
    default_length: Option<&'static str>,
) -> Vec<FormatterEntry> {
    vec![
        FormatterEntry::method(
            TypeKey::Str,
            "substring",
            Params::Exact(INT),
            substring(name, default_length),
        ),
        FormatterEntry::method(
            TypeKey::Str,
            "substring",
            Params::Exact(INT_INT),
            substring(name, default_length),
        ),
        FormatterEntry::static_method(
            TypeKey::Str,
            "substring",
            Params::Exact(STR_INT),
            substring(name, default_length),
        ),
        FormatterEntry::static_method(
            TypeKey::Str,
            "substring",
            Params::Exact(STR_INT_INT),
            substring(name, default_length),
        ),
    ]
}

/// String length entries, `len` and `length`.
pub fn length_entries(function_name: &'static str) -> Vec<FormatterEntry> {
    ["len", "length"]
        .into_iter()
        .map(|name| {
            FormatterEntry::member(TypeKey::Str, name, function(function_name, Some(TypeKey::Int)))
        })
        .collect()
}

/// Clock entries, `None` keeps the standard rendering.
pub fn clock_entries(
    now: &'static str,
    utc_now: &'static str,
    today: Option<&'static str>,
) -> Vec<FormatterEntry> {
    let mut entries = vec![
        FormatterEntry::static_member(TypeKey::DateTime, "now", keyword(now, TypeKey::DateTime)),
        FormatterEntry::static_member(
            TypeKey::DateTime,
            "utc_now",
            keyword(utc_now, TypeKey::DateTime),
        ),
    ];
    if let Some(today) = today {
        entries.push(FormatterEntry::static_member(
            TypeKey::DateTime,
            "today",
            keyword(today, TypeKey::Date),
        ));
        entries.push(FormatterEntry::static_member(
            TypeKey::Date,
            "today",
            keyword(today, TypeKey::Date),
        ));
    }
    entries
}

pub fn new_uuid(sql: &'static str) -> FormatterEntry {
    FormatterEntry::static_member(TypeKey::Uuid, "new_v4", keyword(sql, TypeKey::Uuid))
}

#[cfg(test)]
mod tests {
    use super::fill;

    #[test]
    fn fill_placeholders() {
        let args = ["a".to_string(), "b".to_string()];
        assert_eq!(fill("INSTR({0}, {1}) - 1", &args), "INSTR(a, b) - 1");
        assert_eq!(
            fill("CASE WHEN {0} >= {1} THEN {0} ELSE {1} END", &args),
            "CASE WHEN a >= b THEN a ELSE b END"
        );
        assert_eq!(fill("{x} {5} {0}", &args), "{x} {5} a");
    }
}
