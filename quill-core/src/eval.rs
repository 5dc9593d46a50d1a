//! In process evaluation of constant sub-trees.
//!
//! Every deterministic member and method with a formatter has an evaluator here, so a sub-tree
//! made only of constants folds to a single value instead of being rendered as SQL.
use crate::{BinaryOp, QuillError, Result, TypeKey, UnaryOp, Value, convert};
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::cmp::Ordering;
use time::Duration;

enum Number {
    Integer(i128),
    Float(f64),
    Decimal(Decimal),
}

fn number(value: &Value) -> Option<Number> {
    Some(match value {
        Value::Int8(Some(v)) => Number::Integer(*v as i128),
        Value::Int16(Some(v)) => Number::Integer(*v as i128),
        Value::Int32(Some(v)) => Number::Integer(*v as i128),
        Value::Int64(Some(v)) => Number::Integer(*v as i128),
        Value::UInt8(Some(v)) => Number::Integer(*v as i128),
        Value::UInt16(Some(v)) => Number::Integer(*v as i128),
        Value::UInt32(Some(v)) => Number::Integer(*v as i128),
        Value::UInt64(Some(v)) => Number::Integer(*v as i128),
        Value::Float32(Some(v)) => Number::Float(*v as f64),
        Value::Float64(Some(v)) => Number::Float(*v),
        Value::Decimal(Some(v)) => Number::Decimal(*v),
        _ => return None,
    })
}

fn integer_rank(value: &Value) -> u8 {
    match value {
        Value::Int8(..) | Value::UInt8(..) => 1,
        Value::Int16(..) | Value::UInt16(..) => 2,
        Value::Int32(..) | Value::UInt32(..) => 3,
        Value::Int64(..) | Value::UInt64(..) => 4,
        _ => 0,
    }
}

/// Prototype of the result of an arithmetic operation between `lhs` and `rhs`.
fn promoted(lhs: &Value, rhs: &Value) -> Value {
    match (lhs, rhs) {
        (Value::Decimal(..), _) | (_, Value::Decimal(..)) => Value::Decimal(None),
        (Value::Float32(..), Value::Float32(..)) => Value::Float32(None),
        (Value::Float32(..) | Value::Float64(..), _) | (_, Value::Float32(..) | Value::Float64(..)) => {
            Value::Float64(None)
        }
        _ if integer_rank(rhs) > integer_rank(lhs) => rhs.as_null(),
        _ => lhs.as_null(),
    }
}

fn decimal_of(number: Number) -> Option<Decimal> {
    match number {
        Number::Integer(v) => Decimal::from_i128(v),
        Number::Float(v) => Decimal::from_f64(v),
        Number::Decimal(v) => Some(v),
    }
}

fn float_of(number: Number) -> f64 {
    match number {
        Number::Integer(v) => v as f64,
        Number::Float(v) => v,
        Number::Decimal(v) => v.to_f64().unwrap_or(f64::NAN),
    }
}

fn overflow(op: BinaryOp, lhs: &Value, rhs: &Value) -> crate::Error {
    QuillError::Conversion {
        from: format!("{:?} {:?} {:?}", lhs, op, rhs),
        to: promoted(lhs, rhs).type_name().into(),
        value: "the result".into(),
    }
    .into()
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    let (Some(l), Some(r)) = (number(lhs), number(rhs)) else {
        return Err(QuillError::unsupported(
            format!("operator {:?} between {} and {}", op, lhs.type_name(), rhs.type_name()),
            lhs.type_key(),
            format!("{:?}", op),
        )
        .into());
    };
    let target = promoted(lhs, rhs);
    let result = match &target {
        Value::Decimal(..) => {
            let (Some(l), Some(r)) = (decimal_of(l), decimal_of(r)) else {
                return Err(overflow(op, lhs, rhs));
            };
            let v = match op {
                BinaryOp::Add => l.checked_add(r),
                BinaryOp::Subtract => l.checked_sub(r),
                BinaryOp::Multiply => l.checked_mul(r),
                BinaryOp::Divide => l.checked_div(r),
                BinaryOp::Remainder => l.checked_rem(r),
                _ => None,
            };
            Value::Decimal(Some(v.ok_or_else(|| overflow(op, lhs, rhs))?))
        }
        Value::Float32(..) | Value::Float64(..) => {
            let (l, r) = (float_of(l), float_of(r));
            let v = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Subtract => l - r,
                BinaryOp::Multiply => l * r,
                BinaryOp::Divide => l / r,
                BinaryOp::Remainder => l % r,
                _ => return Err(overflow(op, lhs, rhs)),
            };
            Value::Float64(Some(v))
        }
        _ => {
            let (Number::Integer(l), Number::Integer(r)) = (l, r) else {
                return Err(overflow(op, lhs, rhs));
            };
            let v = match op {
                BinaryOp::Add => l.checked_add(r),
                BinaryOp::Subtract => l.checked_sub(r),
                BinaryOp::Multiply => l.checked_mul(r),
                BinaryOp::Divide => l.checked_div(r),
                BinaryOp::Remainder => l.checked_rem(r),
                BinaryOp::BitAnd => Some(l & r),
                BinaryOp::BitOr => Some(l | r),
                BinaryOp::BitXor => Some(l ^ r),
                BinaryOp::ShiftLeft => u32::try_from(r).ok().and_then(|r| l.checked_shl(r)),
                BinaryOp::ShiftRight => u32::try_from(r).ok().and_then(|r| l.checked_shr(r)),
                _ => None,
            };
            let v = v.ok_or_else(|| overflow(op, lhs, rhs))?;
            let wide = match i64::try_from(v) {
                Ok(v) => Value::Int64(Some(v)),
                Err(..) => Value::UInt64(Some(
                    u64::try_from(v).map_err(|_| overflow(op, lhs, rhs))?,
                )),
            };
            return convert(wide, &target).map_err(|_| overflow(op, lhs, rhs));
        }
    };
    convert(result, &target)
}

/// Order two constants the way the host language orders them, NULL sorts first.
pub fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs.is_null(), rhs.is_null()) {
        (true, true) => return Some(Ordering::Equal),
        (true, false) => return Some(Ordering::Less),
        (false, true) => return Some(Ordering::Greater),
        _ => {}
    }
    if let (Some(l), Some(r)) = (number(lhs), number(rhs)) {
        return match (l, r) {
            (Number::Integer(l), Number::Integer(r)) => Some(l.cmp(&r)),
            (Number::Decimal(l), r) => decimal_of(r).map(|r| l.cmp(&r)),
            (l, Number::Decimal(r)) => decimal_of(l).map(|l| l.cmp(&r)),
            (l, r) => float_of(l).partial_cmp(&float_of(r)),
        };
    }
    match (lhs, rhs) {
        (Value::Boolean(l), Value::Boolean(r)) => l.partial_cmp(r),
        (Value::Varchar(l), Value::Varchar(r)) => l.partial_cmp(r),
        (Value::Char(Some(l)), Value::Varchar(Some(r))) => l.to_string().partial_cmp(r),
        (Value::Varchar(Some(l)), Value::Char(Some(r))) => l.partial_cmp(&r.to_string()),
        (Value::Char(l), Value::Char(r)) => l.partial_cmp(r),
        (Value::Blob(l), Value::Blob(r)) => l.partial_cmp(r),
        (Value::Date(l), Value::Date(r)) => l.partial_cmp(r),
        (Value::Time(l), Value::Time(r)) => l.partial_cmp(r),
        (Value::Timestamp(l), Value::Timestamp(r)) => l.partial_cmp(r),
        (Value::TimestampWithTimezone(l), Value::TimestampWithTimezone(r)) => l.partial_cmp(r),
        (Value::Interval(l), Value::Interval(r)) => l.partial_cmp(r),
        (Value::Uuid(l), Value::Uuid(r)) => l.partial_cmp(r),
        _ => None,
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Varchar(Some(v)) => Some(v.clone()),
        Value::Char(Some(v)) => Some(v.to_string()),
        _ => None,
    }
}

/// Text used when a value is concatenated to a string.
fn display(value: &Value) -> String {
    match value {
        v if v.is_null() => String::new(),
        Value::Varchar(Some(v)) => v.clone(),
        Value::Char(Some(v)) => v.to_string(),
        Value::Boolean(Some(v)) => v.to_string(),
        Value::Uuid(Some(v)) => v.to_string(),
        Value::Decimal(Some(v)) => v.to_string(),
        Value::Float32(Some(v)) => v.to_string(),
        Value::Float64(Some(v)) => v.to_string(),
        Value::Date(..) | Value::Time(..) | Value::Timestamp(..) | Value::TimestampWithTimezone(..) => {
            let mut out = String::new();
            crate::write_temporal(&mut out, value);
            out
        }
        v => match convert(v.clone(), &Value::Varchar(None)) {
            Ok(Value::Varchar(Some(v))) => v,
            _ => format!("{:?}", v),
        },
    }
}

fn temporal_arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Option<Result<Value>> {
    let negate = match op {
        BinaryOp::Add => false,
        BinaryOp::Subtract => true,
        _ => return None,
    };
    let Value::Interval(Some(interval)) = rhs else {
        return match (lhs, rhs, op) {
            (Value::Timestamp(Some(l)), Value::Timestamp(Some(r)), BinaryOp::Subtract) => {
                Some(Ok(Value::Interval(Some(*l - *r))))
            }
            (Value::Date(Some(l)), Value::Date(Some(r)), BinaryOp::Subtract) => {
                Some(Ok(Value::Interval(Some(*l - *r))))
            }
            (
                Value::TimestampWithTimezone(Some(l)),
                Value::TimestampWithTimezone(Some(r)),
                BinaryOp::Subtract,
            ) => Some(Ok(Value::Interval(Some(*l - *r)))),
            _ => None,
        };
    };
    let interval = if negate { -*interval } else { *interval };
    let result = match lhs {
        Value::Timestamp(Some(v)) => v.checked_add(interval).map(|v| Value::Timestamp(Some(v))),
        Value::TimestampWithTimezone(Some(v)) => v
            .checked_add(interval)
            .map(|v| Value::TimestampWithTimezone(Some(v))),
        Value::Date(Some(v)) => v
            .midnight()
            .checked_add(interval)
            .map(|v| Value::Timestamp(Some(v))),
        Value::Time(Some(v)) => Some(Value::Time(Some(*v + interval))),
        Value::Interval(Some(v)) => v.checked_add(interval).map(|v| Value::Interval(Some(v))),
        _ => return None,
    };
    Some(result.ok_or_else(|| overflow(op, lhs, rhs)))
}

pub fn eval_unary(op: UnaryOp, value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(value.clone());
    }
    Ok(match (op, value) {
        (UnaryOp::Not, Value::Boolean(Some(v))) => Value::Boolean(Some(!v)),
        (UnaryOp::Not, v) if v.type_key() == TypeKey::Int || v.type_key() == TypeKey::UInt => {
            match v {
                Value::Int8(Some(v)) => Value::Int8(Some(!v)),
                Value::Int16(Some(v)) => Value::Int16(Some(!v)),
                Value::Int32(Some(v)) => Value::Int32(Some(!v)),
                Value::Int64(Some(v)) => Value::Int64(Some(!v)),
                Value::UInt8(Some(v)) => Value::UInt8(Some(!v)),
                Value::UInt16(Some(v)) => Value::UInt16(Some(!v)),
                Value::UInt32(Some(v)) => Value::UInt32(Some(!v)),
                Value::UInt64(Some(v)) => Value::UInt64(Some(!v)),
                _ => unreachable!(),
            }
        }
        (UnaryOp::Negate, Value::Interval(Some(v))) => Value::Interval(Some(-*v)),
        (UnaryOp::Negate, v) => arithmetic(BinaryOp::Subtract, &v.zero(), v)?,
        (op, v) => {
            return Err(QuillError::unsupported(
                format!("unary {:?} on {}", op, v.type_name()),
                v.type_key(),
                format!("{:?}", op),
            )
            .into());
        }
    })
}

pub fn eval_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    match op {
        BinaryOp::And | BinaryOp::Or => {
            let (Some(l), Some(r)) = (lhs.as_bool(), rhs.as_bool()) else {
                return Err(QuillError::unsupported(
                    format!("logical {:?} between non boolean values", op),
                    lhs.type_key(),
                    format!("{:?}", op),
                )
                .into());
            };
            Ok(Value::Boolean(Some(if op == BinaryOp::And {
                l && r
            } else {
                l || r
            })))
        }
        BinaryOp::Coalesce => Ok(if lhs.is_null() { rhs } else { lhs }.clone()),
        op if op.is_comparison() => {
            let ordering = compare(lhs, rhs).ok_or_else(|| {
                crate::Error::from(QuillError::unsupported(
                    format!("comparison between {} and {}", lhs.type_name(), rhs.type_name()),
                    lhs.type_key(),
                    format!("{:?}", op),
                ))
            })?;
            Ok(Value::Boolean(Some(match op {
                BinaryOp::Equal => ordering == Ordering::Equal,
                BinaryOp::NotEqual => ordering != Ordering::Equal,
                BinaryOp::Less => ordering == Ordering::Less,
                BinaryOp::LessEqual => ordering != Ordering::Greater,
                BinaryOp::Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })))
        }
        _ if lhs.is_null() || rhs.is_null() => Ok(promoted(lhs, rhs)),
        BinaryOp::Add if lhs.type_key().is_textual() && rhs.type_key().is_textual() => {
            Ok(Value::Varchar(Some(display(lhs) + &display(rhs))))
        }
        BinaryOp::Multiply | BinaryOp::Divide
            if matches!(lhs, Value::Interval(..)) || matches!(rhs, Value::Interval(..)) =>
        {
            Err(QuillError::unsupported(
                "interval multiplication and division",
                TypeKey::Interval,
                format!("{:?}", op),
            )
            .into())
        }
        _ => match temporal_arithmetic(op, lhs, rhs) {
            Some(result) => result,
            None => arithmetic(op, lhs, rhs),
        },
    }
}

/// `value as T` with the host semantics: floats truncate toward zero when cast to integers.
pub fn eval_convert(value: &Value, to: &Value) -> Result<Value> {
    let integral_target = matches!(to.type_key(), TypeKey::Int | TypeKey::UInt);
    let value = match value {
        Value::Float32(Some(v)) if integral_target => Value::Float64(Some((*v as f64).trunc())),
        Value::Float64(Some(v)) if integral_target => Value::Float64(Some(v.trunc())),
        Value::Decimal(Some(v)) if integral_target => Value::Decimal(Some(v.trunc())),
        v => v.clone(),
    };
    convert(value, to)
}

fn int(value: i64) -> Value {
    Value::Int64(Some(value))
}

fn arg<'a>(args: &'a [Value], i: usize) -> Result<&'a Value> {
    args.get(i)
        .ok_or_else(|| QuillError::Internal(format!("missing argument {}", i)).into())
}

fn math(name: &str, x: &Value, args: &[Value]) -> Option<Result<Value>> {
    let float = || number(x).map(float_of);
    let result = match (name, x) {
        ("abs", Value::Decimal(Some(v))) => Value::Decimal(Some(v.abs())),
        ("abs", v) if v.type_key() == TypeKey::UInt => v.clone(),
        ("abs", v) if v.type_key() == TypeKey::Int => {
            return Some(if compare(v, &v.zero()) == Some(Ordering::Less) {
                eval_unary(UnaryOp::Negate, v)
            } else {
                Ok(v.clone())
            });
        }
        ("abs", _) => Value::Float64(Some(float()?.abs())),
        ("round", Value::Decimal(Some(v))) => Value::Decimal(Some(match args.first() {
            Some(digits) => {
                let digits = convert(digits.clone(), &Value::UInt32(None)).ok()?;
                let Value::UInt32(Some(digits)) = digits else {
                    return None;
                };
                v.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero)
            }
            None => v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        })),
        ("round", _) => {
            let v = float()?;
            Value::Float64(Some(match args.first().and_then(|d| number(d)).map(float_of) {
                Some(digits) => {
                    let factor = 10f64.powi(digits as i32);
                    (v * factor).round() / factor
                }
                None => v.round(),
            }))
        }
        ("floor", Value::Decimal(Some(v))) => Value::Decimal(Some(v.floor())),
        ("floor", _) => Value::Float64(Some(float()?.floor())),
        ("ceil", Value::Decimal(Some(v))) => Value::Decimal(Some(v.ceil())),
        ("ceil", _) => Value::Float64(Some(float()?.ceil())),
        ("sqrt", _) => Value::Float64(Some(float()?.sqrt())),
        ("pow" | "powi" | "powf", _) => {
            let exponent = number(args.first()?).map(float_of)?;
            Value::Float64(Some(float()?.powf(exponent)))
        }
        ("max" | "min", _) => {
            let other = args.first()?;
            let ordering = compare(x, other)?;
            let pick_x = (name == "max") == (ordering != Ordering::Less);
            if pick_x { x.clone() } else { other.clone() }
        }
        ("signum" | "sign", _) => Value::Float64(Some(float()?.signum())),
        _ => return None,
    };
    Some(Ok(result))
}

fn string(name: &str, s: &str, args: &[Value]) -> Option<Result<Value>> {
    let arg_text = |i: usize| args.get(i).and_then(text);
    Some(Ok(match name {
        "len" | "length" => int(s.chars().count() as i64),
        "is_empty" => Value::Boolean(Some(s.is_empty())),
        "to_uppercase" | "to_upper" => Value::Varchar(Some(s.to_uppercase())),
        "to_lowercase" | "to_lower" => Value::Varchar(Some(s.to_lowercase())),
        "trim" => Value::Varchar(Some(s.trim().into())),
        "trim_start" => Value::Varchar(Some(s.trim_start().into())),
        "trim_end" => Value::Varchar(Some(s.trim_end().into())),
        "contains" => Value::Boolean(Some(s.contains(arg_text(0)?.as_str()))),
        "starts_with" => Value::Boolean(Some(s.starts_with(arg_text(0)?.as_str()))),
        "ends_with" => Value::Boolean(Some(s.ends_with(arg_text(0)?.as_str()))),
        "eq" | "equals" => Value::Boolean(Some(s == arg_text(0)?)),
        "replace" => Value::Varchar(Some(s.replace(arg_text(0)?.as_str(), &arg_text(1)?))),
        "substring" => {
            let start = convert(args.first()?.clone(), &Value::Int64(None)).ok()?;
            let Value::Int64(Some(start)) = start else {
                return None;
            };
            let chars = s.chars().skip(start.max(0) as usize);
            Value::Varchar(Some(match args.get(1) {
                Some(len) => {
                    let Ok(Value::Int64(Some(len))) = convert(len.clone(), &Value::Int64(None))
                    else {
                        return None;
                    };
                    chars.take(len.max(0) as usize).collect()
                }
                None => chars.collect(),
            }))
        }
        "index_of" => {
            let needle = arg_text(0)?;
            int(match s.find(needle.as_str()) {
                Some(byte) => s[..byte].chars().count() as i64,
                None => -1,
            })
        }
        _ => return None,
    }))
}

fn temporal(name: &str, value: &Value) -> Option<Result<Value>> {
    let (date, time) = match value {
        Value::Date(Some(v)) => (Some(*v), None),
        Value::Time(Some(v)) => (None, Some(*v)),
        Value::Timestamp(Some(v)) => (Some(v.date()), Some(v.time())),
        Value::TimestampWithTimezone(Some(v)) => (Some(v.date()), Some(v.time())),
        _ => return None,
    };
    Some(Ok(match name {
        "year" => int(date?.year() as i64),
        "month" => int(date?.month() as u8 as i64),
        "day" => int(date?.day() as i64),
        "ordinal" | "day_of_year" => int(date?.ordinal() as i64),
        "hour" => int(time?.hour() as i64),
        "minute" => int(time?.minute() as i64),
        "second" => int(time?.second() as i64),
        "date" => Value::Date(Some(date?)),
        "time" => Value::Time(Some(time?)),
        _ => return None,
    }))
}

fn interval(name: &str, value: &Duration) -> Option<Result<Value>> {
    Some(Ok(match name {
        "whole_days" => int(value.whole_days()),
        "whole_hours" => int(value.whole_hours()),
        "whole_minutes" => int(value.whole_minutes()),
        "whole_seconds" => int(value.whole_seconds()),
        "whole_milliseconds" => int(value.whole_milliseconds() as i64),
        "as_seconds_f64" => Value::Float64(Some(value.as_seconds_f64())),
        _ => return None,
    }))
}

fn interval_constructor(name: &str, args: &[Value]) -> Option<Result<Value>> {
    let amount = match convert(args.first()?.clone(), &Value::Int64(None)) {
        Ok(Value::Int64(Some(v))) => v,
        Ok(..) => return None,
        Err(e) => return Some(Err(e)),
    };
    Some(Ok(Value::Interval(Some(match name {
        "weeks" => Duration::weeks(amount),
        "days" => Duration::days(amount),
        "hours" => Duration::hours(amount),
        "minutes" => Duration::minutes(amount),
        "seconds" => Duration::seconds(amount),
        "milliseconds" => Duration::milliseconds(amount),
        "microseconds" => Duration::microseconds(amount),
        _ => return None,
    }))))
}

fn contains(list: &Value, item: &Value) -> Option<Result<Value>> {
    let Value::List(items, ..) = list else {
        return None;
    };
    let items = items.as_deref().unwrap_or_default();
    Some(Ok(Value::Boolean(Some(
        items
            .iter()
            .any(|v| compare(v, item) == Some(Ordering::Equal)),
    ))))
}

/// Evaluate an instance member on a constant receiver, `None` when no evaluator exists.
pub fn eval_member(name: &str, receiver: &Value) -> Option<Result<Value>> {
    eval_call(name, receiver, &[])
}

/// Evaluate an instance method on constant receiver and arguments.
pub fn eval_call(name: &str, receiver: &Value, args: &[Value]) -> Option<Result<Value>> {
    if receiver.is_null() {
        return None;
    }
    match receiver.type_key() {
        TypeKey::Str | TypeKey::Char => string(name, &text(receiver)?, args),
        TypeKey::Int | TypeKey::UInt | TypeKey::Float | TypeKey::Decimal => {
            math(name, receiver, args)
        }
        TypeKey::Date | TypeKey::Time | TypeKey::DateTime | TypeKey::DateTimeTz => {
            temporal(name, receiver)
        }
        TypeKey::Interval => match receiver {
            Value::Interval(Some(v)) => interval(name, v),
            _ => None,
        },
        TypeKey::List => match name {
            "contains" => contains(receiver, args.first()?),
            "len" => match receiver {
                Value::List(Some(v), ..) => Some(Ok(int(v.len() as i64))),
                _ => None,
            },
            "is_empty" => match receiver {
                Value::List(v, ..) => Some(Ok(Value::Boolean(Some(
                    v.as_ref().is_none_or(|v| v.is_empty()),
                )))),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

/// Evaluate a static call, `None` for unknown or non deterministic functions.
pub fn eval_static(declaring: TypeKey, name: &str, args: &[Value]) -> Option<Result<Value>> {
    match declaring {
        TypeKey::Math => {
            let (first, rest) = args.split_first()?;
            math(name, first, rest)
        }
        TypeKey::Seq if name == "contains" => contains(args.first()?, args.get(1)?),
        TypeKey::Interval => interval_constructor(name, args),
        TypeKey::Uuid if name == "parse_str" => Some(
            arg(args, 0).and_then(|v| convert(v.clone(), &Value::Uuid(None))),
        ),
        TypeKey::Str => match name {
            "concat" => Some(Ok(Value::Varchar(Some(
                args.iter().map(display).collect::<String>(),
            )))),
            "format" => {
                let (format, rest) = args.split_first()?;
                let format = text(format)?;
                let mut out = String::new();
                let mut rest = rest.iter();
                let mut pieces = format.split("{}").peekable();
                while let Some(piece) = pieces.next() {
                    out.push_str(piece);
                    if pieces.peek().is_some() {
                        out.push_str(&rest.next().map(display).unwrap_or_default());
                    }
                }
                Some(Ok(Value::Varchar(Some(out))))
            }
            "is_null_or_empty" => Some(Ok(Value::Boolean(Some(
                args.first()?.is_null() || text(args.first()?).is_some_and(|v| v.is_empty()),
            )))),
            _ => {
                let (first, rest) = args.split_first()?;
                string(name, &text(first)?, rest)
            }
        },
        _ => None,
    }
}

impl Value {
    /// Zero of the same numeric variant.
    pub fn zero(&self) -> Value {
        match self {
            Value::Int8(..) => Value::Int8(Some(0)),
            Value::Int16(..) => Value::Int16(Some(0)),
            Value::Int32(..) => Value::Int32(Some(0)),
            Value::Int64(..) => Value::Int64(Some(0)),
            Value::UInt8(..) => Value::UInt8(Some(0)),
            Value::UInt16(..) => Value::UInt16(Some(0)),
            Value::UInt32(..) => Value::UInt32(Some(0)),
            Value::UInt64(..) => Value::UInt64(Some(0)),
            Value::Float32(..) => Value::Float32(Some(0.0)),
            Value::Float64(..) => Value::Float64(Some(0.0)),
            Value::Decimal(..) => Value::Decimal(Some(Decimal::ZERO)),
            _ => Value::Int32(Some(0)),
        }
    }
}
