use crate::{QuillError, Result, Value, truncate_long};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{fmt::Write, str::FromStr};
use time::{
    Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};
use uuid::Uuid;

const DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const TIME_FRACTION: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second].[subsecond]");
const TIMESTAMP: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
];
const TIMESTAMP_TZ: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
    ),
    format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
    ),
    format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
    ),
    format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
    ),
];

fn conversion_error(value: &Value, target: &Value) -> crate::Error {
    let error = QuillError::Conversion {
        from: value.type_name().into(),
        to: target.type_name().into(),
        value: truncate_long!(format!("{:?}", value)),
    };
    error.into()
}

fn integer(value: &Value) -> Option<i128> {
    Some(match value {
        Value::Boolean(Some(v)) => *v as i128,
        Value::Int8(Some(v)) => *v as i128,
        Value::Int16(Some(v)) => *v as i128,
        Value::Int32(Some(v)) => *v as i128,
        Value::Int64(Some(v)) => *v as i128,
        Value::UInt8(Some(v)) => *v as i128,
        Value::UInt16(Some(v)) => *v as i128,
        Value::UInt32(Some(v)) => *v as i128,
        Value::UInt64(Some(v)) => *v as i128,
        Value::Float32(Some(v)) if v.fract() == 0.0 && v.is_finite() => *v as i128,
        Value::Float64(Some(v)) if v.fract() == 0.0 && v.is_finite() => *v as i128,
        Value::Decimal(Some(v)) if v.fract().is_zero() => v.to_i128()?,
        Value::Varchar(Some(v)) => v.trim().parse::<i128>().ok()?,
        _ => return None,
    })
}

fn float(value: &Value) -> Option<f64> {
    Some(match value {
        Value::Float32(Some(v)) => *v as f64,
        Value::Float64(Some(v)) => *v,
        Value::Decimal(Some(v)) => v.to_f64()?,
        Value::Varchar(Some(v)) => v.trim().parse::<f64>().ok()?,
        _ => integer(value)? as f64,
    })
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Decimal(Some(v)) => Some(*v),
        Value::Float32(Some(v)) => Decimal::from_f32(*v),
        Value::Float64(Some(v)) => Decimal::from_f64(*v),
        Value::Varchar(Some(v)) => Decimal::from_str(v.trim()).ok(),
        _ => Decimal::from_i128(integer(value)?),
    }
}

fn parse_timestamp(value: &str) -> Option<PrimitiveDateTime> {
    TIMESTAMP
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(value, format).ok())
        .or_else(|| {
            Date::parse(value, DATE)
                .ok()
                .map(|v| PrimitiveDateTime::new(v, Time::MIDNIGHT))
        })
}

fn parse_timestamp_tz(value: &str) -> Option<OffsetDateTime> {
    TIMESTAMP_TZ
        .iter()
        .find_map(|format| OffsetDateTime::parse(value, format).ok())
        .or_else(|| parse_timestamp(value).map(PrimitiveDateTime::assume_utc))
}

fn parse_time(value: &str) -> Option<Time> {
    Time::parse(value, TIME_FRACTION)
        .or_else(|_| Time::parse(value, TIME))
        .ok()
        .or_else(|| parse_timestamp(value).map(PrimitiveDateTime::time))
}

/// Convert `value` into the variant of the `target` prototype.
///
/// Integers are narrowed with range checks, floats and decimals only convert to integers when they
/// carry no fractional part, text is parsed into uuids and temporal types. Intervals are exchanged
/// with the database as a count of microseconds. Any other pair is an error naming both types.
pub fn convert(value: Value, target: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(target.as_null());
    }
    if matches!(target, Value::Null) || value.same_type(target) {
        return Ok(value);
    }
    let converted = match target {
        Value::Boolean(..) => match &value {
            Value::Varchar(Some(v)) => match v.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Some(Value::Boolean(Some(true))),
                "false" | "f" | "0" => Some(Value::Boolean(Some(false))),
                _ => None,
            },
            _ => integer(&value).map(|v| Value::Boolean(Some(v != 0))),
        },
        Value::Int8(..) => integer(&value)
            .and_then(|v| i8::try_from(v).ok())
            .map(|v| Value::Int8(Some(v))),
        Value::Int16(..) => integer(&value)
            .and_then(|v| i16::try_from(v).ok())
            .map(|v| Value::Int16(Some(v))),
        Value::Int32(..) => integer(&value)
            .and_then(|v| i32::try_from(v).ok())
            .map(|v| Value::Int32(Some(v))),
        Value::Int64(..) => match &value {
            Value::Interval(Some(v)) => i64::try_from(v.whole_microseconds())
                .ok()
                .map(|v| Value::Int64(Some(v))),
            _ => integer(&value)
                .and_then(|v| i64::try_from(v).ok())
                .map(|v| Value::Int64(Some(v))),
        },
        Value::UInt8(..) => integer(&value)
            .and_then(|v| u8::try_from(v).ok())
            .map(|v| Value::UInt8(Some(v))),
        Value::UInt16(..) => integer(&value)
            .and_then(|v| u16::try_from(v).ok())
            .map(|v| Value::UInt16(Some(v))),
        Value::UInt32(..) => integer(&value)
            .and_then(|v| u32::try_from(v).ok())
            .map(|v| Value::UInt32(Some(v))),
        Value::UInt64(..) => integer(&value)
            .and_then(|v| u64::try_from(v).ok())
            .map(|v| Value::UInt64(Some(v))),
        Value::Float32(..) => float(&value).map(|v| Value::Float32(Some(v as f32))),
        Value::Float64(..) => float(&value).map(|v| Value::Float64(Some(v))),
        Value::Decimal(..) => decimal(&value).map(|v| Value::Decimal(Some(v))),
        Value::Char(..) => match &value {
            Value::Varchar(Some(v)) if v.chars().count() == 1 => {
                v.chars().next().map(|v| Value::Char(Some(v)))
            }
            _ => None,
        },
        Value::Varchar(..) => match &value {
            Value::Char(Some(v)) => Some(Value::Varchar(Some(v.to_string()))),
            Value::Uuid(Some(v)) => Some(Value::Varchar(Some(v.to_string()))),
            Value::Blob(Some(v)) => String::from_utf8(v.to_vec())
                .ok()
                .map(|v| Value::Varchar(Some(v))),
            Value::Decimal(Some(v)) => Some(Value::Varchar(Some(v.to_string()))),
            Value::Float64(Some(v)) => Some(Value::Varchar(Some(v.to_string()))),
            Value::Float32(Some(v)) => Some(Value::Varchar(Some(v.to_string()))),
            Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..) => {
                let mut out = String::new();
                write_temporal(&mut out, &value);
                Some(Value::Varchar(Some(out)))
            }
            _ => integer(&value).map(|v| Value::Varchar(Some(v.to_string()))),
        },
        Value::Blob(..) => match &value {
            Value::Varchar(Some(v)) => Some(Value::Blob(Some(v.as_bytes().into()))),
            Value::Uuid(Some(v)) => Some(Value::Blob(Some(v.as_bytes().as_slice().into()))),
            _ => None,
        },
        Value::Uuid(..) => match &value {
            Value::Varchar(Some(v)) => Uuid::parse_str(v.trim()).ok().map(|v| Value::Uuid(Some(v))),
            Value::Blob(Some(v)) => Uuid::from_slice(v).ok().map(|v| Value::Uuid(Some(v))),
            _ => None,
        },
        Value::Date(..) => match &value {
            Value::Varchar(Some(v)) => Date::parse(v.trim(), DATE)
                .ok()
                .or_else(|| parse_timestamp(v.trim()).map(|v| v.date()))
                .map(|v| Value::Date(Some(v))),
            Value::Timestamp(Some(v)) => Some(Value::Date(Some(v.date()))),
            Value::TimestampWithTimezone(Some(v)) => Some(Value::Date(Some(v.date()))),
            _ => None,
        },
        Value::Time(..) => match &value {
            Value::Varchar(Some(v)) => parse_time(v.trim()).map(|v| Value::Time(Some(v))),
            Value::Timestamp(Some(v)) => Some(Value::Time(Some(v.time()))),
            _ => None,
        },
        Value::Timestamp(..) => match &value {
            Value::Varchar(Some(v)) => parse_timestamp(v.trim()).map(|v| Value::Timestamp(Some(v))),
            Value::Date(Some(v)) => Some(Value::Timestamp(Some(v.midnight()))),
            Value::TimestampWithTimezone(Some(v)) => {
                let v = v.to_offset(UtcOffset::UTC);
                Some(Value::Timestamp(Some(PrimitiveDateTime::new(v.date(), v.time()))))
            }
            _ => None,
        },
        Value::TimestampWithTimezone(..) => match &value {
            Value::Varchar(Some(v)) => {
                parse_timestamp_tz(v.trim()).map(|v| Value::TimestampWithTimezone(Some(v)))
            }
            Value::Timestamp(Some(v)) => Some(Value::TimestampWithTimezone(Some(v.assume_utc()))),
            _ => None,
        },
        Value::Interval(..) => match &value {
            Value::Float32(..) | Value::Float64(..) | Value::Decimal(..) => float(&value)
                .filter(|v| v.is_finite())
                .map(|v| Value::Interval(Some(Duration::microseconds(v.round() as i64)))),
            _ => integer(&value)
                .and_then(|v| i64::try_from(v).ok())
                .map(|v| Value::Interval(Some(Duration::microseconds(v)))),
        },
        Value::List(.., inner) => match value {
            Value::List(Some(ref items), ..) => {
                let items = items
                    .iter()
                    .map(|v| convert(v.clone(), inner))
                    .collect::<Result<Vec<_>>>()?;
                Some(Value::List(Some(items), inner.clone()))
            }
            _ => None,
        },
        Value::Null => None,
    };
    converted.ok_or_else(|| conversion_error(&value, target))
}

/// Canonical text form of temporal values, shared by literals and drivers storing them as text.
pub fn write_temporal(out: &mut String, value: &Value) {
    fn time(out: &mut String, value: &Time) {
        let _ = write!(
            out,
            "{:02}:{:02}:{:02}",
            value.hour(),
            value.minute(),
            value.second()
        );
        let mut subsecond = value.microsecond();
        if subsecond != 0 {
            let mut width = 6;
            while subsecond % 10 == 0 {
                subsecond /= 10;
                width -= 1;
            }
            let _ = write!(out, ".{:0width$}", subsecond);
        }
    }
    fn date(out: &mut String, value: &Date) {
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}",
            value.year(),
            value.month() as u8,
            value.day()
        );
    }
    match value {
        Value::Date(Some(v)) => date(out, v),
        Value::Time(Some(v)) => time(out, v),
        Value::Timestamp(Some(v)) => {
            date(out, &v.date());
            out.push(' ');
            time(out, &v.time());
        }
        Value::TimestampWithTimezone(Some(v)) => {
            date(out, &v.date());
            out.push(' ');
            time(out, &v.time());
            let (h, m, _) = v.offset().as_hms();
            let _ = write!(
                out,
                "{}{:02}:{:02}",
                if v.offset().is_negative() { '-' } else { '+' },
                h.unsigned_abs(),
                m.unsigned_abs()
            );
        }
        _ => {}
    }
}
