use crate::error_message_from_ptr;
use libsqlite3_sys::*;
use quill_core::{Error, Parameter, QuillError, Result, Value, write_temporal};
use rust_decimal::prelude::ToPrimitive;
use std::ffi::{CString, c_int};

/// Prefixes sqlite accepts for named parameters.
const PREFIXES: &[&str] = &["@", ":", "$"];

fn parameter_index(statement: *mut sqlite3_stmt, name: &str) -> Result<c_int> {
    for prefix in PREFIXES {
        let full = CString::new(format!("{}{}", prefix, name))?;
        let index = unsafe { sqlite3_bind_parameter_index(statement, full.as_ptr()) };
        if index > 0 {
            return Ok(index);
        }
    }
    Ok(0)
}

fn bind_text(statement: *mut sqlite3_stmt, index: c_int, value: &str) -> c_int {
    unsafe {
        sqlite3_bind_text(
            statement,
            index,
            value.as_ptr() as *const _,
            value.len() as c_int,
            SQLITE_TRANSIENT(),
        )
    }
}

fn bind_value(statement: *mut sqlite3_stmt, index: c_int, value: &Value) -> Result<c_int> {
    if value.is_null() {
        return Ok(unsafe { sqlite3_bind_null(statement, index) });
    }
    let rc = unsafe {
        match value {
            Value::Boolean(Some(v)) => sqlite3_bind_int64(statement, index, *v as i64),
            Value::Int8(Some(v)) => sqlite3_bind_int64(statement, index, *v as i64),
            Value::Int16(Some(v)) => sqlite3_bind_int64(statement, index, *v as i64),
            Value::Int32(Some(v)) => sqlite3_bind_int64(statement, index, *v as i64),
            Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, *v),
            Value::UInt8(Some(v)) => sqlite3_bind_int64(statement, index, *v as i64),
            Value::UInt16(Some(v)) => sqlite3_bind_int64(statement, index, *v as i64),
            Value::UInt32(Some(v)) => sqlite3_bind_int64(statement, index, *v as i64),
            Value::UInt64(Some(v)) => match i64::try_from(*v) {
                Ok(v) => sqlite3_bind_int64(statement, index, v),
                Err(..) => bind_text(statement, index, &v.to_string()),
            },
            Value::Float32(Some(v)) => sqlite3_bind_double(statement, index, *v as f64),
            Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, *v),
            Value::Decimal(Some(v)) => match v.to_f64() {
                Some(v) => sqlite3_bind_double(statement, index, v),
                None => bind_text(statement, index, &v.to_string()),
            },
            Value::Char(Some(v)) => bind_text(statement, index, &v.to_string()),
            Value::Varchar(Some(v)) => bind_text(statement, index, v),
            Value::Blob(Some(v)) => sqlite3_bind_blob(
                statement,
                index,
                v.as_ptr() as *const _,
                v.len() as c_int,
                SQLITE_TRANSIENT(),
            ),
            Value::Date(..)
            | Value::Time(..)
            | Value::Timestamp(..)
            | Value::TimestampWithTimezone(..) => {
                let mut out = String::new();
                write_temporal(&mut out, value);
                bind_text(statement, index, &out)
            }
            Value::Interval(Some(v)) => {
                let micros = i64::try_from(v.whole_microseconds()).map_err(|_| {
                    Error::msg(format!("Interval {} does not fit in 64 bits of microseconds", v))
                })?;
                sqlite3_bind_int64(statement, index, micros)
            }
            Value::Uuid(Some(v)) => bind_text(statement, index, &v.to_string()),
            Value::List(..) => {
                return Err(QuillError::unsupported(
                    "binding a list to a single parameter",
                    "sqlite",
                    "bind",
                )
                .into());
            }
            _ => sqlite3_bind_null(statement, index),
        }
    };
    Ok(rc)
}

/// Bind every parameter the statement declares, parameters it does not mention are skipped
/// because a batch shares one list across all of its statements.
pub(crate) fn bind_parameters(
    connection: *mut sqlite3,
    statement: *mut sqlite3_stmt,
    params: &[Parameter],
) -> Result<()> {
    for param in params {
        let index = parameter_index(statement, &param.name)?;
        if index == 0 {
            continue;
        }
        let rc = bind_value(statement, index, &param.value)?;
        if rc != SQLITE_OK {
            let message = unsafe { error_message_from_ptr(&sqlite3_errmsg(connection)).to_string() };
            return Err(Error::msg(format!(
                "Could not bind parameter `{}`: {}",
                param.name, message
            )));
        }
    }
    Ok(())
}
