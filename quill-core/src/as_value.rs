use crate::{Error, Result, Value, convert, truncate_long};
use rust_decimal::Decimal;
use std::any;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// It backs query parameters, captured constants in expressions and row decoding.
///
/// # Examples
/// ```rust
/// use quill_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The empty (NULL) variant for this type, used as type prototype.
    fn as_empty_value() -> Value;
    /// Convert into the owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    ///
    /// The canonical variant is always accepted. Other variants go through [`convert`] first, so
    /// an `i64` read from the database becomes an `i32` when it fits, a string becomes a `Uuid`
    /// when it parses.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Whether the type admits NULL.
    fn is_nullable() -> bool {
        false
    }
    /// Whether the type is a database enum stored through its integral code.
    fn is_enum() -> bool {
        false
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

pub(crate) fn unexpected<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {} to {}",
        truncate_long!(format!("{:?}", value)),
        any::type_name::<T>(),
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $variant:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $variant(None)
            }
            fn as_value(self) -> Value {
                $variant(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $variant(Some(v)) => Ok(v),
                    v if v.is_null() => Err(unexpected::<Self>(&v)),
                    v => match convert(v, &Self::as_empty_value())? {
                        $variant(Some(v)) => Ok(v),
                        v => Err(unexpected::<Self>(&v)),
                    },
                }
            }
        }
    };
}

impl_as_value!(bool, Value::Boolean);
impl_as_value!(i8, Value::Int8);
impl_as_value!(i16, Value::Int16);
impl_as_value!(i32, Value::Int32);
impl_as_value!(i64, Value::Int64);
impl_as_value!(u8, Value::UInt8);
impl_as_value!(u16, Value::UInt16);
impl_as_value!(u32, Value::UInt32);
impl_as_value!(u64, Value::UInt64);
impl_as_value!(f32, Value::Float32);
impl_as_value!(f64, Value::Float64);
impl_as_value!(Decimal, Value::Decimal);
impl_as_value!(char, Value::Char);
impl_as_value!(String, Value::Varchar);
impl_as_value!(Box<[u8]>, Value::Blob);
impl_as_value!(Date, Value::Date);
impl_as_value!(Time, Value::Time);
impl_as_value!(PrimitiveDateTime, Value::Timestamp);
impl_as_value!(OffsetDateTime, Value::TimestampWithTimezone);
impl_as_value!(Duration, Value::Interval);
impl_as_value!(Uuid, Value::Uuid);

impl<'a> AsValue for &'a str {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Err(Error::msg(format!(
            "Cannot borrow a &str from {}, use String instead",
            truncate_long!(format!("{:?}", value))
        )))
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(T::try_from_value(value)?))
        }
    }
    fn is_nullable() -> bool {
        true
    }
    fn is_enum() -> bool {
        T::is_enum()
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Box::new(T::try_from_value(value)?))
    }
    fn is_nullable() -> bool {
        T::is_nullable()
    }
    fn is_enum() -> bool {
        T::is_enum()
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_empty_value() -> Value {
        Value::List(None, Box::new(T::as_empty_value()))
    }
    fn as_value(self) -> Value {
        Value::List(
            Some(self.into_iter().map(AsValue::as_value).collect()),
            Box::new(T::as_empty_value()),
        )
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(Some(items), ..) => items.into_iter().map(T::try_from_value).collect(),
            v => Err(unexpected::<Self>(&v)),
        }
    }
}
