use crate::{QuillError, Result, Value};
use std::fmt::{self, Display};

/// Type classification used to resolve members and methods.
///
/// Value types (`Str`, `Int`, `DateTime`, ...) describe the receiver of an instance member while the
/// namespace keys (`Math`, `Seq`, `Sql`, ...) are the declaring type of static members and calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKey {
    Any,
    Null,
    Bool,
    Int,
    UInt,
    Float,
    Decimal,
    Char,
    Str,
    Blob,
    Date,
    Time,
    DateTime,
    DateTimeTz,
    Interval,
    Uuid,
    List,
    Entity,
    Math,
    Seq,
    Sql,
}

impl TypeKey {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeKey::Int | TypeKey::UInt | TypeKey::Float | TypeKey::Decimal
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            TypeKey::Date | TypeKey::Time | TypeKey::DateTime | TypeKey::DateTimeTz
        )
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, TypeKey::Str | TypeKey::Char)
    }

    /// Resolve a namespace path used in expressions (`Str::concat`, `DateTime::now`).
    pub fn namespace(name: &str) -> Option<TypeKey> {
        Some(match name {
            "Str" => TypeKey::Str,
            "Math" => TypeKey::Math,
            "Seq" => TypeKey::Seq,
            "Sql" => TypeKey::Sql,
            "DateTime" => TypeKey::DateTime,
            "Date" => TypeKey::Date,
            "Time" => TypeKey::Time,
            "Interval" => TypeKey::Interval,
            "Uuid" => TypeKey::Uuid,
            _ => return None,
        })
    }

    /// Two keys are compatible when a formatter declared for `self` accepts an argument of `other`.
    pub fn accepts(&self, other: &TypeKey) -> bool {
        self == other
            || *self == TypeKey::Any
            || *other == TypeKey::Any
            || *other == TypeKey::Null
            || (self.is_numeric() && other.is_numeric())
            || (self.is_textual() && other.is_textual())
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeKey::Any => "any",
            TypeKey::Null => "null",
            TypeKey::Bool => "bool",
            TypeKey::Int => "integer",
            TypeKey::UInt => "unsigned integer",
            TypeKey::Float => "float",
            TypeKey::Decimal => "decimal",
            TypeKey::Char => "char",
            TypeKey::Str => "Str",
            TypeKey::Blob => "blob",
            TypeKey::Date => "Date",
            TypeKey::Time => "Time",
            TypeKey::DateTime => "DateTime",
            TypeKey::DateTimeTz => "DateTimeTz",
            TypeKey::Interval => "Interval",
            TypeKey::Uuid => "Uuid",
            TypeKey::List => "List",
            TypeKey::Entity => "entity",
            TypeKey::Math => "Math",
            TypeKey::Seq => "Seq",
            TypeKey::Sql => "Sql",
        })
    }
}

/// Portable database type of a column or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbType {
    Boolean,
    SByte,
    Int16,
    Int32,
    Int64,
    Byte,
    UInt16,
    UInt32,
    UInt64,
    Single,
    Double,
    Decimal,
    StringFixedLength,
    String,
    Binary,
    Date,
    Time,
    DateTime,
    DateTimeOffset,
    Interval,
    Guid,
    Array,
}

impl DbType {
    /// Map a value prototype to its database type.
    pub fn of(value: &Value) -> Result<DbType> {
        Ok(match value {
            Value::Boolean(..) => DbType::Boolean,
            Value::Int8(..) => DbType::SByte,
            Value::Int16(..) => DbType::Int16,
            Value::Int32(..) => DbType::Int32,
            Value::Int64(..) => DbType::Int64,
            Value::UInt8(..) => DbType::Byte,
            Value::UInt16(..) => DbType::UInt16,
            Value::UInt32(..) => DbType::UInt32,
            Value::UInt64(..) => DbType::UInt64,
            Value::Float32(..) => DbType::Single,
            Value::Float64(..) => DbType::Double,
            Value::Decimal(..) => DbType::Decimal,
            Value::Char(..) => DbType::StringFixedLength,
            Value::Varchar(..) => DbType::String,
            Value::Blob(..) => DbType::Binary,
            Value::Date(..) => DbType::Date,
            Value::Time(..) => DbType::Time,
            Value::Timestamp(..) => DbType::DateTime,
            Value::TimestampWithTimezone(..) => DbType::DateTimeOffset,
            Value::Interval(..) => DbType::Interval,
            Value::Uuid(..) => DbType::Guid,
            Value::List(..) => DbType::Array,
            Value::Null => {
                return Err(QuillError::TypeMapping {
                    declaring: "Value".into(),
                    member: "null".into(),
                    message: "a null value has no database type".into(),
                }
                .into());
            }
        })
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            DbType::SByte
                | DbType::Int16
                | DbType::Int32
                | DbType::Int64
                | DbType::Byte
                | DbType::UInt16
                | DbType::UInt32
                | DbType::UInt64
        )
    }
}
