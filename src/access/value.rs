use crate::error::BindError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Native types a filterable field can have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float64,
    String,
    Date,
    DateTime,
    Guid,
    /// Enumeration with the given variant names, in ordinal order
    Enum(&'static [&'static str]),
}

impl DataType {
    /// Whether `>>`, `>=`, `<<` and `<=` apply to this type
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            DataType::Int32
                | DataType::Int64
                | DataType::Float64
                | DataType::Date
                | DataType::DateTime
        )
    }

    /// Convert the text of a value literal (quotes already stripped) to a
    /// value of this type.
    pub fn parse_literal(&self, text: &str) -> Result<Value, BindError> {
        let invalid = |reason: String| BindError::InvalidValue {
            value: text.to_string(),
            data_type: *self,
            reason,
        };
        let trimmed = text.trim();

        match self {
            DataType::String => Ok(Value::String(text.to_string())),
            DataType::Boolean => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Value::Boolean(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Value::Boolean(false))
                } else {
                    Err(invalid("expected 'true' or 'false'".to_string()))
                }
            }
            DataType::Int32 => trimmed
                .parse::<i32>()
                .map(Value::Int32)
                .map_err(|e| invalid(e.to_string())),
            DataType::Int64 => trimmed
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|e| invalid(e.to_string())),
            DataType::Float64 => match trimmed.parse::<f64>() {
                Ok(f) if f.is_nan() => Err(invalid("NaN is not comparable".to_string())),
                Ok(f) => Ok(Value::Float64(f)),
                Err(e) => Err(invalid(e.to_string())),
            },
            DataType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| invalid(e.to_string())),
            DataType::DateTime => parse_date_time(trimmed)
                .map(Value::DateTime)
                .ok_or_else(|| invalid("expected an RFC 3339 or 'YYYY-MM-DD[ HH:MM:SS]' timestamp".to_string())),
            DataType::Guid => Uuid::parse_str(trimmed)
                .map(Value::Guid)
                .map_err(|e| invalid(e.to_string())),
            DataType::Enum(variants) => {
                if let Some(variant) = variants.iter().find(|v| v.eq_ignore_ascii_case(trimmed)) {
                    return Ok(Value::Enum(*variant));
                }
                match trimmed.parse::<usize>() {
                    Ok(ordinal) if ordinal < variants.len() => Ok(Value::Enum(variants[ordinal])),
                    _ => Err(invalid(format!("expected one of {:?}", variants))),
                }
            }
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "bool",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::String => "string",
            DataType::Date => "date",
            DataType::DateTime => "datetime",
            DataType::Guid => "guid",
            DataType::Enum(_) => "enum",
        };
        f.write_str(name)
    }
}

fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A field value read from an entity, or a converted literal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
    Enum(&'static str),
}

impl Value {
    /// Check if this value is compatible with the given data type
    pub fn is_compatible_with(&self, data_type: DataType) -> bool {
        match (self, data_type) {
            (Value::Null, _) => true,
            (Value::Boolean(_), DataType::Boolean) => true,
            (Value::Int32(_), DataType::Int32) => true,
            (Value::Int64(_), DataType::Int64) => true,
            (Value::Float64(_), DataType::Float64) => true,
            (Value::String(_), DataType::String) => true,
            (Value::Date(_), DataType::Date) => true,
            (Value::DateTime(_), DataType::DateTime) => true,
            (Value::Guid(_), DataType::Guid) => true,
            (Value::Enum(name), DataType::Enum(variants)) => variants.contains(name),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Order two values of the same variant. Returns `None` for mixed
    /// variants, `Null`, and NaN floats.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Int32(a), Value::Int32(b)) => Some(a.cmp(b)),
            (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Guid(a), Value::Guid(b)) => Some(a.cmp(b)),
            (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Float64(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Guid(g) => write!(f, "{}", g),
            Value::Enum(name) => f.write_str(name),
        }
    }
}

macro_rules! impl_from_native {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$native> for Value {
                fn from(value: $native) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_native! {
    bool => Boolean,
    i32 => Int32,
    i64 => Int64,
    f64 => Float64,
    String => String,
    NaiveDate => Date,
    DateTime<Utc> => DateTime,
    Uuid => Guid,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
