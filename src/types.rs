//! Core cell and type model.
//!
//! Providers hand the binder rows of untyped [`Value`]s; schemas declare the [`DataType`] a
//! column should be converted into.

use std::fmt;

use serde::{Serialize, Serializer};

/// One raw row as produced by a row provider.
pub type Row = Vec<Value>;

/// Declared scalar type for a schema column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// A caller-registered type, converted by a function registered on the schema.
    Custom(String),
}

impl DataType {
    /// Parse a type name as used in schema definitions (case-insensitive).
    ///
    /// Unknown names become [`DataType::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "int64" | "int" | "integer" => Self::Int64,
            "float64" | "float" | "double" => Self::Float64,
            "bool" | "boolean" => Self::Bool,
            "utf8" | "string" | "str" | "text" => Self::Utf8,
            _ => Self::Custom(name.trim().to_string()),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int64 => f.write_str("int64"),
            DataType::Float64 => f.write_str("float64"),
            DataType::Bool => f.write_str("bool"),
            DataType::Utf8 => f.write_str("utf8"),
            DataType::Custom(name) => f.write_str(name),
        }
    }
}

/// A single cell value.
///
/// A "blank" cell is a [`Value::Utf8`] whose text is empty or whitespace only.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing/empty value.
    #[default]
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for null cells and for strings that are empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Utf8(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int64(_) => "int64",
            Value::Float64(_) => "float64",
            Value::Bool(_) => "bool",
            Value::Utf8(_) => "utf8",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Render the cell the way it is compared against column matchers.
    ///
    /// Nulls render as the empty string; integral floats drop their fraction so that a numeric
    /// header cell `2024.0` matches the text `2024`.
    pub fn header_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Utf8(s) => s.clone(),
            Value::Int64(i) => i.to_string(),
            Value::Float64(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Utf8(s) => write!(f, "{s:?}"),
            other => f.write_str(&other.header_text()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::Float64(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Utf8(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Utf8(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Utf8(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float64(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
