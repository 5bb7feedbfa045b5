//! Scalar conversion table keyed by declared type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{DataType, Value};

/// Conversion callback. `Err` carries a human readable reason.
pub type ConvertFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Explicit table of conversion functions, one per [`DataType`].
#[derive(Clone)]
pub struct Converters {
    table: HashMap<DataType, ConvertFn>,
}

impl Converters {
    /// An empty table, without the built-in conversions.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Register (or replace) the conversion for `data_type`.
    pub fn register<F>(&mut self, data_type: DataType, f: F)
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.table.insert(data_type, Arc::new(f));
    }

    pub fn contains(&self, data_type: &DataType) -> bool {
        self.table.contains_key(data_type)
    }

    /// Convert `value` into `data_type`.
    ///
    /// Nulls stay null and are never passed to the conversion function.
    pub fn convert(&self, data_type: &DataType, value: &Value) -> Result<Value, String> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self.table.get(data_type) {
            Some(f) => f(value),
            None => Err(format!("no converter registered for type '{data_type}'")),
        }
    }
}

impl Default for Converters {
    fn default() -> Self {
        let mut out = Self::empty();
        out.register(DataType::Utf8, |v| Ok(Value::Utf8(to_utf8(v))));
        out.register(DataType::Int64, |v| to_i64(v).map(Value::Int64));
        out.register(DataType::Float64, |v| to_f64(v).map(Value::Float64));
        out.register(DataType::Bool, |v| to_bool(v).map(Value::Bool));
        out
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<String> = self.table.keys().map(|t| t.to_string()).collect();
        types.sort();
        f.debug_struct("Converters").field("types", &types).finish()
    }
}

fn to_utf8(v: &Value) -> String {
    match v {
        Value::Utf8(s) => s.clone(),
        other => other.header_text(),
    }
}

fn to_i64(v: &Value) -> Result<i64, String> {
    match v {
        Value::Int64(i) => Ok(*i),
        Value::Float64(f) => {
            if f.fract() != 0.0 || f.is_nan() {
                Err("expected integer (got non-integer float)".to_string())
            } else if *f < i64::MIN as f64 || *f >= i64::MAX as f64 {
                Err(format!("integer out of range: {f}"))
            } else {
                Ok(*f as i64)
            }
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Utf8(s) => s.trim().parse::<i64>().map_err(|e| e.to_string()),
        Value::Null => Err("expected integer".to_string()),
    }
}

fn to_f64(v: &Value) -> Result<f64, String> {
    match v {
        Value::Float64(f) => Ok(*f),
        Value::Int64(i) => Ok(*i as f64),
        Value::Utf8(s) => s.trim().parse::<f64>().map_err(|e| e.to_string()),
        _ => Err("expected number".to_string()),
    }
}

fn to_bool(v: &Value) -> Result<bool, String> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::Int64(i) => Ok(*i != 0),
        Value::Float64(f) => Ok(*f != 0.0),
        Value::Utf8(s) => parse_bool_str(s),
        Value::Null => Err("expected bool".to_string()),
    }
}

fn parse_bool_str(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
