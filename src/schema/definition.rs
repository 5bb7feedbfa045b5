//! Declarative schema definitions loaded from JSON.
//!
//! A definition covers everything except validators and custom converters, which are attached
//! in code through [`SchemaBuilder::with_column`] and [`SchemaBuilder::converter`].
//!
//! ```json
//! {
//!   "name": "Person",
//!   "header_rows": 2,
//!   "delimiter": ";",
//!   "columns": [
//!     { "attr": "id", "header": "ID", "type": "int64" },
//!     { "attr": "email", "header": "e-?mail", "regex": true, "ignore_case": true },
//!     { "attr": "city", "header": "City", "required": false, "default": "Moscow" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BindError, BindResult, ProviderError};
use crate::types::{DataType, Value};

use super::{Column, SchemaBuilder, SchemaConfig};

/// Serializable description of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Attribute name on the record.
    pub attr: String,
    /// Header text, or a regex when `regex` is set.
    pub header: String,
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub skip_invalid_row: bool,
    /// Declared type name, see [`DataType::from_name`].
    #[serde(default, rename = "type")]
    pub data_type: Option<String>,
}

fn default_required() -> bool {
    true
}

/// Serializable description of a whole schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(flatten)]
    pub config: SchemaConfig,
    pub columns: Vec<ColumnDefinition>,
}

impl SchemaDefinition {
    pub fn from_json_str(json: &str) -> BindResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> BindResult<Self> {
        let text = fs::read_to_string(path).map_err(ProviderError::Io)?;
        Self::from_json_str(&text)
    }

    /// Turn the definition into a builder; call [`SchemaBuilder::build`] to finish.
    pub fn into_builder(self) -> BindResult<SchemaBuilder> {
        let mut builder = SchemaBuilder::new(self.name).config(self.config);
        for def in self.columns {
            let column = column_from_definition(&def)?;
            builder = builder.column(def.attr, column);
        }
        Ok(builder)
    }
}

fn column_from_definition(def: &ColumnDefinition) -> BindResult<Column> {
    let mut column = if def.regex {
        Column::pattern(&def.header)?
    } else {
        Column::new(def.header.clone())
    };
    column = column
        .ignore_case(def.ignore_case)
        .required(def.required)
        .skip_invalid_row(def.skip_invalid_row);
    if let Some(default) = &def.default {
        column = column.default_value(json_to_value(&def.attr, default)?);
    }
    if let Some(name) = &def.data_type {
        column = column.declared_type(DataType::from_name(name));
    }
    Ok(column)
}

fn json_to_value(attr: &str, v: &serde_json::Value) -> BindResult<Value> {
    match v {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Value::Int64(i)),
            None => n.as_f64().map(Value::Float64).ok_or_else(|| BindError::InvalidSchema {
                message: format!("attribute '{attr}': default {n} is out of range"),
            }),
        },
        serde_json::Value::String(s) => Ok(Value::Utf8(s.clone())),
        other => Err(BindError::InvalidSchema {
            message: format!("attribute '{attr}': default must be a scalar, got {other}"),
        }),
    }
}
