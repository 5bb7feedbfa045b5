//! Schema declaration.
//!
//! A [`Schema`] is an explicit, ordered list of `(attribute, Column)` pairs plus
//! [`SchemaConfig`]. It is declared once and reused for any number of resolutions; it is never
//! mutated by them, so one schema can be resolved against several row streams concurrently.
//!
//! ```rust
//! use rowbind::schema::{Column, Schema};
//! use rowbind::types::DataType;
//!
//! # fn main() -> Result<(), rowbind::BindError> {
//! let schema = Schema::builder("Person")
//!     .column("id", Column::new("ID").declared_type(DataType::Int64))
//!     .column("name", Column::new("name").ignore_case(true))
//!     .column("city", Column::new("City").optional().default_value("Moscow"))
//!     .build()?;
//! assert_eq!(schema.len(), 3);
//! assert_eq!(schema.required_columns().count(), 2);
//! # Ok(())
//! # }
//! ```

pub mod column;
pub mod convert;
pub mod definition;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BindError, BindResult};
use crate::types::{DataType, Value};

pub use column::{Column, Matcher, Validator};
pub use convert::{ConvertFn, Converters};
pub use definition::{ColumnDefinition, SchemaDefinition};

/// Default separator used to join stacked header cells.
pub const DEFAULT_DELIMITER: &str = ";";

/// Schema-level header configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Number of physical rows forming one logical header. Must be at least 1.
    pub header_rows: usize,
    /// Separator for flattened multi-row headers (unused when `header_rows == 1`).
    pub delimiter: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            header_rows: 1,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

#[derive(Debug)]
struct SchemaInner {
    name: String,
    columns: Vec<(String, Column)>,
    config: SchemaConfig,
    converters: Converters,
}

/// Ordered, named collection of column descriptors.
///
/// Cloning is cheap; clones share the same declaration.
#[derive(Debug, Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// Name of the record type, used when formatting records.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.inner.config
    }

    pub fn converters(&self) -> &Converters {
        &self.inner.converters
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> &[(String, Column)] {
        &self.inner.columns
    }

    pub fn column(&self, attr: &str) -> Option<&Column> {
        self.inner
            .columns
            .iter()
            .find(|(name, _)| name == attr)
            .map(|(_, col)| col)
    }

    /// Returns the declaration position of an attribute, if present.
    pub fn index_of(&self, attr: &str) -> Option<usize> {
        self.inner.columns.iter().position(|(name, _)| name == attr)
    }

    /// Iterate attribute names in declaration order.
    pub fn attrs(&self) -> impl Iterator<Item = &str> {
        self.inner.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Required columns in declaration order.
    pub fn required_columns(&self) -> impl Iterator<Item = &Column> {
        self.inner
            .columns
            .iter()
            .map(|(_, col)| col)
            .filter(|col| col.is_required())
    }

    pub fn len(&self) -> usize {
        self.inner.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.columns.is_empty()
    }

    pub(crate) fn convert(&self, data_type: &DataType, value: &Value) -> Result<Value, String> {
        self.inner.converters.convert(data_type, value)
    }
}

/// Explicit registration step for a [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    columns: Vec<(String, Column)>,
    config: SchemaConfig,
    converters: Converters,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            config: SchemaConfig::default(),
            converters: Converters::default(),
        }
    }

    /// Append a column. Declaration order is significant for positional access.
    pub fn column(mut self, attr: impl Into<String>, column: Column) -> Self {
        self.columns.push((attr.into(), column));
        self
    }

    /// Rewrite an already declared column, e.g. to attach a validator to a column loaded from a
    /// [`SchemaDefinition`]. Unknown attributes are left untouched.
    pub fn with_column<F>(mut self, attr: &str, f: F) -> Self
    where
        F: FnOnce(Column) -> Column,
    {
        if let Some(pos) = self.columns.iter().position(|(name, _)| name == attr) {
            let (name, col) = self.columns.remove(pos);
            self.columns.insert(pos, (name, f(col)));
        }
        self
    }

    pub fn header_rows(mut self, header_rows: usize) -> Self {
        self.config.header_rows = header_rows;
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.delimiter = delimiter.into();
        self
    }

    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a conversion function for a declared type.
    pub fn converter<F>(mut self, data_type: DataType, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.converters.register(data_type, f);
        self
    }

    /// Validate the declaration and freeze it.
    pub fn build(self) -> BindResult<Schema> {
        if self.config.header_rows == 0 {
            return Err(BindError::InvalidSchema {
                message: format!("schema '{}': header_rows must be >= 1", self.name),
            });
        }

        let mut seen = HashSet::new();
        for (attr, col) in &self.columns {
            if !seen.insert(attr.as_str()) {
                return Err(BindError::InvalidSchema {
                    message: format!("schema '{}': duplicate attribute '{attr}'", self.name),
                });
            }
            if let Some(err) = col.fold_error() {
                return Err(BindError::InvalidPattern(err.clone()));
            }
            if let Some(data_type) = col.data_type() {
                if !self.converters.contains(data_type) {
                    return Err(BindError::InvalidSchema {
                        message: format!(
                            "schema '{}': no converter registered for type '{data_type}' (attribute '{attr}')",
                            self.name
                        ),
                    });
                }
            }
        }

        Ok(Schema {
            inner: Arc::new(SchemaInner {
                name: self.name,
                columns: self.columns,
                config: self.config,
                converters: self.converters,
            }),
        })
    }
}
