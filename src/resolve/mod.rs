//! Resolution of a [`Schema`] against one buffered row stream.
//!
//! [`BoundSchema::resolve`] runs the header resolver ([`header`]) and the column binder
//! ([`binder`]). The result owns the rows and the resolution-scoped bindings; it is read-only and
//! is consumed by [`BoundSchema::records`].

pub mod binder;
pub mod header;

use crate::error::BindResult;
use crate::record::Records;
use crate::schema::Schema;
use crate::types::Row;

pub use binder::{bind_columns, Binding};
pub use header::{flatten_header, resolve_header, HeaderMatch};

/// A schema bound to the header of one row stream.
#[derive(Debug, Clone)]
pub struct BoundSchema {
    schema: Schema,
    rows: Vec<Row>,
    header: HeaderMatch,
    bindings: Vec<Binding>,
}

impl BoundSchema {
    /// Locate the header in `rows` and bind every column of `schema`.
    ///
    /// Header and binding errors abort resolution; no partial result is returned.
    pub fn resolve(rows: Vec<Row>, schema: &Schema) -> BindResult<Self> {
        let header = resolve_header(&rows, schema)?;
        let bindings = bind_columns(&header.header, schema)?;
        Ok(Self {
            schema: schema.clone(),
            rows,
            header,
            bindings,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn header_index(&self) -> usize {
        self.header.header_index
    }

    /// Index of the first row after the header window.
    pub fn data_row_index(&self) -> usize {
        self.header.data_row_index
    }

    /// The resolved (flattened) header.
    pub fn header(&self) -> &[String] {
        &self.header.header
    }

    /// One binding per schema column, in declaration order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn binding(&self, attr: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.attr == attr)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the resolution into a lazy sequence of records.
    pub fn records(self) -> Records {
        Records::new(self.schema, self.bindings, self.rows, self.header.data_row_index)
    }
}
