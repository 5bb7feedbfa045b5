//! Row providers and read entrypoints.
//!
//! The binder only needs one capability from a data source: [`RowProvider::rows`], a finite,
//! ordered, fully buffered sequence of rows. This module ships providers for:
//!
//! - in-memory rows ([`MemoryProvider`])
//! - CSV files and readers ([`csv`])
//! - spreadsheet workbooks, behind the Cargo feature `excel` ([`excel`])
//!
//! Most callers should use [`read_path`] (from [`unified`]) which picks a provider by file
//! extension, resolves the schema, materializes every record and optionally reports the outcome
//! to a [`ReadObserver`]. [`read`] is the lazy variant for an already constructed provider.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod observability;
pub mod unified;

use crate::error::{BindResult, ProviderError};
use crate::record::Records;
use crate::resolve::BoundSchema;
use crate::schema::Schema;
use crate::types::Row;

pub use observability::{
    FileObserver, ReadContext, ReadEvent, ReadObserver, ReadSeverity, ReadSummary, StdErrObserver,
};
pub use unified::{read_path, ProviderFormat, ReadOptions, SheetSelection};

/// Source of raw rows.
///
/// Rows may differ in length, and a row with zero cells is valid input.
pub trait RowProvider {
    fn rows(&mut self) -> Result<Vec<Row>, ProviderError>;
}

/// Rows already held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryProvider {
    rows: Vec<Row>,
}

impl MemoryProvider {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl RowProvider for MemoryProvider {
    fn rows(&mut self) -> Result<Vec<Row>, ProviderError> {
        Ok(std::mem::take(&mut self.rows))
    }
}

impl<P: RowProvider + ?Sized> RowProvider for Box<P> {
    fn rows(&mut self) -> Result<Vec<Row>, ProviderError> {
        (**self).rows()
    }
}

/// Resolve `schema` against the rows of `provider` and return the lazy record sequence.
///
/// Provider errors are returned unchanged inside [`crate::BindError::Provider`].
pub fn read<P: RowProvider + ?Sized>(provider: &mut P, schema: &Schema) -> BindResult<Records> {
    let rows = provider.rows()?;
    Ok(BoundSchema::resolve(rows, schema)?.records())
}
