use std::path::PathBuf;

use thiserror::Error;

use crate::types::Value;

/// Convenience result type for schema resolution and record materialization.
pub type BindResult<T> = Result<T, BindError>;

/// Error type returned by schema construction, header resolution, binding and materialization.
///
/// Every failure surfaces as its own variant so callers can discriminate programmatically.
#[derive(Debug, Error)]
pub enum BindError {
    /// No candidate header window matched any required column.
    #[error("header not found")]
    HeaderNotFound,

    /// Some, but not all, required columns were found.
    ///
    /// `columns` holds the patterns of the unmatched columns, in declaration order.
    #[error("missing required columns: {}", .columns.join(", "))]
    MissingRequiredColumns { columns: Vec<String> },

    /// A bound column's validator rejected a cell and the column does not skip invalid rows.
    #[error("invalid row {row}: column '{column}' rejected value {value}")]
    InvalidRow {
        row: usize,
        column: String,
        value: Value,
    },

    /// A validator returned something other than a boolean. Always a configuration bug.
    #[error("incompatible validator return type for column '{column}': expected bool, got {returned}")]
    IncompatibleValidatorReturn { column: String, returned: String },

    /// A cell could not be converted into the column's declared type.
    #[error("failed to convert value at row {row} column '{column}': {message} (raw='{raw}')")]
    Conversion {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// The schema declaration itself is inconsistent.
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },

    /// A column regex failed to compile.
    #[error("invalid column pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Schema definition parsing or record deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Propagated unchanged from the row source.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Errors raised by row providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Workbook decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// No provider is known for the path's extension.
    #[error("cannot infer provider format for path ({})", .path.display())]
    UnknownFormat { path: PathBuf },

    /// The requested worksheet does not exist.
    #[error("sheet '{sheet}' not found")]
    SheetNotFound { sheet: String },

    /// The provider is not compiled in.
    #[error("{message}")]
    Unsupported { message: String },
}
