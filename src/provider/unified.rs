//! Unified path-based read entrypoint.
//!
//! Most callers should use [`read_path`], which reads a file into validated [`Record`]s using a
//! provided [`Schema`].
//!
//! - If [`ReadOptions::format`] is `None`, the provider is inferred from the file extension.
//! - If a [`super::observability::ReadObserver`] is provided, success/failure/alerts are
//!   reported to it.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{BindError, BindResult, ProviderError};
use crate::record::Record;
use crate::resolve::BoundSchema;
use crate::schema::Schema;

use super::csv::CsvProvider;
use super::observability::{ReadContext, ReadObserver, ReadSeverity, ReadSummary};
use super::RowProvider;

/// Built-in provider formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFormat {
    /// Delimiter-separated text (`.csv`, `.tsv`).
    Csv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
}

impl ProviderFormat {
    /// Look up a format by file extension (case-insensitive, leading dot optional).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "tsv" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// How to choose the worksheet when reading a workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelection {
    /// Read the first sheet (default).
    #[default]
    First,
    /// Read a single named sheet.
    Sheet(String),
}

/// Options controlling [`read_path`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ReadOptions {
    /// If `None`, infer the provider from the file extension.
    pub format: Option<ProviderFormat>,
    /// Worksheet to read from workbooks.
    pub sheet: SheetSelection,
    /// CSV field delimiter. If `None`, `.tsv` files use tab and everything else uses comma.
    pub csv_delimiter: Option<u8>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ReadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ReadSeverity,
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("format", &self.format)
            .field("sheet", &self.sheet)
            .field("csv_delimiter", &self.csv_delimiter)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            format: None,
            sheet: SheetSelection::default(),
            csv_delimiter: None,
            observer: None,
            alert_at_or_above: ReadSeverity::Critical,
        }
    }
}

/// Read every record of the file at `path`.
///
/// Unlike [`super::read`], this materializes eagerly so the outcome can be reported. When an
/// observer is configured, this function reports:
///
/// - `on_success` on success, with the header position, record count and skipped rows
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use rowbind::provider::{read_path, ReadOptions};
/// use rowbind::schema::{Column, Schema};
///
/// # fn main() -> Result<(), rowbind::BindError> {
/// let schema = Schema::builder("Person")
///     .column("id", Column::new("ID"))
///     .column("name", Column::new("Name"))
///     .build()?;
///
/// // Uses `.csv` to select the CSV provider.
/// let people = read_path("people.csv", &schema, &ReadOptions::default())?;
/// println!("records={}", people.len());
/// # Ok(())
/// # }
/// ```
///
/// ## Observability (stderr logging + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use rowbind::provider::{read_path, ReadOptions, ReadSeverity, StdErrObserver};
/// use rowbind::schema::{Column, Schema};
///
/// # fn main() -> Result<(), rowbind::BindError> {
/// let schema = Schema::builder("Person").column("id", Column::new("ID")).build()?;
///
/// let opts = ReadOptions {
///     observer: Some(Arc::new(StdErrObserver::default())),
///     alert_at_or_above: ReadSeverity::Critical,
///     ..Default::default()
/// };
///
/// // Missing files are treated as Critical and will trigger `on_alert` at this threshold.
/// let _err = read_path("does_not_exist.csv", &schema, &opts).unwrap_err();
/// # Ok(())
/// # }
/// ```
pub fn read_path(path: impl AsRef<Path>, schema: &Schema, options: &ReadOptions) -> BindResult<Vec<Record>> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let ctx = ReadContext {
        path: path.to_path_buf(),
        format,
        schema: schema.name().to_string(),
    };

    let result = open_provider(path, format, options).and_then(|mut provider| {
        let bound = BoundSchema::resolve(provider.rows()?, schema)?;
        let (header_index, data_row_index) = (bound.header_index(), bound.data_row_index());
        let mut records = bound.records();
        let out = records.by_ref().collect::<BindResult<Vec<_>>>()?;
        let summary = ReadSummary {
            header_index,
            data_row_index,
            records: out.len(),
            skipped_rows: records.skipped_rows().to_vec(),
        };
        Ok((out, summary))
    });

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok((_, summary)) => obs.on_success(&ctx, summary),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result.map(|(records, _)| records)
}

fn open_provider(path: &Path, format: ProviderFormat, options: &ReadOptions) -> BindResult<Box<dyn RowProvider>> {
    match format {
        ProviderFormat::Csv => {
            let delimiter = options.csv_delimiter.unwrap_or_else(|| {
                let is_tsv = path
                    .extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
                if is_tsv { b'\t' } else { b',' }
            });
            Ok(Box::new(CsvProvider::from_path(path, delimiter)?))
        }
        ProviderFormat::Excel => open_excel(path, &options.sheet),
    }
}

fn open_excel(path: &Path, sheet: &SheetSelection) -> BindResult<Box<dyn RowProvider>> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, sheet);

    #[cfg(feature = "excel")]
    {
        use super::excel::ExcelProvider;

        let name = match sheet {
            SheetSelection::First => None,
            SheetSelection::Sheet(name) => Some(name.as_str()),
        };
        Ok(Box::new(ExcelProvider::new(path, name)))
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(ProviderError::Unsupported {
            message: "excel provider not enabled (enable cargo feature 'excel')".to_string(),
        }
        .into())
    }
}

fn severity_for_error(e: &BindError) -> ReadSeverity {
    match e {
        BindError::Provider(ProviderError::Io(_)) => ReadSeverity::Critical,
        BindError::Provider(ProviderError::Csv(err)) => match err.kind() {
            ::csv::ErrorKind::Io(_) => ReadSeverity::Critical,
            _ => ReadSeverity::Error,
        },
        #[cfg(feature = "excel")]
        BindError::Provider(ProviderError::Excel(err)) => {
            if error_chain_contains_io(err) {
                ReadSeverity::Critical
            } else {
                ReadSeverity::Error
            }
        }
        _ => ReadSeverity::Error,
    }
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn infer_format_from_path(path: &Path) -> BindResult<ProviderFormat> {
    path.extension()
        .and_then(|s| s.to_str())
        .and_then(ProviderFormat::from_extension)
        .ok_or_else(|| {
            ProviderError::UnknownFormat {
                path: path.to_path_buf(),
            }
            .into()
        })
}
