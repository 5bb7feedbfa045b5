//! CSV row provider.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ProviderError;
use crate::types::{Row, Value};

use super::RowProvider;

/// Reads every record of a CSV source as one raw row.
///
/// Rules:
///
/// - No row is treated as a header; header detection belongs to the binder.
/// - Rows may have different lengths.
/// - Empty fields become [`Value::Null`]; everything else stays text, conversion is left to the
///   schema's declared types.
pub struct CsvProvider<R> {
    reader: csv::Reader<R>,
}

impl CsvProvider<File> {
    /// Open a CSV file with the given field delimiter.
    pub fn from_path(path: impl AsRef<Path>, delimiter: u8) -> Result<Self, ProviderError> {
        let reader = builder(delimiter).from_path(path)?;
        Ok(Self { reader })
    }
}

impl<R: Read> CsvProvider<R> {
    /// Wrap any reader with the given field delimiter.
    pub fn from_reader(rdr: R, delimiter: u8) -> Self {
        Self {
            reader: builder(delimiter).from_reader(rdr),
        }
    }
}

fn builder(delimiter: u8) -> csv::ReaderBuilder {
    let mut b = csv::ReaderBuilder::new();
    b.has_headers(false).flexible(true).delimiter(delimiter);
    b
}

impl<R: Read> RowProvider for CsvProvider<R> {
    fn rows(&mut self) -> Result<Vec<Row>, ProviderError> {
        let mut rows = Vec::new();
        for result in self.reader.records() {
            let record = result?;
            rows.push(record.iter().map(field_to_value).collect());
        }
        Ok(rows)
    }
}

fn field_to_value(raw: &str) -> Value {
    if raw.is_empty() {
        Value::Null
    } else {
        Value::Utf8(raw.to_owned())
    }
}
