#![cfg(feature = "excel")]

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::ProviderError;
use crate::types::{Row, Value};

use super::RowProvider;

/// Reads one worksheet of a workbook (`.xlsx`, `.xls`, `.xlsb`, `.ods`, etc.).
///
/// Behavior:
/// - Picks `sheet` if provided; otherwise uses the first sheet in the workbook
/// - Returns every row of the sheet's used range, leading rows included
/// - Converts cells into [`Value`]s; empty cells become [`Value::Null`]
#[derive(Debug, Clone)]
pub struct ExcelProvider {
    path: PathBuf,
    sheet: Option<String>,
}

impl ExcelProvider {
    pub fn new(path: impl AsRef<Path>, sheet: Option<&str>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet: sheet.map(str::to_string),
        }
    }
}

impl RowProvider for ExcelProvider {
    fn rows(&mut self) -> Result<Vec<Row>, ProviderError> {
        let mut workbook = open_workbook_auto(&self.path)?;

        let names = workbook.sheet_names().to_vec();
        let sheet = match &self.sheet {
            Some(name) if names.iter().any(|n| n == name) => name.clone(),
            Some(name) => return Err(ProviderError::SheetNotFound { sheet: name.clone() }),
            None => names.first().cloned().ok_or_else(|| ProviderError::SheetNotFound {
                sheet: "<first>".to_string(),
            })?,
        };

        let range = workbook.worksheet_range(&sheet)?;
        Ok(range
            .rows()
            .map(|row| row.iter().map(cell_to_value).collect())
            .collect())
    }
}

fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::Float64(dt.as_f64()),
        Data::DateTimeIso(s) => Value::Utf8(s.clone()),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
        Data::Error(e) => Value::Utf8(format!("{e:?}")),
    }
}
