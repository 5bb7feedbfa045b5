//! Read outcome reporting.
//!
//! [`super::read_path`] reports one [`ReadEvent`] per read to a [`ReadObserver`]. Both built-in
//! observers render events as a single `key=value` line via [`ReadEvent::line`].

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::BindError;

use super::unified::ProviderFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadSeverity {
    Info,
    Warning,
    /// The read failed.
    Error,
    /// Infrastructure failure (I/O), alerting by default.
    Critical,
}

/// Which file was read, how, and for which schema.
#[derive(Debug, Clone)]
pub struct ReadContext {
    pub path: PathBuf,
    pub format: ProviderFormat,
    /// Schema name.
    pub schema: String,
}

/// Where the header was found and what materialization produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSummary {
    /// First row of the header window.
    pub header_index: usize,
    /// First row after the header window.
    pub data_row_index: usize,
    /// Records produced.
    pub records: usize,
    /// Source row indices dropped by `skip_invalid_row` columns.
    pub skipped_rows: Vec<usize>,
}

/// One reported read outcome.
#[derive(Debug, Clone, Copy)]
pub enum ReadEvent<'a> {
    Succeeded(&'a ReadSummary),
    Failed(ReadSeverity, &'a BindError),
    Alert(ReadSeverity, &'a BindError),
}

impl ReadEvent<'_> {
    /// Render the event as `<kind> schema=.. format=.. path=.. <details>`.
    pub fn line(&self, ctx: &ReadContext) -> String {
        let kind = match self {
            ReadEvent::Succeeded(_) => "ok".to_string(),
            ReadEvent::Failed(sev, _) => format!("fail severity={sev:?}"),
            ReadEvent::Alert(sev, _) => format!("ALERT severity={sev:?}"),
        };
        let mut line = format!(
            "{kind} schema={} format={:?} path={}",
            ctx.schema,
            ctx.format,
            ctx.path.display()
        );
        match self {
            ReadEvent::Succeeded(summary) => {
                let _ = write!(
                    line,
                    " header_row={} data_row={} records={} skipped={}",
                    summary.header_index,
                    summary.data_row_index,
                    summary.records,
                    summary.skipped_rows.len()
                );
                if !summary.skipped_rows.is_empty() {
                    let rows: Vec<String> = summary.skipped_rows.iter().map(usize::to_string).collect();
                    let _ = write!(line, " skipped_rows={}", rows.join(","));
                }
            }
            ReadEvent::Failed(_, err) | ReadEvent::Alert(_, err) => {
                let _ = write!(line, " err={err}");
            }
        }
        line
    }
}

/// Receives read outcomes. Implementors can record metrics, log, or page someone.
pub trait ReadObserver: Send + Sync {
    fn on_success(&self, _ctx: &ReadContext, _summary: &ReadSummary) {}

    fn on_failure(&self, _ctx: &ReadContext, _severity: ReadSeverity, _error: &BindError) {}

    /// Called after `on_failure` when the severity meets the alert threshold.
    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &BindError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Logs read events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl StdErrObserver {
    fn emit(&self, ctx: &ReadContext, event: ReadEvent<'_>) {
        eprintln!("[rowbind] {}", event.line(ctx));
    }
}

impl ReadObserver for StdErrObserver {
    fn on_success(&self, ctx: &ReadContext, summary: &ReadSummary) {
        self.emit(ctx, ReadEvent::Succeeded(summary));
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &BindError) {
        self.emit(ctx, ReadEvent::Failed(severity, error));
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &BindError) {
        self.emit(ctx, ReadEvent::Alert(severity, error));
    }
}

/// Appends timestamped read events to a log file.
///
/// The file is opened once, in append mode, when the observer is created. Write failures after
/// that are ignored.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileObserver {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn emit(&self, ctx: &ReadContext, event: ReadEvent<'_>) {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{secs} {}", event.line(ctx));
        }
    }
}

impl ReadObserver for FileObserver {
    fn on_success(&self, ctx: &ReadContext, summary: &ReadSummary) {
        self.emit(ctx, ReadEvent::Succeeded(summary));
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &BindError) {
        self.emit(ctx, ReadEvent::Failed(severity, error));
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &BindError) {
        self.emit(ctx, ReadEvent::Alert(severity, error));
    }
}
