//! Side channel for ingestion failures.
//!
//! The pipeline never returns load errors through its callbacks. Instead it
//! hands an [`IngestReport`] to an [`ErrorSink`]: `surface` reports are meant
//! for the user (a toast or dialog), the rest only belong in the log.

use crate::data::DataError;
use parking_lot::Mutex;
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// What went wrong with a file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// The file does not exist (single read)
    MissingFile,
    /// The file does not exist and was passed over (bulk read)
    Skipped,
    /// Delimited text could not be parsed
    MalformedInput,
    /// Any other read failure
    Io,
}

impl ReportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::MissingFile => "Missing file",
            ReportKind::Skipped => "Skipped",
            ReportKind::MalformedInput => "Malformed input",
            ReportKind::Io => "I/O error",
        }
    }

    /// Classify a store error.
    pub fn for_error(error: &DataError) -> Self {
        if error.is_malformed_input() {
            ReportKind::MalformedInput
        } else {
            ReportKind::Io
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestReport {
    pub path: PathBuf,
    pub kind: ReportKind,
    pub message: String,
    /// Show to the user rather than only logging
    pub surface: bool,
}

impl IngestReport {
    pub fn new(path: impl Into<PathBuf>, kind: ReportKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
            surface: false,
        }
    }

    pub fn from_error(path: impl Into<PathBuf>, error: &DataError) -> Self {
        Self::new(path, ReportKind::for_error(error), error.to_string())
    }

    pub fn surfaced(mut self) -> Self {
        self.surface = true;
        self
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}",
            self.kind.label(),
            self.path.display(),
            self.message
        )
    }
}

/// Receiver of ingestion reports. Called from worker threads and from the
/// interactive thread.
pub trait ErrorSink: Send + Sync {
    fn report(&self, report: IngestReport);
}

/// Sink that only logs
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, report: IngestReport) {
        match (report.surface, report.kind) {
            (true, _) => error!("{}", report),
            (false, ReportKind::Skipped) => info!("{}", report),
            (false, _) => warn!("{}", report),
        }
    }
}

/// Sink that logs and keeps every report until drained.
///
/// The host UI drains it each frame to raise notifications.
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<IngestReport>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.reports.lock().len()
    }

    /// Snapshot of all reports so far
    pub fn reports(&self) -> Vec<IngestReport> {
        self.reports.lock().clone()
    }

    /// Take all reports, leaving the sink empty
    pub fn drain(&self) -> Vec<IngestReport> {
        std::mem::take(&mut *self.reports.lock())
    }

    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, report: IngestReport) {
        TracingSink.report(report.clone());
        self.reports.lock().push(report);
    }
}
