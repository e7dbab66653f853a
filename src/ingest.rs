//! File ingestion off the interactive thread.
//!
//! [`IngestPipeline`] turns [`FileDescriptor`]s into sanitized tables on a
//! background worker and hands them back through a completion callback that
//! runs on the interactive thread (see [`IngestPipeline::process_completions`]).
//!
//! ## Single read
//!
//! [`IngestPipeline::read_one`] delivers `Some(LoadedTable)` or `None`. On
//! `None` a user-facing report has already gone to the [`ErrorSink`].
//!
//! ## Bulk read
//!
//! [`IngestPipeline::read_all`] walks the list in order as one unit of work:
//!
//! ```text
//! Pending → Running → Completed
//!                   ↘ Cancelled   (cancel flag seen before a file)
//! ```
//!
//! Missing files are passed over with a log-only `Skipped` notice, failing
//! files with a log-only error report. Neither stops the batch. The callback
//! receives the tables that loaded, in input order, exactly once. If the
//! unit of work itself dies, the tables loaded up to that point are still
//! delivered and an `Io` report names the file it was on.

use crate::background::{BackgroundExecutor, TaskResult};
use crate::data::{DataResult, FsTableStore, TableStore};
use crate::file::FileDescriptor;
use crate::report::{ErrorSink, IngestReport, ReportKind};
use crate::sanitize::sanitize;
use crate::settings::Settings;
use crate::types::Table;
use parking_lot::Mutex;
use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// A sanitized table together with the file it came from
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedTable {
    pub table: Table,
    pub file: FileDescriptor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkReadState {
    Pending,
    Running,
    Completed,
    Cancelled,
}

impl BulkReadState {
    pub fn is_finished(&self) -> bool {
        matches!(self, BulkReadState::Completed | BulkReadState::Cancelled)
    }
}

/// Outcome delivered to a bulk read's callback
#[derive(Debug)]
pub struct BulkReadResult {
    /// `Completed` or `Cancelled`
    pub state: BulkReadState,
    /// Successfully loaded files, in input order
    pub tables: Vec<LoadedTable>,
}

impl BulkReadResult {
    pub fn is_cancelled(&self) -> bool {
        self.state == BulkReadState::Cancelled
    }
}

/// Control handle for a running bulk read
#[derive(Clone, Debug)]
pub struct BulkReadHandle {
    cancel: Arc<AtomicBool>,
    state: Arc<Mutex<BulkReadState>>,
}

impl BulkReadHandle {
    fn new() -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(BulkReadState::Pending)),
        }
    }

    /// Ask the read to stop before its next file.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> BulkReadState {
        *self.state.lock()
    }

    fn set_state(&self, state: BulkReadState) {
        *self.state.lock() = state;
    }
}

/// Work done so far by a bulk read, shared between the worker and the
/// completion.
#[derive(Default)]
struct BulkProgress {
    tables: Vec<LoadedTable>,
    /// File being processed
    current: Option<PathBuf>,
}

pub struct IngestPipeline {
    executor: BackgroundExecutor,
    store: Arc<dyn TableStore>,
    sink: Arc<dyn ErrorSink>,
}

impl IngestPipeline {
    pub fn new(
        store: Arc<dyn TableStore>,
        sink: Arc<dyn ErrorSink>,
        executor: BackgroundExecutor,
    ) -> Self {
        Self {
            executor,
            store,
            sink,
        }
    }

    /// Filesystem store and executor configured from `settings`
    pub fn from_settings(settings: &Settings, sink: Arc<dyn ErrorSink>) -> Self {
        Self::new(
            Arc::new(FsTableStore::from_settings(settings)),
            sink,
            BackgroundExecutor::new(settings.worker_threads),
        )
    }

    pub fn store(&self) -> &Arc<dyn TableStore> {
        &self.store
    }

    /// Load one file in the background.
    ///
    /// `on_complete` runs on the thread that calls
    /// [`process_completions`](Self::process_completions).
    pub fn read_one<F>(&self, file: FileDescriptor, on_complete: F)
    where
        F: FnOnce(Option<LoadedTable>) + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let path = file.path().to_path_buf();
        let name = format!("read_one {}", file.display_name());

        self.executor.spawn(
            &name,
            move || Ok::<_, Infallible>(load_one(store.as_ref(), file)),
            move |result: TaskResult<Result<LoadedTable, IngestReport>>| {
                let loaded = match result {
                    Ok(Ok(loaded)) => Some(loaded),
                    Ok(Err(report)) => {
                        sink.report(report.surfaced());
                        None
                    }
                    Err(e) => {
                        sink.report(
                            IngestReport::new(path, ReportKind::Io, e.to_string()).surfaced(),
                        );
                        None
                    }
                };
                on_complete(loaded);
            },
        );
    }

    /// Load several files in order as one background unit of work.
    pub fn read_all<F>(&self, files: Vec<FileDescriptor>, on_complete: F) -> BulkReadHandle
    where
        F: FnOnce(BulkReadResult) + Send + 'static,
    {
        let handle = BulkReadHandle::new();
        let worker_handle = handle.clone();
        let completion_handle = handle.clone();
        let store = Arc::clone(&self.store);
        let worker_sink = Arc::clone(&self.sink);
        let completion_sink = Arc::clone(&self.sink);
        let progress = Arc::new(Mutex::new(BulkProgress::default()));
        let worker_progress = Arc::clone(&progress);

        self.executor.spawn(
            "read_all",
            move || {
                Ok::<_, Infallible>(load_all(
                    store.as_ref(),
                    worker_sink.as_ref(),
                    files,
                    &worker_handle,
                    &worker_progress,
                ))
            },
            move |result: TaskResult<BulkReadState>| {
                let mut progress = std::mem::take(&mut *progress.lock());
                let state = result.unwrap_or_else(|e| {
                    error!(
                        "Bulk read aborted with {} files loaded: {}",
                        progress.tables.len(),
                        e
                    );
                    completion_sink.report(IngestReport::new(
                        progress.current.take().unwrap_or_default(),
                        ReportKind::Io,
                        format!("Bulk read aborted: {}", e),
                    ));
                    completion_handle.set_state(BulkReadState::Completed);
                    BulkReadState::Completed
                });
                on_complete(BulkReadResult {
                    state,
                    tables: progress.tables,
                });
            },
        );
        handle
    }

    /// Deliver finished loads to their callbacks. Call from the interactive
    /// thread, e.g. once per frame.
    pub fn process_completions(&self) -> usize {
        self.executor.process_results()
    }

    /// Block up to `timeout` for a finished load, then deliver everything
    /// that is ready.
    pub fn wait_for_completions(&self, timeout: Duration) -> usize {
        self.executor.wait_for_results(timeout)
    }

    pub fn has_pending(&self) -> bool {
        self.executor.has_pending()
    }
}

/// Read and sanitize a file the store reports as present.
fn read_table(store: &dyn TableStore, file: &FileDescriptor) -> DataResult<Table> {
    let start = Instant::now();
    let mut table = store.read(file)?;
    sanitize(&mut table);
    debug!(
        "Read {} ({} rows) in {:?}",
        file.path().display(),
        table.row_count(),
        start.elapsed()
    );
    Ok(table)
}

fn load_one(store: &dyn TableStore, file: FileDescriptor) -> Result<LoadedTable, IngestReport> {
    if !store.exists(&file) {
        return Err(IngestReport::new(
            file.path(),
            ReportKind::MissingFile,
            "File not found",
        ));
    }
    match read_table(store, &file) {
        Ok(table) => Ok(LoadedTable { table, file }),
        Err(e) => Err(IngestReport::from_error(file.path(), &e)),
    }
}

fn load_all(
    store: &dyn TableStore,
    sink: &dyn ErrorSink,
    files: Vec<FileDescriptor>,
    handle: &BulkReadHandle,
    progress: &Mutex<BulkProgress>,
) -> BulkReadState {
    handle.set_state(BulkReadState::Running);
    let total = files.len();
    let mut loaded = 0;
    info!("Bulk read of {} files started", total);

    for (index, file) in files.into_iter().enumerate() {
        if handle.is_cancel_requested() {
            info!(
                "Bulk read cancelled after {} of {} files ({} loaded)",
                index, total, loaded
            );
            handle.set_state(BulkReadState::Cancelled);
            return BulkReadState::Cancelled;
        }
        progress.lock().current = Some(file.path().to_path_buf());

        // A panicking store costs only its own file
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if !store.exists(&file) {
                return Err(IngestReport::new(
                    file.path(),
                    ReportKind::Skipped,
                    "File not found",
                ));
            }
            read_table(store, &file).map_err(|e| IngestReport::from_error(file.path(), &e))
        }))
        .unwrap_or_else(|_| {
            Err(IngestReport::new(
                file.path(),
                ReportKind::Io,
                "Reader panicked",
            ))
        });

        match outcome {
            Ok(table) => {
                loaded += 1;
                progress.lock().tables.push(LoadedTable { table, file });
            }
            Err(report) => sink.report(report),
        }
    }

    info!("Bulk read finished: {} of {} files loaded", loaded, total);
    handle.set_state(BulkReadState::Completed);
    BulkReadState::Completed
}
