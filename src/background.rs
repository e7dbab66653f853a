//! Background task execution with completion on the interactive thread.
//!
//! Work closures run on a small pool of named worker threads. Their results
//! are queued and only handed to the completion callbacks when the owner of
//! the executor calls [`BackgroundExecutor::process_results`], typically once
//! per UI frame. Callbacks therefore always run on the interactive thread.
//!
//! ```ignore
//! let executor = BackgroundExecutor::new(2);
//! executor.spawn("load", || read_file(), |result| show(result));
//! // later, on the UI thread:
//! executor.process_results();
//! ```

use parking_lot::Mutex;
use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, trace};

/// Why a background task produced no value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error("task panicked: {0}")]
    Panicked(String),
}

pub type TaskResult<T> = Result<T, TaskError>;

type Job = Box<dyn FnOnce() + Send + 'static>;
type Completion = Box<dyn FnOnce() + Send + 'static>;

pub struct BackgroundExecutor {
    job_tx: Option<Sender<Job>>,
    result_tx: Sender<Completion>,
    result_rx: Receiver<Completion>,
    pending: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<()>>,
}

impl BackgroundExecutor {
    /// Start `worker_threads` workers (at least one).
    pub fn new(worker_threads: usize) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (result_tx, result_rx) = mpsc::channel::<Completion>();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let workers = (0..worker_threads.max(1))
            .filter_map(|index| {
                let job_rx = Arc::clone(&job_rx);
                thread::Builder::new()
                    .name(format!("tabledit-worker-{}", index))
                    .spawn(move || worker_loop(job_rx))
                    .map_err(|e| error!("Failed to start worker {}: {}", index, e))
                    .ok()
            })
            .collect();

        Self {
            job_tx: Some(job_tx),
            result_tx,
            result_rx,
            pending: Arc::new(AtomicUsize::new(0)),
            workers,
        }
    }

    /// Run `work` in the background and queue `on_complete` with its result.
    ///
    /// An `Err` from `work` becomes [`TaskError::Failed`]; a panic becomes
    /// [`TaskError::Panicked`].
    pub fn spawn<T, E, W, C>(&self, name: &str, work: W, on_complete: C)
    where
        T: Send + 'static,
        E: Display,
        W: FnOnce() -> Result<T, E> + Send + 'static,
        C: FnOnce(TaskResult<T>) + Send + 'static,
    {
        let name = name.to_string();
        let result_tx = self.result_tx.clone();
        self.pending.fetch_add(1, Ordering::SeqCst);

        let job: Job = Box::new(move || {
            trace!("Task '{}' started", name);
            let result = match panic::catch_unwind(AssertUnwindSafe(work)) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(TaskError::Failed(e.to_string())),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("Task '{}' panicked: {}", name, message);
                    Err(TaskError::Panicked(message))
                }
            };
            trace!("Task '{}' finished", name);
            let _ = result_tx.send(Box::new(move || on_complete(result)));
        });

        let sent = self.job_tx.as_ref().map(|tx| tx.send(job));
        if !matches!(sent, Some(Ok(()))) {
            error!("Background executor is shut down, task dropped");
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Run every completion that has arrived. Returns how many ran.
    pub fn process_results(&self) -> usize {
        let mut processed = 0;
        while let Ok(completion) = self.result_rx.try_recv() {
            self.complete(completion);
            processed += 1;
        }
        processed
    }

    /// Block up to `timeout` for the first completion, then drain the rest.
    pub fn wait_for_results(&self, timeout: Duration) -> usize {
        match self.result_rx.recv_timeout(timeout) {
            Ok(completion) => {
                self.complete(completion);
                1 + self.process_results()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn complete(&self, completion: Completion) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        completion();
    }

    /// Tasks spawned whose completion has not run yet
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }
}

impl Default for BackgroundExecutor {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_WORKER_THREADS)
    }
}

impl Drop for BackgroundExecutor {
    fn drop(&mut self) {
        // Closing the job channel ends every worker loop
        self.job_tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        debug!("Background executor shut down");
    }
}

fn worker_loop(job_rx: Arc<Mutex<Receiver<Job>>>) {
    loop {
        let job = job_rx.lock().recv();
        match job {
            Ok(job) => job(),
            Err(_) => break,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
