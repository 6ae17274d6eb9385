//! Background imports
//!
//! An [`ImportTask`] runs one importer on its own thread and streams
//! [`Progress`] back over a channel. Cancellation is cooperative: the flag
//! set by [`ImportTask::cancel`] is checked when the import finishes, and a
//! cancelled task discards its result.

use crate::error::{DatatoolError, DatatoolResult};
use crate::import::{Importer, ProgressReporter};
use crate::settings::Settings;
use crate::types::Table;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Progress reported by a running import.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Message(String),
    Percent(u8),
}

struct ChannelReporter {
    tx: Sender<Progress>,
}

impl ProgressReporter for ChannelReporter {
    fn message(&self, message: &str) {
        // the receiver may already be gone
        let _ = self.tx.send(Progress::Message(message.to_string()));
    }

    fn percent(&self, percent: u8) {
        let _ = self.tx.send(Progress::Percent(percent.min(100)));
    }
}

/// One import running on a worker thread.
pub struct ImportTask {
    handle: JoinHandle<DatatoolResult<Table>>,
    progress: Receiver<Progress>,
    cancelled: Arc<AtomicBool>,
}

impl ImportTask {
    /// Start `importer` on a new thread. Settings are shared read-only.
    pub fn spawn(importer: Box<dyn Importer>, settings: Arc<Settings>) -> Self {
        let (tx, progress) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = thread::spawn(move || {
            debug!(source = %importer.source().display(), "import task started");
            let reporter = ChannelReporter { tx };
            let result = importer.import_data(&settings, &reporter);

            if flag.load(Ordering::SeqCst) {
                debug!("import task cancelled");
                return Err(DatatoolError::Cancelled);
            }
            if result.is_ok() {
                reporter.percent(100);
            }
            result
        });

        Self {
            handle,
            progress,
            cancelled,
        }
    }

    /// Request cancellation. Takes effect once the import returns.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Progress received so far, without blocking.
    pub fn poll_progress(&self) -> Vec<Progress> {
        self.progress.try_iter().collect()
    }

    /// Block until the next progress event. `None` once the task has
    /// finished and every event has been received.
    pub fn next_progress(&self) -> Option<Progress> {
        self.progress.recv().ok()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the import to finish.
    pub fn join(self) -> DatatoolResult<Table> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => {
                warn!("import task panicked");
                Err(DatatoolError::Import {
                    path: Default::default(),
                    message: "import task panicked".to_string(),
                    source: None,
                })
            }
        }
    }
}
