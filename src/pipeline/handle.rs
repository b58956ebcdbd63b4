// src/pipeline/handle.rs

//! Run control handles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;

use crate::pipeline::crawl::{CrawlOutcome, RunSummary};

/// Cooperative stop signal for a crawl run.
///
/// Checked between pages and between items, never mid-request. A cancelled
/// run stops at the next safe boundary and returns its partial output.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the run to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Handle to a crawl run spawned on the runtime.
///
/// The caller owns the handle: it can signal cancellation and join the run
/// for its outcome. Each run has its own isolated state.
pub struct RunHandle {
    cancel: CancelToken,
    task: JoinHandle<CrawlOutcome>,
}

impl RunHandle {
    pub(crate) fn new(cancel: CancelToken, task: JoinHandle<CrawlOutcome>) -> Self {
        Self { cancel, task }
    }

    /// Signal the run to stop at its next safe boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Clone of the run's cancellation token.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the run to finish and return its outcome.
    pub async fn join(self) -> CrawlOutcome {
        self.task.await.unwrap_or_else(|e| CrawlOutcome {
            records: Vec::new(),
            summary: RunSummary::failed(format!("failed at search stage: run task died: {e}")),
        })
    }
}
