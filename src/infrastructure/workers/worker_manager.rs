use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::workers::JobProcessor;
use crate::shared::utils::now_timestamp;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatus {
    pub initialized: bool,
    pub running: bool,
    pub started_at: Option<String>,
    pub start_count: u64,
}

struct RunningWorker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

#[derive(Default)]
struct WorkerState {
    initialized: bool,
    started_at: Option<String>,
    worker: Option<RunningWorker>,
}

impl WorkerState {
    fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|w| !w.handle.is_finished())
            .unwrap_or(false)
    }
}

/// Owns the single background job worker.
///
/// Start requests are serialised on an async mutex, so any number of concurrent
/// callers of `ensure_started` end up with one running worker.
pub struct WorkerManager {
    processor: Arc<JobProcessor>,
    state: Mutex<WorkerState>,
    start_count: AtomicU64,
}

impl WorkerManager {
    pub fn new(processor: Arc<JobProcessor>) -> Self {
        Self {
            processor,
            state: Mutex::new(WorkerState::default()),
            start_count: AtomicU64::new(0),
        }
    }

    fn snapshot(&self, state: &WorkerState) -> WorkerStatus {
        WorkerStatus {
            initialized: state.initialized,
            running: state.is_running(),
            started_at: state.started_at.clone(),
            start_count: self.start_count.load(Ordering::SeqCst),
        }
    }

    /// Start the worker unless it is already running
    pub async fn ensure_started(&self) -> WorkerStatus {
        let mut state = self.state.lock().await;

        if state.is_running() {
            return self.snapshot(&state);
        }

        if !state.initialized {
            if let Err(e) = self.processor.schedule_recurring_jobs().await {
                tracing::error!("Failed to schedule recurring jobs: {}", e);
            }
            state.initialized = true;
        } else {
            tracing::warn!("Job worker was not running, restarting");
        }

        let cancel = CancellationToken::new();
        let processor = self.processor.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            processor.run(token).await;
        });

        state.worker = Some(RunningWorker { handle, cancel });
        state.started_at = Some(now_timestamp());
        let count = self.start_count.fetch_add(1, Ordering::SeqCst) + 1;

        metrics::counter!("worker_starts_total").increment(1);
        tracing::info!("Job worker started (start #{})", count);

        self.snapshot(&state)
    }

    pub async fn status(&self) -> WorkerStatus {
        let state = self.state.lock().await;
        self.snapshot(&state)
    }

    /// Cancel the worker and wait for its current job to finish
    pub async fn stop(&self) {
        let worker = {
            let mut state = self.state.lock().await;
            state.worker.take()
        };

        if let Some(worker) = worker {
            worker.cancel.cancel();
            if let Err(e) = worker.handle.await {
                tracing::error!("Job worker task ended abnormally: {}", e);
            }
            tracing::info!("Job worker stopped");
        }
    }
}
