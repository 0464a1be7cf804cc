//! Bookkeeping for open station streams.
//!
//! Every stream task is spawned through the registry. The registry hands out
//! child cancellation tokens of one root token, so [`StreamRegistry::shutdown`]
//! stops all streams at once and waits for their tasks to finish.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

/// Counters shared by all stream tasks.
#[derive(Debug, Default)]
pub struct StreamStats {
    open: AtomicUsize,
    opened_total: AtomicU64,
    emitted_total: AtomicU64,
}

impl StreamStats {
    /// Streams currently running.
    pub fn open_streams(&self) -> usize {
        self.open.load(Ordering::Relaxed)
    }

    /// Streams started since boot.
    pub fn opened_total(&self) -> u64 {
        self.opened_total.load(Ordering::Relaxed)
    }

    /// Updates sent to clients since boot.
    pub fn emitted_total(&self) -> u64 {
        self.emitted_total.load(Ordering::Relaxed)
    }

    pub(crate) fn record_emission(&self) {
        self.emitted_total.fetch_add(1, Ordering::Relaxed);
    }
}

/// Decrements the open-stream count when a stream task ends.
pub(crate) struct OpenStreamGuard {
    stats: Arc<StreamStats>,
}

impl Drop for OpenStreamGuard {
    fn drop(&mut self) {
        self.stats.open.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Tracks stream tasks and owns the shutdown signal.
#[derive(Clone, Default)]
pub struct StreamRegistry {
    root: CancellationToken,
    tracker: TaskTracker,
    stats: Arc<StreamStats>,
    next_id: Arc<AtomicU64>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &Arc<StreamStats> {
        &self.stats
    }

    pub fn open_streams(&self) -> usize {
        self.stats.open_streams()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Register a new stream: returns its id, its cancellation token and the
    /// guard that keeps it counted as open.
    pub(crate) fn register(&self) -> (u64, CancellationToken, OpenStreamGuard) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.stats.open.fetch_add(1, Ordering::Relaxed);
        self.stats.opened_total.fetch_add(1, Ordering::Relaxed);
        let guard = OpenStreamGuard {
            stats: self.stats.clone(),
        };
        (id, self.root.child_token(), guard)
    }

    /// Spawn a stream task on the tracker.
    pub(crate) fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tracker.spawn(task);
    }

    /// Cancel every open stream and wait until their tasks have returned.
    pub async fn shutdown(&self) {
        info!(open = self.open_streams(), "Stopping station streams");
        self.root.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        info!("All station streams stopped");
    }
}
