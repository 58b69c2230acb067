//! Cooperative cancellation for in-flight flows.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Cancellation token observed at every suspension point in the SDK.
///
/// Cloneable handle over a broadcast channel; any clone can trigger, all
/// clones observe. Cancellation is cooperative: a pending sleep or fetch is
/// raced against `cancelled()` rather than preempted.
#[derive(Clone)]
pub struct CancelToken {
    tx: broadcast::Sender<()>,
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, untriggered token.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Trigger cancellation. Idempotent.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    /// Whether cancellation has been triggered.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation is triggered. Intended for use inside
    /// `tokio::select!` against sleeps and fetches.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let mut rx = self.tx.subscribe();
        // Re-check after subscribing so a trigger racing the subscription
        // is not missed.
        while !self.is_cancelled() {
            if rx.recv().await.is_err() {
                break;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
