//! Fire-and-forget spreadsheet writes

use crate::sheets::{SheetStore, SheetWrite, WritePolicy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};

/// Writes spawned in the background while the crawl goes on
///
/// `pending` counts writes issued but not yet finished: it goes up before a
/// write is spawned and down when it completes, whether it succeeded or not.
/// The join set is what shutdown actually waits on.
pub struct WriteQueue {
    store: Arc<dyn SheetStore>,
    policy: Arc<dyn WritePolicy>,
    tasks: JoinSet<()>,
    pending: Arc<AtomicUsize>,
}

impl WriteQueue {
    pub fn new(store: Arc<dyn SheetStore>, policy: Arc<dyn WritePolicy>) -> Self {
        Self {
            store,
            policy,
            tasks: JoinSet::new(),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Issues a write without waiting for it
    ///
    /// A failure is logged with `tag` and otherwise dropped.
    pub fn submit(&mut self, tag: &'static str, write: SheetWrite) {
        while let Some(joined) = self.tasks.try_join_next() {
            reap(&self.pending, joined);
        }

        let store = Arc::clone(&self.store);
        let policy = Arc::clone(&self.policy);
        let pending = Arc::clone(&self.pending);

        pending.fetch_add(1, Ordering::SeqCst);
        self.tasks.spawn(async move {
            if let Err(e) = policy.execute(store.as_ref(), &write).await {
                tracing::error!("{} FAILED: {}", tag, e);
            }
            pending.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Writes issued and not yet finished
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Waits until every issued write has finished
    ///
    /// Logs the pending count once per `poll_interval`. There is no upper
    /// bound: a write that never returns keeps the run alive.
    pub async fn drain(&mut self, poll_interval: Duration) {
        loop {
            let pending = self.pending();
            tracing::info!("Sheet operations in progress {}", pending);
            if pending == 0 && self.tasks.is_empty() {
                return;
            }

            let deadline = tokio::time::sleep(poll_interval);
            tokio::pin!(deadline);
            loop {
                tokio::select! {
                    joined = self.tasks.join_next() => match joined {
                        Some(joined) => reap(&self.pending, joined),
                        None => break,
                    },
                    _ = &mut deadline => break,
                }
            }
        }
    }

    /// Stops waiting; every write still in flight is lost
    ///
    /// Returns how many writes were abandoned.
    pub fn abandon(&mut self) -> usize {
        let lost = self.pending();
        if lost > 0 {
            tracing::warn!("Exiting with {} sheet operations still in progress", lost);
        }
        self.tasks.abort_all();
        lost
    }
}

fn reap(pending: &AtomicUsize, joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            tracing::error!("Sheet write task panicked: {}", e);
            // The task never decremented the counter
            pending.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
