//! How a single row write is carried out

use crate::sheets::traits::{SheetStore, SheetsResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A value write against one range
#[derive(Debug, Clone, PartialEq)]
pub enum SheetWrite {
    Append { range: String, rows: Vec<Vec<Value>> },
    Update { range: String, rows: Vec<Vec<Value>> },
}

impl SheetWrite {
    pub fn range(&self) -> &str {
        match self {
            Self::Append { range, .. } | Self::Update { range, .. } => range,
        }
    }

    async fn apply(&self, store: &dyn SheetStore) -> SheetsResult<()> {
        match self {
            Self::Append { range, rows } => store.append_rows(range, rows.clone()).await,
            Self::Update { range, rows } => store.update_range(range, rows.clone()).await,
        }
    }
}

/// Decides how hard to try before a write is given up
#[async_trait]
pub trait WritePolicy: Send + Sync {
    async fn execute(&self, store: &dyn SheetStore, write: &SheetWrite) -> SheetsResult<()>;
}

/// One attempt; a failure is returned to the caller, which logs and drops it
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleAttempt;

#[async_trait]
impl WritePolicy for SingleAttempt {
    async fn execute(&self, store: &dyn SheetStore, write: &SheetWrite) -> SheetsResult<()> {
        write.apply(store).await
    }
}

/// Retries a failed write with exponential backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryWithBackoff {
    pub retries: u32,
    pub initial_backoff: Duration,
}

#[async_trait]
impl WritePolicy for RetryWithBackoff {
    async fn execute(&self, store: &dyn SheetStore, write: &SheetWrite) -> SheetsResult<()> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;
        loop {
            match write.apply(store).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Write to {} failed ({}), retry {} of {} in {:?}",
                        write.range(),
                        e,
                        attempt,
                        self.retries,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// The policy configured by `write-retries` and `retry-backoff-ms`
pub fn policy_for(retries: u32, backoff_ms: u64) -> Arc<dyn WritePolicy> {
    if retries == 0 {
        Arc::new(SingleAttempt)
    } else {
        Arc::new(RetryWithBackoff {
            retries,
            initial_backoff: Duration::from_millis(backoff_ms),
        })
    }
}
