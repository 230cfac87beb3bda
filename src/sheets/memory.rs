//! In-memory spreadsheet store, used by dry runs and tests

use crate::sheets::traits::{SheetStore, SheetsError, SheetsResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One write received by the store
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedWrite {
    Update { range: String, rows: Vec<Vec<Value>> },
    Append { range: String, rows: Vec<Vec<Value>> },
    Batch { requests: Vec<Value> },
}

#[derive(Debug, Default)]
struct MemoryState {
    ranges: HashMap<String, Vec<Vec<String>>>,
    writes: Vec<RecordedWrite>,
    failing_reads: bool,
    failing_writes: bool,
}

/// Records every write instead of sending it anywhere
///
/// Reads are answered from ranges seeded with [`MemorySheetStore::seed_range`].
#[derive(Debug, Default)]
pub struct MemorySheetStore {
    state: Mutex<MemoryState>,
    write_delay: Option<Duration>,
}

impl MemorySheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every write, to observe writes still in flight
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    pub fn seed_range(&self, range: &str, rows: Vec<Vec<String>>) {
        self.lock().ranges.insert(range.to_string(), rows);
    }

    /// Makes subsequent reads fail
    pub fn fail_reads(&self, fail: bool) {
        self.lock().failing_reads = fail;
    }

    /// Makes subsequent writes fail
    pub fn fail_writes(&self, fail: bool) {
        self.lock().failing_writes = fail;
    }

    /// Every write received so far, in arrival order
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.lock().writes.clone()
    }

    /// All rows appended to a range, in arrival order
    pub fn appended(&self, range: &str) -> Vec<Vec<Value>> {
        self.lock()
            .writes
            .iter()
            .filter_map(|write| match write {
                RecordedWrite::Append { range: r, rows } if r == range => Some(rows.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Number of append calls made to a range
    pub fn append_calls(&self, range: &str) -> usize {
        self.lock()
            .writes
            .iter()
            .filter(|write| matches!(write, RecordedWrite::Append { range: r, .. } if r == range))
            .count()
    }

    /// The rows of the last update to a range
    pub fn last_update(&self, range: &str) -> Option<Vec<Vec<Value>>> {
        self.lock().writes.iter().rev().find_map(|write| match write {
            RecordedWrite::Update { range: r, rows } if r == range => Some(rows.clone()),
            _ => None,
        })
    }

    /// The request lists of every batch update
    pub fn batches(&self) -> Vec<Vec<Value>> {
        self.lock()
            .writes
            .iter()
            .filter_map(|write| match write {
                RecordedWrite::Batch { requests } => Some(requests.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn record(&self, write: RecordedWrite) -> SheetsResult<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        if state.failing_writes {
            return Err(SheetsError::Rejected("writes are failing".to_string()));
        }
        state.writes.push(write);
        Ok(())
    }
}

#[async_trait]
impl SheetStore for MemorySheetStore {
    async fn read_range(&self, range: &str) -> SheetsResult<Vec<Vec<String>>> {
        let state = self.lock();
        if state.failing_reads {
            return Err(SheetsError::Api {
                status: 503,
                message: "reads are failing".to_string(),
            });
        }
        Ok(state.ranges.get(range).cloned().unwrap_or_default())
    }

    async fn update_range(&self, range: &str, rows: Vec<Vec<Value>>) -> SheetsResult<()> {
        self.record(RecordedWrite::Update {
            range: range.to_string(),
            rows,
        })
        .await
    }

    async fn append_rows(&self, range: &str, rows: Vec<Vec<Value>>) -> SheetsResult<()> {
        self.record(RecordedWrite::Append {
            range: range.to_string(),
            rows,
        })
        .await
    }

    async fn batch_update(&self, requests: Vec<Value>) -> SheetsResult<()> {
        self.record(RecordedWrite::Batch { requests }).await
    }
}
