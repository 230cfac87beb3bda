//! Spreadsheet store trait and error types
//!
//! This module defines the trait interface for spreadsheet backends and
//! associated error types.

use crate::auth::AuthError;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during spreadsheet operations
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Authorization failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Unexpected response: {0}")]
    Response(String),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

/// Result type for spreadsheet operations
pub type SheetsResult<T> = Result<T, SheetsError>;

/// Trait for spreadsheet backends
///
/// One store talks to one spreadsheet. Ranges use A1 notation
/// (`Errors!A2:D2`). Implementations must be shareable between the
/// reporting task and the spawned write tasks.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Reads the values of a range, as displayed strings
    ///
    /// Trailing empty rows and cells are omitted, as the API does.
    async fn read_range(&self, range: &str) -> SheetsResult<Vec<Vec<String>>>;

    /// Overwrites a range with rows of values
    async fn update_range(&self, range: &str, rows: Vec<Vec<Value>>) -> SheetsResult<()>;

    /// Appends rows after the last row of the table found at `range`
    async fn append_rows(&self, range: &str, rows: Vec<Vec<Value>>) -> SheetsResult<()>;

    /// Applies a list of spreadsheet-level requests in one batch
    async fn batch_update(&self, requests: Vec<Value>) -> SheetsResult<()>;
}
