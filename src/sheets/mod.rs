//! Spreadsheet access
//!
//! This module provides the [`SheetStore`] seam and its two backends
//! (the Sheets v4 REST client and an in-memory store), plus the workbook
//! operations run at startup: reading exclusions and resetting the tables.

mod client;
mod exclusions;
mod memory;
mod policy;
mod reset;
mod traits;

pub use client::SheetsClient;
pub use exclusions::{load_exclusions, parse_exclusion_rows, Exclusions};
pub use memory::{MemorySheetStore, RecordedWrite};
pub use policy::{policy_for, RetryWithBackoff, SheetWrite, SingleAttempt, WritePolicy};
pub use reset::{build_reset_requests, reset_workbook};
pub use traits::{SheetStore, SheetsError, SheetsResult};

/// Range broken-link rows are appended to
pub const ERRORS_RANGE: &str = "Errors!A2:D2";

/// Range page rows are appended to
pub const PAGES_RANGE: &str = "Pages!A2:E2";

/// Cell the final summary row is written at
pub const SUMMARY_RANGE: &str = "Summary!A4";
