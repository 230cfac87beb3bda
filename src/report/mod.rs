//! Reporting pipeline
//!
//! This module handles:
//! - Counting links and pages for the run summary
//! - Classifying link results and building Errors rows
//! - Issuing fire-and-forget writes and draining them at shutdown

mod classify;
mod session;
mod summary;
mod writes;

pub use classify::{classify, hyperlink_formula, BrokenLinkRow, Disposition, SourceLabeler};
pub use session::{Flow, ReportSession};
pub use summary::{format_timestamp, PageRecord, RunSummary};
pub use writes::WriteQueue;
