//! Run and page counters

use crate::config::SummaryLayout;
use crate::report::classify::{BrokenLinkRow, Disposition};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::collections::HashSet;

/// Timestamp format written to the workbook (`2024-01-01T09:00:00+01:00`)
pub fn format_timestamp(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Counters of the page currently being reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: String,
    pub link_count: u64,
    pub link_ok: u64,
    pub link_broken: u64,
    pub link_excluded: u64,
    pub broken_rows: Vec<BrokenLinkRow>,
}

impl PageRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            link_count: 0,
            link_ok: 0,
            link_broken: 0,
            link_excluded: 0,
            broken_rows: Vec::new(),
        }
    }

    /// `Links: n | OK: n | Broken: n | Skipped: n`
    pub fn status_line(&self) -> String {
        format!(
            "Links: {} | OK: {} | Broken: {} | Skipped: {}",
            self.link_count, self.link_ok, self.link_broken, self.link_excluded
        )
    }
}

/// Totals of the whole run
///
/// `broken_links` and `skipped_links` hold distinct URLs, so a link broken
/// on ten pages counts ten times on the pages but once here.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pages_checked: u64,
    pub pages_with_errors: u64,
    pub links_total: u64,
    pub links_ok: u64,
    pub broken_links: HashSet<String>,
    pub skipped_links: HashSet<String>,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self {
            pages_checked: 0,
            pages_with_errors: 0,
            links_total: 0,
            links_ok: 0,
            broken_links: HashSet::new(),
            skipped_links: HashSet::new(),
            started_at,
            finished_at: None,
        }
    }

    /// Counts one link of `page`
    ///
    /// `link_count` always moves, plus exactly one of ok, broken (with its
    /// row) or excluded.
    pub fn record_link_result(&mut self, page: &mut PageRecord, url: &str, disposition: Disposition) {
        page.link_count += 1;
        match disposition {
            Disposition::Broken(row) => {
                page.link_broken += 1;
                page.broken_rows.push(row);
                self.broken_links.insert(url.to_string());
            }
            Disposition::Excluded(_) => {
                page.link_excluded += 1;
                self.skipped_links.insert(url.to_string());
            }
            Disposition::Ok { .. } => {
                page.link_ok += 1;
            }
        }
    }

    /// Folds a finished page into the run totals
    pub fn record_page_completion(&mut self, page: &PageRecord) {
        self.pages_checked += 1;
        if page.link_broken > 0 {
            self.pages_with_errors += 1;
        }
        self.links_total += page.link_count;
        self.links_ok += page.link_ok;
    }

    /// `Pages Completed: n of m`, where m counts the pages still queued
    pub fn progress_line(&self, queued: usize) -> String {
        format!(
            "Pages Completed: {} of {}",
            self.pages_checked,
            self.pages_checked + queued as u64
        )
    }

    pub fn started_at_string(&self) -> String {
        format_timestamp(&self.started_at)
    }

    /// The Summary row written when the site is done
    pub fn summary_row(&self, layout: SummaryLayout) -> Vec<Value> {
        let finished = self
            .finished_at
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_default();

        let mut row = vec![
            Value::from("Finished"),
            Value::from(self.started_at_string()),
            Value::from(finished),
        ];

        if layout == SummaryLayout::Cumulative {
            row.extend([
                Value::from(self.pages_checked),
                Value::from(self.pages_with_errors),
                Value::from(self.links_total),
                Value::from(self.links_ok),
                Value::from(self.broken_links.len() as u64),
                Value::from(self.skipped_links.len() as u64),
            ]);
        }

        row
    }
}
