//! Turns crawl events into spreadsheet rows

use crate::config::{Config, SummaryLayout};
use crate::crawler::{CrawlEvent, LinkResult, PageError};
use crate::report::classify::{classify, BrokenLinkRow, Disposition, SourceLabeler};
use crate::report::summary::{format_timestamp, PageRecord, RunSummary};
use crate::report::writes::WriteQueue;
use crate::sheets::{SheetStore, SheetWrite, WritePolicy, ERRORS_RANGE, PAGES_RANGE, SUMMARY_RANGE};
use chrono::{DateTime, Local};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Whether the event loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Finished,
}

/// Everything the reporter keeps between events
///
/// There is at most one live page record; it is replaced whenever a new page
/// starts.
pub struct ReportSession {
    summary: RunSummary,
    page: Option<PageRecord>,
    labeler: SourceLabeler,
    layout: SummaryLayout,
    writes: WriteQueue,
    wait_for_pending_writes: bool,
    poll_interval: Duration,
}

impl ReportSession {
    /// Creates a session for a run started at `started_at`
    pub fn new(
        config: &Config,
        store: Arc<dyn SheetStore>,
        policy: Arc<dyn WritePolicy>,
        started_at: DateTime<Local>,
    ) -> Self {
        Self {
            summary: RunSummary::new(started_at),
            page: None,
            labeler: SourceLabeler::new(&config.site.root_url, &config.site.label_prefix),
            layout: config.sheet.summary_layout,
            writes: WriteQueue::new(store, policy),
            wait_for_pending_writes: config.shutdown.wait_for_pending_writes,
            poll_interval: Duration::from_millis(config.shutdown.poll_interval_ms),
        }
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    pub fn current_page(&self) -> Option<&PageRecord> {
        self.page.as_ref()
    }

    /// Writes issued and not yet finished
    pub fn pending_writes(&self) -> usize {
        self.writes.pending()
    }

    /// Reacts to one crawl event
    ///
    /// Returns `Finished` after `End`, once shutdown is done.
    pub async fn handle(&mut self, event: CrawlEvent) -> Flow {
        match event {
            CrawlEvent::Robots { host } => {
                tracing::debug!("robots.txt loaded for {}", host);
            }
            CrawlEvent::Html { page_url } => self.begin_page(&page_url),
            CrawlEvent::Link(result) | CrawlEvent::Junk(result) => self.record_link(&result),
            CrawlEvent::Page {
                page_url,
                error,
                queued,
            } => self.complete_page(&page_url, error, queued),
            CrawlEvent::Site { site_url } => self.complete_site(&site_url),
            CrawlEvent::End => {
                self.finish().await;
                return Flow::Finished;
            }
        }
        Flow::Continue
    }

    /// Starts a fresh page record
    pub fn begin_page(&mut self, page_url: &str) {
        tracing::info!("{}", page_url);
        self.page = Some(PageRecord::new(page_url));
    }

    fn record_link(&mut self, result: &LinkResult) {
        let page = self
            .page
            .get_or_insert_with(|| PageRecord::new(result.base_url.clone()));
        let disposition = classify(result, &page.url, &self.labeler);
        let url = result.display_url();

        match &disposition {
            Disposition::Broken(row) => tracing::info!("-> ERROR   {} {}", url, row.reason),
            Disposition::Excluded(reason) => tracing::debug!("-> SKIPPED {} {}", url, reason),
            Disposition::Ok { cached: true } => tracing::debug!("-> CACHED  {}", url),
            Disposition::Ok { cached: false } => tracing::debug!("-> OK      {}", url),
        }

        self.summary.record_link_result(page, url, disposition);
    }

    /// Finishes a page: synthesizes a row for a failed fetch, then writes
    pub fn complete_page(&mut self, page_url: &str, error: Option<PageError>, queued: usize) {
        if let Some(error) = error {
            self.page = Some(PageRecord::new(page_url));
            if !error.is_non_error() {
                self.record_page_failure(page_url, &error);
            }
        }

        let page = self
            .page
            .take()
            .unwrap_or_else(|| PageRecord::new(page_url));

        self.summary.record_page_completion(&page);
        tracing::info!(" {}", page.status_line());
        tracing::info!(" {}", self.summary.progress_line(queued));

        let formula = self.labeler.formula(&page.url);
        let page_row = vec![
            Value::from(formula),
            Value::from(page.link_count),
            Value::from(page.link_ok),
            Value::from(page.link_broken),
            Value::from(page.link_excluded),
        ];

        if !page.broken_rows.is_empty() {
            let rows = page
                .broken_rows
                .into_iter()
                .map(BrokenLinkRow::into_cells)
                .collect();
            self.writes.submit(
                "save errors",
                SheetWrite::Append {
                    range: ERRORS_RANGE.to_string(),
                    rows,
                },
            );
        }

        self.writes.submit(
            "save page",
            SheetWrite::Append {
                range: PAGES_RANGE.to_string(),
                rows: vec![page_row],
            },
        );
    }

    /// The page itself is the broken link, reported as `HTTP_<code>`
    ///
    /// The row carries the failure message where a link row has its resolved URL.
    fn record_page_failure(&mut self, page_url: &str, error: &PageError) {
        let reason = error.reason();
        tracing::info!("-> ERROR   {} {} ({})", page_url, reason, error.message);

        let row = BrokenLinkRow {
            source_formula: self.labeler.formula(page_url),
            reason,
            resolved_url: Some(error.message.clone()),
            original_url: None,
        };
        let page = self.page.get_or_insert_with(|| PageRecord::new(page_url));
        self.summary
            .record_link_result(page, page_url, Disposition::Broken(row));
    }

    /// Stamps the finish time and writes the Summary row
    pub fn complete_site(&mut self, site_url: &str) {
        let finished_at = Local::now();
        self.summary.finished_at = Some(finished_at);

        tracing::info!("Broken Link Check Completed for {}", site_url);
        tracing::info!("Finished at: {}", format_timestamp(&finished_at));
        tracing::info!("Checked {} pages.", self.summary.pages_checked);

        self.writes.submit(
            "save summary",
            SheetWrite::Update {
                range: SUMMARY_RANGE.to_string(),
                rows: vec![self.summary.summary_row(self.layout)],
            },
        );
    }

    /// Waits for writes, or abandons them when not configured to wait
    pub async fn finish(&mut self) {
        if self.wait_for_pending_writes {
            self.writes.drain(self.poll_interval).await;
        } else {
            self.writes.abandon();
        }
    }
}
