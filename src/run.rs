//! Run orchestration
//!
//! A run authorizes, loads exclusions, resets the workbook, crawls the site
//! while reporting, and drains pending writes:
//!
//! `Idle → Authorizing → LoadingExclusions → ResettingStore → Crawling →
//! Draining → Terminated`, or `Failed` from any startup phase.

use crate::auth::{authorizer_from_config, StdinPrompt};
use crate::config::Config;
use crate::crawler::{start_crawl, CrawlEvent, CrawlOptions};
use crate::report::{format_timestamp, Flow, ReportSession, RunSummary};
use crate::sheets::{load_exclusions, policy_for, reset_workbook, SheetStore, SheetsClient};
use crate::LedgerError;
use chrono::{DateTime, Local};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Authorizing,
    LoadingExclusions,
    ResettingStore,
    Crawling,
    Draining,
    Terminated,
    Failed,
}

impl RunPhase {
    /// Whether `next` may follow this phase
    pub fn can_advance_to(self, next: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, next),
            (Idle, Authorizing)
                | (Idle, LoadingExclusions)
                | (Authorizing, LoadingExclusions)
                | (LoadingExclusions, ResettingStore)
                | (ResettingStore, Crawling)
                | (Crawling, Draining)
                | (Draining, Terminated)
                | (Authorizing, Failed)
                | (LoadingExclusions, Failed)
                | (ResettingStore, Failed)
                | (Crawling, Failed)
                | (Draining, Failed)
        )
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Authorizing => "authorizing",
            Self::LoadingExclusions => "loading exclusions",
            Self::ResettingStore => "resetting workbook",
            Self::Crawling => "crawling",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Drives one run from authorization to exit
pub struct Runner {
    config: Config,
    phase: RunPhase,
    started_at: DateTime<Local>,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: RunPhase::Idle,
            started_at: Local::now(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    fn enter(&mut self, next: RunPhase) {
        if !self.phase.can_advance_to(next) {
            tracing::warn!("Unexpected phase change: {} -> {}", self.phase, next);
        }
        tracing::debug!("Run phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Logs a startup failure and marks the run failed
    fn fail(&mut self, error: impl Into<LedgerError>) -> LedgerError {
        let error = error.into();
        tracing::error!("CRITICAL FAILURE while {}: {}", self.phase, error);
        self.enter(RunPhase::Failed);
        error
    }

    /// Runs against the configured spreadsheet, authorizing first
    pub async fn run(mut self) -> crate::Result<RunSummary> {
        self.enter(RunPhase::Authorizing);

        let http = match Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("link-ledger/", env!("CARGO_PKG_VERSION")))
            .build()
        {
            Ok(http) => http,
            Err(e) => return Err(self.fail(e)),
        };

        let authorizer = match authorizer_from_config(&self.config.auth, http.clone()) {
            Ok(authorizer) => authorizer,
            Err(e) => return Err(self.fail(e)),
        };
        if let Err(e) = authorizer.authorize(&StdinPrompt).await {
            return Err(self.fail(e));
        }

        let store = match SheetsClient::new(
            http,
            &self.config.sheet.api_base_url,
            self.config.sheet.spreadsheet_id.clone(),
            Arc::new(authorizer),
        ) {
            Ok(store) => store,
            Err(e) => return Err(self.fail(e)),
        };

        self.run_with_store(Arc::new(store)).await
    }

    /// Runs the startup sequence, crawl and drain against `store`
    ///
    /// Used directly for dry runs, where there is nothing to authorize.
    pub async fn run_with_store(&mut self, store: Arc<dyn SheetStore>) -> crate::Result<RunSummary> {
        self.enter(RunPhase::LoadingExclusions);
        let mut options = CrawlOptions::from_config(&self.config.crawler);
        if let Err(e) = load_exclusions(
            store.as_ref(),
            &self.config.sheet.exclusions_range,
            &mut options,
        )
        .await
        {
            return Err(self.fail(e));
        }

        self.enter(RunPhase::ResettingStore);
        let started = format_timestamp(&self.started_at);
        if let Err(e) = reset_workbook(store.as_ref(), &self.config.sheet, &started).await {
            return Err(self.fail(e));
        }

        self.enter(RunPhase::Crawling);
        tracing::info!("Starting link checker at: {}", self.config.site.root_url);
        let (mut events, driver) = match start_crawl(options, &self.config.site.root_url) {
            Ok(crawl) => crawl,
            Err(e) => return Err(self.fail(e)),
        };

        let policy = policy_for(
            self.config.sheet.write_retries,
            self.config.sheet.retry_backoff_ms,
        );
        let mut session = ReportSession::new(&self.config, store, policy, self.started_at);

        let mut ended = false;
        while let Some(event) = events.recv().await {
            if matches!(event, CrawlEvent::End) {
                self.enter(RunPhase::Draining);
            }
            if session.handle(event).await == Flow::Finished {
                ended = true;
                break;
            }
        }

        if !ended {
            tracing::warn!("Crawl stopped before its end event");
            self.enter(RunPhase::Draining);
            session.finish().await;
        }

        let outcome = match driver.await {
            Ok(result) => result,
            Err(e) => Err(LedgerError::Driver(e.to_string())),
        };
        if let Err(e) = outcome {
            tracing::error!("Crawl driver failed: {}", e);
            self.enter(RunPhase::Failed);
            return Err(e);
        }

        self.enter(RunPhase::Terminated);
        Ok(session.summary().clone())
    }
}
