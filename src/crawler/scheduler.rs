//! Scheduler for the crawl frontier and per-host rate limiting
//!
//! This module handles:
//! - The FIFO queue of pages waiting to be crawled
//! - De-duplication of pages by crawl key
//! - Minimum spacing between request starts to one host
//! - Integrating robots.txt crawl delays

use crate::robots::{CachedRobots, ParsedRobots};
use crate::state::HostState;
use crate::url::crawl_key;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

/// Queue of pages to crawl, each page admitted at most once
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Url>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page unless it was already queued or crawled
    ///
    /// The fragment is stripped before queueing. Returns whether the page was
    /// new.
    pub fn push(&mut self, url: &Url) -> bool {
        let key = crawl_key(url);
        if !self.seen.insert(key) {
            return false;
        }
        let mut page = url.clone();
        page.set_fragment(None);
        self.queue.push_back(page);
        true
    }

    pub fn pop(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    /// Number of pages still waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct pages ever admitted
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// Spaces out request starts per host
///
/// Shared by the concurrent link checks of one page, hence the mutex.
#[derive(Debug)]
pub struct HostThrottle {
    hosts: Mutex<HashMap<String, HostState>>,
    rate_limit: Duration,
}

impl HostThrottle {
    pub fn new(rate_limit: Duration) -> Self {
        Self {
            hosts: Mutex::new(HashMap::new()),
            rate_limit,
        }
    }

    /// Waits until a request to `host` may start, then records it
    ///
    /// # Arguments
    ///
    /// * `host` - Host key of the URL about to be requested
    /// * `crawl_delay` - robots.txt delay for the host, if honored
    pub async fn acquire(&self, host: &str, crawl_delay: Option<Duration>) {
        let spacing = effective_delay(self.rate_limit, crawl_delay);

        loop {
            let wait = {
                let mut hosts = self.hosts.lock().await;
                let state = hosts.entry(host.to_string()).or_insert_with(HostState::new);
                let now = Instant::now();
                match state.time_until_next_request(spacing, now) {
                    None => {
                        state.record_request(now);
                        return;
                    }
                    Some(wait) => wait,
                }
            };

            tracing::trace!("Waiting {:?} before next request to {}", wait, host);
            tokio::time::sleep(wait).await;
        }
    }

    /// Whether robots.txt for `host` is missing or stale
    pub async fn needs_robots(&self, host: &str) -> bool {
        self.hosts
            .lock()
            .await
            .get(host)
            .map_or(true, HostState::needs_robots)
    }

    pub async fn store_robots(&self, host: &str, robots: ParsedRobots) {
        let mut hosts = self.hosts.lock().await;
        let state = hosts.entry(host.to_string()).or_insert_with(HostState::new);
        state.robots = Some(CachedRobots::new(robots));
    }

    /// robots.txt stored for `host`, if any
    pub async fn robots(&self, host: &str) -> Option<ParsedRobots> {
        self.hosts
            .lock()
            .await
            .get(host)
            .and_then(|state| state.robots.as_ref())
            .map(|cached| cached.content.clone())
    }

    /// Number of requests started to `host` so far
    pub async fn request_count(&self, host: &str) -> u32 {
        self.hosts
            .lock()
            .await
            .get(host)
            .map_or(0, |state| state.request_count)
    }
}

/// The spacing to keep: the larger of the rate limit and the crawl delay
pub fn effective_delay(rate_limit: Duration, crawl_delay: Option<Duration>) -> Duration {
    crawl_delay.map_or(rate_limit, |delay| rate_limit.max(delay))
}

/// Longest robots.txt crawl delay honored between requests to one host
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// Converts a robots.txt `Crawl-delay` in seconds, capped at `MAX_CRAWL_DELAY`
///
/// Zero, negative and non-finite values mean no delay.
pub fn crawl_delay_duration(seconds: f64) -> Option<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return None;
    }
    let delay = Duration::try_from_secs_f64(seconds).unwrap_or(MAX_CRAWL_DELAY);
    Some(delay.min(MAX_CRAWL_DELAY))
}

/// Host key used for per-host state (`host[:port]`)
pub fn host_key(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host.to_lowercase(), port),
        (Some(host), None) => host.to_lowercase(),
        (None, _) => String::new(),
    }
}
