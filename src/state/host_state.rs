use crate::robots::CachedRobots;
use std::time::{Duration, Instant};

/// Tracks the state of a host during crawling
///
/// This structure maintains per-host information needed for rate limiting
/// and robots.txt caching.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// Number of requests made to this host in the current crawl
    pub request_count: u32,

    /// Timestamp of the last request start to this host
    pub last_request_time: Option<Instant>,

    /// robots.txt fetched for this host, if robots are honored
    pub robots: Option<CachedRobots>,
}

impl HostState {
    /// Creates a new HostState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a request can be started now given the minimum spacing
    pub fn can_request(&self, min_spacing: Duration, now: Instant) -> bool {
        self.time_until_next_request(min_spacing, now).is_none()
    }

    /// Records that a request was started to this host
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be started
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, min_spacing: Duration, now: Instant) -> Option<Duration> {
        let last = self.last_request_time?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < min_spacing {
            Some(min_spacing - elapsed)
        } else {
            None
        }
    }

    /// Whether robots.txt must be (re)fetched for this host
    pub fn needs_robots(&self) -> bool {
        self.robots.as_ref().map_or(true, CachedRobots::is_stale)
    }
}
