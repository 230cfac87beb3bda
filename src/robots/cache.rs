//! Per-host robots.txt cache entries

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};

/// robots.txt data fetched for one host, with its fetch time
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub content: ParsedRobots,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Wraps freshly fetched robots.txt data
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
        }
    }

    /// Long crawls refetch robots.txt once a day
    pub fn is_stale(&self) -> bool {
        Utc::now() - self.fetched_at > Duration::hours(24)
    }
}
