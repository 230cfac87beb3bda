//! Response cache for link checks

use crate::crawler::fetcher::LinkCheck;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CachedCheck {
    check: LinkCheck,
    stored_at: Instant,
}

/// Link check outcomes keyed by crawl key, each valid for `ttl`
#[derive(Debug)]
pub struct ResponseCache {
    entries: HashMap<String, CachedCheck>,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            enabled,
        }
    }

    /// Returns a fresh cached outcome, dropping it if it has expired
    pub fn get(&mut self, key: &str, now: Instant) -> Option<LinkCheck> {
        if !self.enabled {
            return None;
        }

        let fresh = self
            .entries
            .get(key)
            .map(|entry| now.saturating_duration_since(entry.stored_at) < self.ttl)?;

        if fresh {
            self.entries.get(key).map(|entry| entry.check.clone())
        } else {
            self.entries.remove(key);
            None
        }
    }

    pub fn insert(&mut self, key: String, check: LinkCheck, now: Instant) {
        if self.enabled {
            self.entries.insert(
                key,
                CachedCheck {
                    check,
                    stored_at: now,
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
