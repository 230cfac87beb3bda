//! Options handed to the crawl driver

use crate::config::{CrawlerConfig, RequestMethod};
use crate::url::normalize_scheme;
use std::time::Duration;

/// Options read by the crawl driver for the whole crawl
///
/// Only the exclusion lists may change, and only before the crawl starts.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub cache_expiry: Duration,
    pub cache_responses: bool,
    pub excluded_keywords: Vec<String>,
    pub excluded_schemes: Vec<String>,
    pub exclude_external_links: bool,
    pub exclude_links_to_same_page: bool,
    pub filter_level: u8,
    pub honor_robot_exclusions: bool,
    pub rate_limit: Duration,
    pub max_sockets_per_host: usize,
    pub request_method: RequestMethod,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl CrawlOptions {
    /// Builds crawl options from the `[crawler]` configuration section
    pub fn from_config(config: &CrawlerConfig) -> Self {
        let mut options = Self {
            cache_expiry: Duration::from_millis(config.cache_expiry_ms),
            cache_responses: config.cache_responses,
            excluded_keywords: Vec::new(),
            excluded_schemes: Vec::new(),
            exclude_external_links: config.exclude_external_links,
            exclude_links_to_same_page: config.exclude_links_to_same_page,
            filter_level: config.filter_level,
            honor_robot_exclusions: config.honor_robot_exclusions,
            rate_limit: Duration::from_millis(config.rate_limit_ms),
            max_sockets_per_host: config.max_sockets_per_host.max(1),
            request_method: config.request_method,
            user_agent: config.user_agent.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            accept_invalid_certs: config.accept_invalid_certs,
        };
        options.add_exclusions(
            config.excluded_keywords.iter().cloned(),
            config.excluded_schemes.iter().cloned(),
        );
        options
    }

    /// Merges keyword and scheme exclusions, skipping blanks and duplicates
    pub fn add_exclusions(
        &mut self,
        keywords: impl IntoIterator<Item = String>,
        schemes: impl IntoIterator<Item = String>,
    ) {
        for keyword in keywords {
            let keyword = keyword.trim();
            if !keyword.is_empty() && !self.excluded_keywords.iter().any(|k| k == keyword) {
                self.excluded_keywords.push(keyword.to_string());
            }
        }
        for scheme in schemes {
            let scheme = scheme.trim();
            if !scheme.is_empty() && !self.excluded_schemes.iter().any(|s| s == scheme) {
                self.excluded_schemes.push(scheme.to_string());
            }
        }
    }

    /// Whether links with this scheme are excluded
    pub fn is_scheme_excluded(&self, scheme: &str) -> bool {
        let scheme = normalize_scheme(scheme);
        self.excluded_schemes
            .iter()
            .any(|excluded| normalize_scheme(excluded) == scheme)
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let options = CrawlOptions::default();
        assert_eq!(options.cache_expiry, Duration::from_secs(3 * 60 * 60));
        assert_eq!(options.filter_level, 3);
        assert_eq!(options.rate_limit, Duration::from_millis(10));
        assert_eq!(options.max_sockets_per_host, 1);
        assert!(options.excluded_keywords.is_empty());
    }

    #[test]
    fn test_add_exclusions_skips_blank_and_duplicates() {
        let mut options = CrawlOptions::default();
        options.add_exclusions(
            vec!["foo".to_string(), "  ".to_string(), "foo".to_string()],
            vec!["mailto:".to_string(), String::new()],
        );
        assert_eq!(options.excluded_keywords, vec!["foo".to_string()]);
        assert_eq!(options.excluded_schemes, vec!["mailto:".to_string()]);
    }

    #[test]
    fn test_scheme_exclusion_ignores_colon_and_case() {
        let mut options = CrawlOptions::default();
        options.add_exclusions(Vec::new(), vec!["Mailto:".to_string()]);
        assert!(options.is_scheme_excluded("mailto"));
        assert!(!options.is_scheme_excluded("tel"));
    }

    #[test]
    fn test_config_exclusions_are_merged() {
        let mut config = CrawlerConfig::default();
        config.excluded_keywords = vec![" logout ".to_string()];
        let options = CrawlOptions::from_config(&config);
        assert_eq!(options.excluded_keywords, vec!["logout".to_string()]);
    }
}
