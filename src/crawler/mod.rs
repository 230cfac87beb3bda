//! Crawl driver for a single site
//!
//! This module contains the crawling logic, including:
//! - HTTP fetching of pages and link checks
//! - HTML parsing and link extraction by filter level
//! - Exclusion rules and the response cache
//! - Request scheduling and rate limiting
//!
//! Everything it learns is reported as [`CrawlEvent`]s over a channel.

mod cache;
mod events;
mod fetcher;
mod filter;
mod options;
mod parser;
mod scheduler;
mod site_checker;

pub use cache::ResponseCache;
pub use events::{CrawlEvent, ErrorCode, LinkResult, PageError};
pub use fetcher::{build_http_client, check_link, fetch_page, LinkCheck, PageFetch};
pub use filter::{LinkFilter, Screening};
pub use options::CrawlOptions;
pub use parser::{extract_links, ExtractedLink};
pub use scheduler::{Frontier, HostThrottle};
pub use site_checker::SiteChecker;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Starts crawling `root_url` in a background task
///
/// Returns the receiving end of the event stream and the driver's handle.
/// The stream always ends with `End` unless the driver fails.
///
/// # Arguments
///
/// * `options` - The crawl options, exclusions already merged
/// * `root_url` - The site root; only pages on its host are crawled
pub fn start_crawl(
    options: CrawlOptions,
    root_url: &str,
) -> crate::Result<(mpsc::Receiver<CrawlEvent>, JoinHandle<crate::Result<()>>)> {
    let client = build_http_client(&options)?;
    let mut checker = SiteChecker::new(options, client);
    checker.enqueue(root_url)?;

    let (tx, rx) = mpsc::channel(256);
    let handle = tokio::spawn(checker.run(tx));
    Ok((rx, handle))
}
