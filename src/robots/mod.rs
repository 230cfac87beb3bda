//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! It is only consulted when the crawl is configured to honor robot exclusions.

mod cache;
mod parser;

pub use cache::CachedRobots;
pub use parser::ParsedRobots;

use reqwest::Client;
use url::Url;

/// Fetches robots.txt for the host of `url`
///
/// A missing file, a non-success status or a network failure all yield an
/// allow-all result; robots.txt can only narrow a crawl, never abort it.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - Any URL on the host whose robots.txt is wanted
pub async fn fetch_robots(client: &Client, url: &Url) -> ParsedRobots {
    let mut robots_url = url.clone();
    robots_url.set_path("/robots.txt");
    robots_url.set_query(None);
    robots_url.set_fragment(None);

    match client.get(robots_url.as_str()).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => ParsedRobots::from_content(&body),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", robots_url, e);
                ParsedRobots::allow_all()
            }
        },
        Ok(response) => {
            tracing::debug!("{} answered {}, allowing all", robots_url, response.status());
            ParsedRobots::allow_all()
        }
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}
