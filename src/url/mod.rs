//! URL handling module for Link-Ledger
//!
//! This module provides URL parsing, crawl keys, host comparison and
//! keyword matching used by the crawl driver's exclusion rules.

mod matcher;
mod normalize;

pub use matcher::matches_keyword;
pub use normalize::{
    crawl_key, is_http_scheme, is_same_page, normalize_scheme, parse_http_url, same_host,
};

/// Strips the site root from a page URL to build a short label
///
/// Only the first occurrence is replaced; a page outside the root keeps its
/// full URL behind the prefix.
///
/// # Examples
///
/// ```
/// use link_ledger::url::page_label;
///
/// let label = page_label(
///     "https://web-central.appspot.com/web/a",
///     "https://web-central.appspot.com/web/",
///     "/web/",
/// );
/// assert_eq!(label, "/web/a");
/// ```
pub fn page_label(page_url: &str, site_root: &str, label_prefix: &str) -> String {
    let relative = if site_root.is_empty() {
        page_url.to_string()
    } else {
        page_url.replacen(site_root, "", 1)
    };
    format!("{}{}", label_prefix, relative)
}
