//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests of the crawl driver:
//! - Building the HTTP client with the configured user agent
//! - Fetching pages whose links will be extracted
//! - Checking single links with HEAD or GET
//! - Classifying transport errors into errno-like kinds

use crate::config::RequestMethod;
use crate::crawler::events::PageError;
use crate::crawler::options::CrawlOptions;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// Result of fetching a page
#[derive(Debug)]
pub enum PageFetch {
    /// An HTML page was fetched
    Html {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
    },

    /// The page could not be processed
    Failed(PageError),
}

/// Result of checking a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCheck {
    /// HTTP status, absent on transport failure
    pub status: Option<u16>,

    /// `HTTP_<n>` or `ERRNO_<kind>` when the link is broken
    pub broken_reason: Option<String>,
}

impl LinkCheck {
    pub fn is_broken(&self) -> bool {
        self.broken_reason.is_some()
    }

    fn from_status(status: StatusCode) -> Self {
        let broken_reason = if status.is_client_error() || status.is_server_error() {
            Some(format!("HTTP_{}", status.as_u16()))
        } else {
            None
        };
        Self {
            status: Some(status.as_u16()),
            broken_reason,
        }
    }

    fn from_error(error: &reqwest::Error) -> Self {
        Self {
            status: None,
            broken_reason: Some(format!("ERRNO_{}", error_kind(error))),
        }
    }
}

/// Builds an HTTP client with the crawl options
///
/// # Example
///
/// ```
/// use link_ledger::crawler::{build_http_client, CrawlOptions};
///
/// let client = build_http_client(&CrawlOptions::default()).unwrap();
/// ```
pub fn build_http_client(options: &CrawlOptions) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(options.user_agent.as_str())
        .timeout(options.request_timeout)
        .connect_timeout(Duration::from_secs(10).min(options.request_timeout))
        .redirect(Policy::limited(10))
        .danger_accept_invalid_certs(options.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page for link extraction
///
/// | Outcome | Result |
/// |---------|--------|
/// | 2xx with an HTML content type | `Html` |
/// | 2xx with another content type | `Failed`, code 200 |
/// | Any other status | `Failed`, that status |
/// | Transport failure | `Failed`, errno kind |
pub async fn fetch_page(client: &Client, url: &str) -> PageFetch {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return PageFetch::Failed(PageError::errno(error_kind(&e), e.to_string())),
    };

    let status = response.status();
    if !status.is_success() {
        let message = status
            .canonical_reason()
            .unwrap_or("Unexpected status")
            .to_string();
        return PageFetch::Failed(PageError::status(status.as_u16(), message));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return PageFetch::Failed(PageError::status(
            200,
            format!("Expected type \"text/html\" but got \"{}\"", content_type),
        ));
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => PageFetch::Html { final_url, body },
        Err(e) => PageFetch::Failed(PageError::errno(error_kind(&e), e.to_string())),
    }
}

/// Checks whether a link answers successfully
///
/// A HEAD answered with 405 is retried once with GET, since some servers do
/// not implement HEAD.
pub async fn check_link(client: &Client, url: &str, method: RequestMethod) -> LinkCheck {
    if method == RequestMethod::Head {
        match client.head(url).send().await {
            Ok(response) if response.status() == StatusCode::METHOD_NOT_ALLOWED => {
                tracing::trace!("HEAD not allowed for {}, retrying with GET", url);
            }
            Ok(response) => return LinkCheck::from_status(response.status()),
            Err(e) => return LinkCheck::from_error(&e),
        }
    }

    match client.get(url).send().await {
        Ok(response) => LinkCheck::from_status(response.status()),
        Err(e) => LinkCheck::from_error(&e),
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Maps a transport error to an errno-like kind
pub fn error_kind(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "ETIMEDOUT"
    } else if error.is_connect() {
        "ECONNREFUSED"
    } else if error.is_redirect() {
        "EREDIRECT"
    } else {
        "EUNKNOWN"
    }
}
