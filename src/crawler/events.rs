//! Lifecycle events emitted by the crawl driver
//!
//! For every page the driver emits `Html`, then one `Link` or `Junk` per
//! extracted link, then `Page`. Events of two pages never interleave.

use std::fmt;

/// Outcome of checking one link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResult {
    /// The page the link was found on
    pub base_url: String,

    /// The link exactly as written in the HTML
    pub original_url: String,

    /// The absolute URL, absent when the link could not be resolved
    pub resolved_url: Option<String>,

    /// Tag the link came from (`a`, `img`, ...)
    pub tag: &'static str,

    pub broken: bool,
    pub broken_reason: Option<String>,

    pub excluded: bool,
    pub excluded_reason: Option<String>,

    /// Whether the outcome came from the response cache
    pub cached: bool,
}

impl LinkResult {
    /// The URL shown for this link: resolved, or the original when unresolvable
    pub fn display_url(&self) -> &str {
        self.resolved_url.as_deref().unwrap_or(&self.original_url)
    }
}

/// Code carried by a failed page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    /// The server answered with this HTTP status
    Status(u16),
    /// The request failed below HTTP (`ECONNREFUSED`, `ETIMEDOUT`, ...)
    Errno(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "{}", status),
            Self::Errno(kind) => f.write_str(kind),
        }
    }
}

/// Why a page could not be processed
///
/// The driver reports a 2xx page that is not HTML as `Status(200)`: the page
/// exists, it just has no links to check. Consumers must not count that as a
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageError {
    pub code: ErrorCode,
    pub message: String,
}

impl PageError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Status(status),
            message: message.into(),
        }
    }

    pub fn errno(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Errno(kind.into()),
            message: message.into(),
        }
    }

    /// True for the "not HTML" signal, which is not a real failure
    pub fn is_non_error(&self) -> bool {
        self.code == ErrorCode::Status(200)
    }

    /// Reason string recorded for the page, e.g. `HTTP_500`
    pub fn reason(&self) -> String {
        format!("HTTP_{}", self.code)
    }
}

/// Events emitted by the crawl driver
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// robots.txt was loaded for a host
    Robots { host: String },

    /// An HTML page was fetched and its links are about to be reported
    Html { page_url: String },

    /// A link was checked
    Link(LinkResult),

    /// A link was excluded without being checked
    Junk(LinkResult),

    /// A page is finished; `queued` pages are still waiting
    Page {
        page_url: String,
        error: Option<PageError>,
        queued: usize,
    },

    /// Every page of the site has been processed
    Site { site_url: String },

    /// The driver has no more work
    End,
}
