//! Link-Ledger: a broken link checker that reports into a spreadsheet
//!
//! This crate crawls a single website, classifies every link it finds as ok,
//! broken or excluded, and records per-page results, broken-link rows and a
//! run summary in a Google Sheets workbook.

pub mod auth;
pub mod config;
pub mod crawler;
pub mod report;
pub mod robots;
pub mod run;
pub mod sheets;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Link-Ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authorization error: {0}")]
    Auth(#[from] auth::AuthError),

    #[error("Spreadsheet error: {0}")]
    Sheets(#[from] sheets::SheetsError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl driver stopped unexpectedly: {0}")]
    Driver(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Link-Ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEvent, CrawlOptions, SiteChecker};
pub use report::{ReportSession, RunSummary};
pub use run::{RunPhase, Runner};
