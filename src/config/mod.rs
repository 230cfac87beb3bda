//! Configuration module for Link-Ledger
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so the checker also runs without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use link_ledger::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("link-ledger.toml")).unwrap();
//! println!("Checking: {}", config.site.root_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AuthConfig, Config, CrawlerConfig, RequestMethod, SheetConfig, ShutdownConfig, SiteConfig,
    SummaryLayout,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_or_default, load_config_with_hash,
    DEFAULT_CONFIG_PATH,
};
