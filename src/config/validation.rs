use crate::config::types::{
    AuthConfig, Config, CrawlerConfig, SheetConfig, ShutdownConfig, SiteConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_sheet_config(&config.sheet)?;
    validate_auth_config(&config.auth)?;
    validate_shutdown_config(&config.shutdown)?;
    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url '{}': {}", config.root_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "root-url '{}' must use http or https",
            config.root_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url '{}' has no host",
            config.root_url
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.filter_level > 3 {
        return Err(ConfigError::Validation(format!(
            "filter-level must be between 0 and 3, got {}",
            config.filter_level
        )));
    }

    if config.max_sockets_per_host < 1 || config.max_sockets_per_host > 100 {
        return Err(ConfigError::Validation(format!(
            "max-sockets-per-host must be between 1 and 100, got {}",
            config.max_sockets_per_host
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_sheet_config(config: &SheetConfig) -> Result<(), ConfigError> {
    if config.spreadsheet_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "spreadsheet-id cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.api_base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid api-base-url '{}': {}", config.api_base_url, e))
    })?;

    validate_range(&config.exclusions_range)?;

    if config.write_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "write-retries must be <= 10, got {}",
            config.write_retries
        )));
    }

    Ok(())
}

/// A range must name its sheet: `Sheet!A1` or `Sheet!A1:B`
fn validate_range(range: &str) -> Result<(), ConfigError> {
    match range.split_once('!') {
        Some((sheet, cells)) if !sheet.is_empty() && !cells.is_empty() => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "range '{}' must look like 'Sheet!A1:B'",
            range
        ))),
    }
}

fn validate_auth_config(config: &AuthConfig) -> Result<(), ConfigError> {
    if config.client_secret_path.is_empty() {
        return Err(ConfigError::Validation(
            "client-secret-path cannot be empty".to_string(),
        ));
    }

    if config.token_file.is_empty() || config.token_file.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "token-file must be a plain file name, got '{}'",
            config.token_file
        )));
    }

    if config.scopes.is_empty() {
        return Err(ConfigError::Validation(
            "at least one OAuth scope is required".to_string(),
        ));
    }

    Ok(())
}

fn validate_shutdown_config(config: &ShutdownConfig) -> Result<(), ConfigError> {
    if config.poll_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "poll-interval-ms must be >= 10ms, got {}ms",
            config.poll_interval_ms
        )));
    }
    Ok(())
}
