use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Config file looked up when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "link-ledger.toml";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration, falling back to built-in defaults
///
/// The fallback only applies when `explicit` is false and the file does not
/// exist; a path given on the command line must be readable.
///
/// # Returns
///
/// * `Ok((Config, Option<String>))` - The configuration and, when read from
///   a file, the hash of that file
pub fn load_config_or_default(
    path: &Path,
    explicit: bool,
) -> Result<(Config, Option<String>), ConfigError> {
    if !explicit && !path.exists() {
        let config = Config::default();
        validate(&config)?;
        return Ok((config, None));
    }

    let (config, hash) = load_config_with_hash(path)?;
    Ok((config, Some(hash)))
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a run can be matched to the exact configuration it used.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
