//! OAuth authorization for the Sheets API
//!
//! This module provides:
//! - Loading the OAuth client from `client_secret.json`
//! - The per-user token cache under `~/.credentials/`
//! - The installed-app consent flow and token refresh

mod authorizer;
mod credentials;
mod token;

pub use authorizer::{Authorizer, CodePrompt, StaticToken, StdinPrompt, TokenSource};
pub use credentials::ClientSecret;
pub use token::{home_dir, token_path, token_path_in, StoredToken};

use crate::config::AuthConfig;
use reqwest::Client;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while authorizing
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Error loading client secret file {0}: {1}")]
    ReadSecret(String, #[source] std::io::Error),

    #[error("Invalid client secret: {0}")]
    InvalidSecret(String),

    #[error("No home directory: set HOME, HOMEPATH or USERPROFILE")]
    NoHomeDirectory,

    #[error("Error while trying to retrieve access token: {0}")]
    TokenExchange(String),

    #[error("Not authorized yet")]
    NotAuthorized,

    #[error("Authorization prompt failed: {0}")]
    Prompt(String),

    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Token cache is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds an authorizer from configuration without running any flow
///
/// # Arguments
///
/// * `config` - The `[auth]` configuration section
/// * `http` - The HTTP client used for token requests
pub fn authorizer_from_config(config: &AuthConfig, http: Client) -> Result<Authorizer, AuthError> {
    let secret = ClientSecret::load(Path::new(&config.client_secret_path))?;
    let token_path = token_path(&config.token_file)?;
    Ok(Authorizer::new(http, secret, config.scopes.clone(), token_path))
}
