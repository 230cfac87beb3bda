//! Cached OAuth token and where it lives on disk

use crate::auth::AuthError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tokens within this margin of expiry are treated as expired
const EXPIRY_MARGIN_MS: i64 = 60_000;

/// Directory under the home directory holding cached tokens
const TOKEN_DIR: &str = ".credentials";

/// An OAuth token as cached between runs
///
/// `expiry_date` is in milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}

/// Body of a token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl StoredToken {
    /// Builds a token from an endpoint response received at `now_ms`
    pub(crate) fn from_response(response: TokenResponse, now_ms: i64) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            scope: response.scope,
            token_type: response.token_type,
            expiry_date: response.expires_in.map(|secs| now_ms + secs * 1000),
        }
    }

    /// A token without an expiry date never expires
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expiry_date
            .map_or(false, |expiry| expiry <= now_ms + EXPIRY_MARGIN_MS)
    }

    /// Reads a cached token; a missing file is `Ok(None)`
    pub fn load(path: &Path) -> Result<Option<Self>, AuthError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::Io(e)),
        };
        let token = serde_json::from_str(&content)?;
        Ok(Some(token))
    }

    /// Writes the token, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<(), AuthError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string(self)?)?;
        tracing::info!("Token stored to {}", path.display());
        Ok(())
    }
}

/// The first non-empty of `HOME`, `HOMEPATH` and `USERPROFILE`
pub fn home_dir() -> Option<PathBuf> {
    ["HOME", "HOMEPATH", "USERPROFILE"]
        .iter()
        .filter_map(|name| std::env::var_os(name))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// `<home>/.credentials/<file_name>`
pub fn token_path_in(home: &Path, file_name: &str) -> PathBuf {
    home.join(TOKEN_DIR).join(file_name)
}

/// Where the token cache lives for this user
pub fn token_path(file_name: &str) -> Result<PathBuf, AuthError> {
    let home = home_dir().ok_or(AuthError::NoHomeDirectory)?;
    Ok(token_path_in(&home, file_name))
}

/// Current time in milliseconds since the Unix epoch
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
