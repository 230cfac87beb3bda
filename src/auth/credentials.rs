//! OAuth client credentials (`client_secret.json`)

use crate::auth::AuthError;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The OAuth client an installed app authorizes as
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,

    #[serde(default)]
    pub redirect_uris: Vec<String>,

    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct SecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecret {
    /// Loads the credentials downloaded from the API console
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AuthError::ReadSecret(path.display().to_string(), e))?;
        Self::parse(&content)
    }

    /// Parses credentials, accepting an `installed` or a `web` client
    pub fn parse(content: &str) -> Result<Self, AuthError> {
        let file: SecretFile = serde_json::from_str(content)
            .map_err(|e| AuthError::InvalidSecret(e.to_string()))?;

        file.installed.or(file.web).ok_or_else(|| {
            AuthError::InvalidSecret("expected an \"installed\" or \"web\" client".to_string())
        })
    }

    /// The redirect URI the consent page sends the code to
    ///
    /// Installed apps use the out-of-band URI when none is listed.
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or("urn:ietf:wg:oauth:2.0:oob")
    }
}
