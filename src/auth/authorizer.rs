//! Installed-app OAuth authorization
//!
//! A cached token is used when present and refreshed when it expires.
//! Without one, the user visits a consent URL and pastes the code back.

use crate::auth::credentials::ClientSecret;
use crate::auth::token::{now_ms, StoredToken, TokenResponse};
use crate::auth::AuthError;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use url::Url;

/// Source of bearer tokens for API requests
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// A currently valid access token
    async fn bearer(&self) -> Result<String, AuthError>;
}

/// A fixed token
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}

/// Asks the user for the authorization code
#[async_trait]
pub trait CodePrompt: Send + Sync {
    async fn ask(&self, consent_url: &str) -> Result<String, AuthError>;
}

/// Prints the consent URL and reads the code from stdin
pub struct StdinPrompt;

#[async_trait]
impl CodePrompt for StdinPrompt {
    async fn ask(&self, consent_url: &str) -> Result<String, AuthError> {
        let mut stdout = tokio::io::stdout();
        let message = format!(
            "Authorize this app by visiting this url: {}\nEnter the code from that page here: ",
            consent_url
        );
        stdout.write_all(message.as_bytes()).await?;
        stdout.flush().await?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        let code = line.trim().to_string();
        if code.is_empty() {
            return Err(AuthError::Prompt("no authorization code entered".to_string()));
        }
        Ok(code)
    }
}

/// Holds the OAuth client and its token, refreshing it on demand
pub struct Authorizer {
    http: Client,
    secret: ClientSecret,
    scopes: Vec<String>,
    token_path: PathBuf,
    token: Mutex<Option<StoredToken>>,
}

impl Authorizer {
    pub fn new(http: Client, secret: ClientSecret, scopes: Vec<String>, token_path: PathBuf) -> Self {
        Self {
            http,
            secret,
            scopes,
            token_path,
            token: Mutex::new(None),
        }
    }

    /// Loads the cached token, or runs the consent flow through `prompt`
    ///
    /// An expired cached token is refreshed when it carries a refresh token.
    pub async fn authorize(&self, prompt: &dyn CodePrompt) -> Result<(), AuthError> {
        tracing::info!("Authorizing...");

        let cached = match StoredToken::load(&self.token_path) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable token cache {}: {}",
                    self.token_path.display(),
                    e
                );
                None
            }
        };

        let token = match cached {
            Some(token) if !token.is_expired(now_ms()) => token,
            Some(StoredToken {
                refresh_token: Some(refresh_token),
                ..
            }) => {
                tracing::debug!("Cached token expired, refreshing");
                self.refresh(&refresh_token).await?
            }
            _ => {
                let code = prompt.ask(self.consent_url()?.as_str()).await?;
                let token = self.exchange_code(&code).await?;
                token.save(&self.token_path)?;
                token
            }
        };

        *self.token.lock().await = Some(token);
        tracing::info!("Authorization: OK");
        Ok(())
    }

    /// The URL the user visits to grant access
    pub fn consent_url(&self) -> Result<Url, AuthError> {
        let mut url = Url::parse(&self.secret.auth_uri)
            .map_err(|e| AuthError::InvalidSecret(format!("auth_uri: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.secret.client_id)
            .append_pair("redirect_uri", self.secret.redirect_uri());
        Ok(url)
    }

    /// Exchanges an authorization code for a token
    pub async fn exchange_code(&self, code: &str) -> Result<StoredToken, AuthError> {
        let params = [
            ("code", code),
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("redirect_uri", self.secret.redirect_uri()),
            ("grant_type", "authorization_code"),
        ];
        self.request_token(&params).await
    }

    /// Refreshes the access token and rewrites the cache
    ///
    /// Google omits the refresh token from refresh responses; the old one is
    /// kept.
    pub async fn refresh(&self, refresh_token: &str) -> Result<StoredToken, AuthError> {
        let params = [
            ("refresh_token", refresh_token),
            ("client_id", self.secret.client_id.as_str()),
            ("client_secret", self.secret.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let mut token = self.request_token(&params).await?;
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        token.save(&self.token_path)?;
        Ok(token)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<StoredToken, AuthError> {
        let response = self
            .http
            .post(&self.secret.token_uri)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchange(format!("{}: {}", status, body)));
        }

        let body: TokenResponse = response.json().await?;
        Ok(StoredToken::from_response(body, now_ms()))
    }
}

#[async_trait]
impl TokenSource for Authorizer {
    async fn bearer(&self) -> Result<String, AuthError> {
        let mut guard = self.token.lock().await;
        let token = guard.as_ref().ok_or(AuthError::NotAuthorized)?;

        if token.is_expired(now_ms()) {
            if let Some(refresh_token) = token.refresh_token.clone() {
                let refreshed = self.refresh(&refresh_token).await?;
                let access_token = refreshed.access_token.clone();
                *guard = Some(refreshed);
                return Ok(access_token);
            }
            tracing::warn!("Access token expired and no refresh token is available");
        }

        Ok(token.access_token.clone())
    }
}
