use async_trait::async_trait;
use link_ledger::auth::{AuthError, Authorizer, ClientSecret, CodePrompt, StoredToken, TokenSource};
use reqwest::Client;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers with a fixed code and counts how often it was asked
struct FixedCode {
    code: &'static str,
    asked: AtomicUsize,
}

impl FixedCode {
    fn new(code: &'static str) -> Self {
        Self {
            code,
            asked: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CodePrompt for FixedCode {
    async fn ask(&self, consent_url: &str) -> Result<String, AuthError> {
        assert!(consent_url.contains("access_type=offline"));
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.code.to_string())
    }
}

fn authorizer(server: &MockServer, token_path: PathBuf) -> Authorizer {
    let secret = ClientSecret::parse(
        &json!({
            "installed": {
                "client_id": "my-id",
                "client_secret": "shh",
                "token_uri": format!("{}/token", server.uri()),
                "redirect_uris": ["urn:ietf:wg:oauth:2.0:oob"]
            }
        })
        .to_string(),
    )
    .unwrap();
    Authorizer::new(
        Client::new(),
        secret,
        vec!["https://www.googleapis.com/auth/spreadsheets".to_string()],
        token_path,
    )
}

#[tokio::test]
async fn test_first_run_exchanges_code_and_caches_token() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join(".credentials").join("token.json");

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=4%2Fcode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.first",
            "refresh_token": "1/refresh",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = authorizer(&server, token_path.clone());
    let prompt = FixedCode::new("4/code");
    auth.authorize(&prompt).await.unwrap();

    assert_eq!(prompt.asked.load(Ordering::SeqCst), 1);
    assert_eq!(auth.bearer().await.unwrap(), "ya29.first");

    let stored = StoredToken::load(&token_path).unwrap().unwrap();
    assert_eq!(stored.access_token, "ya29.first");
    assert_eq!(stored.refresh_token.as_deref(), Some("1/refresh"));
    assert!(stored.expiry_date.is_some());
}

#[tokio::test]
async fn test_valid_cached_token_skips_consent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");

    StoredToken {
        access_token: "ya29.cached".to_string(),
        refresh_token: Some("1/refresh".to_string()),
        scope: None,
        token_type: Some("Bearer".to_string()),
        expiry_date: None,
    }
    .save(&token_path)
    .unwrap();

    let auth = authorizer(&server, token_path);
    let prompt = FixedCode::new("unused");
    auth.authorize(&prompt).await.unwrap();

    assert_eq!(prompt.asked.load(Ordering::SeqCst), 0);
    assert_eq!(auth.bearer().await.unwrap(), "ya29.cached");
}

#[tokio::test]
async fn test_expired_cached_token_is_refreshed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");

    StoredToken {
        access_token: "ya29.stale".to_string(),
        refresh_token: Some("1/refresh".to_string()),
        scope: None,
        token_type: Some("Bearer".to_string()),
        expiry_date: Some(1_000),
    }
    .save(&token_path)
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.fresh",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = authorizer(&server, token_path.clone());
    let prompt = FixedCode::new("unused");
    auth.authorize(&prompt).await.unwrap();

    assert_eq!(prompt.asked.load(Ordering::SeqCst), 0);
    assert_eq!(auth.bearer().await.unwrap(), "ya29.fresh");

    let stored = StoredToken::load(&token_path).unwrap().unwrap();
    assert_eq!(stored.access_token, "ya29.fresh");
    assert_eq!(stored.refresh_token.as_deref(), Some("1/refresh"));
}

#[tokio::test]
async fn test_rejected_code_fails_authorization() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let auth = authorizer(&server, token_path.clone());
    let result = auth.authorize(&FixedCode::new("bad")).await;

    assert!(matches!(result, Err(AuthError::TokenExchange(_))));
    assert!(!token_path.exists());
}
