use link_ledger::auth::StaticToken;
use link_ledger::config::SheetConfig;
use link_ledger::crawler::CrawlOptions;
use link_ledger::sheets::{
    load_exclusions, reset_workbook, SheetStore, SheetsClient, SheetsError, ERRORS_RANGE,
};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SheetsClient {
    SheetsClient::new(
        Client::new(),
        &server.uri(),
        "sheet-id",
        Arc::new(StaticToken("test-token".to_string())),
    )
    .unwrap()
}

#[tokio::test]
async fn test_exclusions_are_read_from_the_sheet() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-id/values/ExcludeKeywords!A2:B"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "ExcludeKeywords!A2:B100",
            "majorDimension": "ROWS",
            "values": [["staging", ""], ["", "mailto:"], ["archive"]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = client(&server);
    let mut options = CrawlOptions::default();
    let exclusions = load_exclusions(&store, "ExcludeKeywords!A2:B", &mut options)
        .await
        .unwrap();

    assert_eq!(exclusions.keywords, vec!["staging", "archive"]);
    assert_eq!(exclusions.schemes, vec!["mailto:"]);
    assert!(options.is_scheme_excluded("mailto"));
}

#[tokio::test]
async fn test_append_posts_rows_as_user_entered() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet-id/values/Errors!A2:D2:append"))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({
            "range": "Errors!A2:D2",
            "majorDimension": "ROWS",
            "values": [["=hyperlink(\"a\", \"b\")", "HTTP_404", "https://x/", "/x"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .append_rows(
            ERRORS_RANGE,
            vec![vec![
                json!("=hyperlink(\"a\", \"b\")"),
                json!("HTTP_404"),
                json!("https://x/"),
                json!("/x"),
            ]],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_update_puts_summary_row() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v4/spreadsheets/sheet-id/values/Summary!A4"))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .update_range("Summary!A4", vec![vec![json!("Finished"), json!(3)]])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reset_sends_one_batch_update() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet-id:batchUpdate"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"replies": []})))
        .expect(1)
        .mount(&server)
        .await;

    reset_workbook(
        &client(&server),
        &SheetConfig::default(),
        "2024-01-01T09:00:00+00:00",
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_api_error_carries_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-id/values/ExcludeKeywords!A2:B"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .read_range("ExcludeKeywords!A2:B")
        .await
        .unwrap_err();

    match err {
        SheetsError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "The caller does not have permission");
        }
        other => panic!("unexpected error: {}", other),
    }
}
