use crate::html;
use link_ledger::config::Config;
use link_ledger::sheets::{MemorySheetStore, ERRORS_RANGE, PAGES_RANGE, SUMMARY_RANGE};
use link_ledger::{RunPhase, Runner};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(root: &str) -> Config {
    let mut config = Config::default();
    config.site.root_url = root.to_string();
    config.site.label_prefix = "/".to_string();
    config.crawler.rate_limit_ms = 1;
    config.crawler.filter_level = 0;
    config.shutdown.poll_interval_ms = 10;
    config
}

fn formula(url: &str, label: &str) -> Value {
    json!(format!("=hyperlink(\"{}\", \"{}\")", url, label))
}

fn row_for<'a>(rows: &'a [Vec<Value>], first_cell: &Value) -> &'a Vec<Value> {
    rows.iter()
        .find(|row| &row[0] == first_cell)
        .unwrap_or_else(|| panic!("no row for {}", first_cell))
}

#[tokio::test]
async fn test_run_records_broken_links_and_page_counts() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/ok">ok</a>
               <a href="/missing">missing</a>
               <a href="mailto:webmaster@example.com">mail</a>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html("<p>no links</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySheetStore::new());
    store.seed_range(
        "ExcludeKeywords!A2:B",
        vec![vec![String::new(), "mailto:".to_string()]],
    );

    let mut runner = Runner::new(config(&root));
    let summary = runner.run_with_store(store.clone()).await.unwrap();

    assert_eq!(runner.phase(), RunPhase::Terminated);
    assert_eq!(store.batches().len(), 1);

    let errors = store.appended(ERRORS_RANGE);
    assert_eq!(store.append_calls(ERRORS_RANGE), 1);
    assert_eq!(
        errors,
        vec![vec![
            formula(&root, "/"),
            json!("HTTP_404"),
            json!(format!("{}/missing", server.uri())),
            json!("/missing"),
        ]]
    );

    let pages = store.appended(PAGES_RANGE);
    assert_eq!(pages.len(), 2);
    let root_row = row_for(&pages, &formula(&root, "/"));
    assert_eq!(root_row[1..], [json!(3), json!(1), json!(1), json!(1)]);
    let ok_url = format!("{}/ok", server.uri());
    let ok_row = row_for(&pages, &formula(&ok_url, "/ok"));
    assert_eq!(ok_row[1..], [json!(0), json!(0), json!(0), json!(0)]);

    assert_eq!(summary.pages_checked, 2);
    assert_eq!(summary.pages_with_errors, 1);
    assert_eq!(summary.links_total, 3);
    assert_eq!(summary.links_ok, 1);
    assert_eq!(summary.broken_links.len(), 1);
    assert_eq!(summary.skipped_links.len(), 1);

    let summary_row = store.last_update(SUMMARY_RANGE).unwrap();
    assert_eq!(summary_row[0][0], json!("Finished"));
    assert_eq!(
        summary_row[0][3..],
        [json!(2), json!(1), json!(3), json!(1), json!(1), json!(1)]
    );
}

#[tokio::test]
async fn test_run_reports_failed_page_fetch() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySheetStore::new());
    let mut runner = Runner::new(config(&root));
    let summary = runner.run_with_store(store.clone()).await.unwrap();

    let errors = store.appended(ERRORS_RANGE);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0][1], json!("HTTP_500"));
    assert_eq!(errors[0][2], json!("Internal Server Error"));
    assert_eq!(errors[0][3], json!(""));

    let pages = store.appended(PAGES_RANGE);
    assert_eq!(pages[0][1..], [json!(1), json!(0), json!(1), json!(0)]);
    assert_eq!(summary.pages_with_errors, 1);
}

#[tokio::test]
async fn test_run_with_keyword_exclusion_from_sheet() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/archive/old">old</a>"#))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySheetStore::new());
    store.seed_range("ExcludeKeywords!A2:B", vec![vec!["archive".to_string()]]);

    let mut runner = Runner::new(config(&root));
    let summary = runner.run_with_store(store.clone()).await.unwrap();

    assert_eq!(store.append_calls(ERRORS_RANGE), 0);
    assert_eq!(summary.pages_checked, 1);
    assert_eq!(summary.skipped_links.len(), 1);
    let pages = store.appended(PAGES_RANGE);
    assert_eq!(pages[0][1..], [json!(1), json!(0), json!(0), json!(1)]);
}

#[tokio::test]
async fn test_run_writes_summary_despite_huge_crawl_delay() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"User-agent: *\nCrawl-delay: 1e300\n".to_vec(), "text/plain"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>no links</p>"))
        .mount(&server)
        .await;

    let mut config = config(&root);
    config.crawler.honor_robot_exclusions = true;
    let store = Arc::new(MemorySheetStore::new());
    let mut runner = Runner::new(config);
    let summary = runner.run_with_store(store.clone()).await.unwrap();

    assert_eq!(runner.phase(), RunPhase::Terminated);
    assert_eq!(summary.pages_checked, 1);
    assert!(store.last_update(SUMMARY_RANGE).is_some());
}
