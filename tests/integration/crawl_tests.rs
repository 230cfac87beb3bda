use crate::html;
use link_ledger::config::RequestMethod;
use link_ledger::crawler::{build_http_client, start_crawl, ErrorCode, LinkResult};
use link_ledger::{CrawlEvent, CrawlOptions, SiteChecker};
use std::time::Duration;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options() -> CrawlOptions {
    let mut options = CrawlOptions::default();
    options.rate_limit = Duration::from_millis(1);
    options.filter_level = 0;
    options
}

async fn crawl(options: CrawlOptions, root: &str) -> Vec<CrawlEvent> {
    let client = build_http_client(&options).unwrap();
    let mut checker = SiteChecker::new(options, client);
    checker.enqueue(root).unwrap();

    let (tx, mut rx) = mpsc::channel(256);
    let driver = tokio::spawn(checker.run(tx));

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    driver.await.unwrap().unwrap();
    events
}

fn links_of(events: &[CrawlEvent], page: &str) -> Vec<LinkResult> {
    events
        .iter()
        .filter_map(|event| match event {
            CrawlEvent::Link(result) | CrawlEvent::Junk(result) if result.base_url == page => {
                Some(result.clone())
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_crawl_reports_links_in_document_order() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
                <a href="/ok">ok</a>
                <a href="/missing">missing</a>
                <a href="mailto:webmaster@example.com">mail</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html("<html><body>nothing here</body></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut options = options();
    options.add_exclusions(Vec::new(), vec!["mailto:".to_string()]);
    let events = crawl(options, &root).await;

    let links = links_of(&events, &root);
    assert_eq!(links.len(), 3);
    assert_eq!(links[0].original_url, "/ok");
    assert!(!links[0].broken);
    assert_eq!(links[1].broken_reason.as_deref(), Some("HTTP_404"));
    assert!(links[2].excluded);
    assert_eq!(links[2].excluded_reason.as_deref(), Some("BLC_SCHEME"));
    assert!(events.iter().any(|e| matches!(e, CrawlEvent::Junk(_))));

    // The ok internal link becomes a page of its own
    let ok_page = format!("{}/ok", server.uri());
    assert!(events
        .iter()
        .any(|e| matches!(e, CrawlEvent::Html { page_url } if *page_url == ok_page)));

    assert!(matches!(events[0], CrawlEvent::Html { .. }));
    assert!(matches!(events[events.len() - 2], CrawlEvent::Site { .. }));
    assert!(matches!(events[events.len() - 1], CrawlEvent::End));
}

#[tokio::test]
async fn test_page_events_never_interleave() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">a</a><a href="/b">b</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/b">b</a><a href="/">home</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html(r#"<a href="/a">a</a>"#))
        .mount(&server)
        .await;

    let mut options = options();
    options.max_sockets_per_host = 4;
    let events = crawl(options, &root).await;

    let mut current: Option<String> = None;
    let mut pages = 0;
    for event in &events {
        match event {
            CrawlEvent::Html { page_url } => {
                assert!(current.is_none(), "page started inside another page");
                current = Some(page_url.clone());
            }
            CrawlEvent::Link(result) | CrawlEvent::Junk(result) => {
                assert_eq!(Some(&result.base_url), current.as_ref());
            }
            CrawlEvent::Page { page_url, .. } => {
                assert_eq!(Some(page_url), current.as_ref());
                current = None;
                pages += 1;
            }
            _ => {}
        }
    }
    assert_eq!(pages, 3);
}

#[tokio::test]
async fn test_repeated_link_is_answered_from_cache() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">a</a><a href="/shared">s</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/shared">s</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html("<p>shared</p>"))
        .mount(&server)
        .await;

    let events = crawl(options(), &root).await;

    let from_root = links_of(&events, &root);
    assert!(!from_root[1].cached);

    let from_a = links_of(&events, &format!("{}/a", server.uri()));
    assert_eq!(from_a.len(), 1);
    assert!(from_a[0].cached);
    assert!(!from_a[0].broken);
}

#[tokio::test]
async fn test_failed_root_page_carries_status() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let events = crawl(options(), &root).await;

    assert_eq!(events.len(), 3);
    match &events[0] {
        CrawlEvent::Page { page_url, error, .. } => {
            assert_eq!(page_url, &root);
            assert_eq!(error.as_ref().map(|e| e.code.clone()), Some(ErrorCode::Status(500)));
        }
        other => panic!("expected a page event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_html_page_is_reported_as_status_200() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/report.pdf">report</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;

    let events = crawl(options(), &root).await;

    let pdf = format!("{}/report.pdf", server.uri());
    let page_error = events.iter().find_map(|event| match event {
        CrawlEvent::Page { page_url, error, .. } if *page_url == pdf => Some(error.clone()),
        _ => None,
    });
    let error = page_error.flatten().unwrap();
    assert_eq!(error.code, ErrorCode::Status(200));
    assert!(error.is_non_error());
}

#[tokio::test]
async fn test_head_check_falls_back_to_get() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/no-head">x</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(html("<p>fine</p>"))
        .mount(&server)
        .await;

    let mut options = options();
    options.request_method = RequestMethod::Head;
    let events = crawl(options, &root).await;

    let links = links_of(&events, &root);
    assert_eq!(links.len(), 1);
    assert!(!links[0].broken);
}

#[tokio::test]
async fn test_robots_disallow_excludes_internal_links() {
    let server = MockServer::start().await;
    let root = format!("{}/", server.uri());

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"User-agent: *\nDisallow: /private/\n".to_vec(), "text/plain"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/private/page">secret</a>"#))
        .mount(&server)
        .await;

    let mut options = options();
    options.honor_robot_exclusions = true;
    let events = crawl(options, &root).await;

    assert!(events
        .iter()
        .any(|e| matches!(e, CrawlEvent::Robots { .. })));
    let links = links_of(&events, &root);
    assert_eq!(links.len(), 1);
    assert!(links[0].excluded);
    assert_eq!(links[0].excluded_reason.as_deref(), Some("BLC_ROBOTS"));
}

#[tokio::test]
async fn test_start_crawl_survives_huge_crawl_delay() {
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

    let mut options = options();
    options.honor_robot_exclusions = true;
    let (mut rx, driver) = start_crawl(options, &root).unwrap();

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    driver.await.unwrap().unwrap();

    assert!(events.iter().any(|e| matches!(e, CrawlEvent::Site { .. })));
    assert!(matches!(events.last(), Some(CrawlEvent::End)));
}
