mod auth_tests;
mod crawl_tests;
mod pipeline_tests;
mod sheets_tests;

use wiremock::ResponseTemplate;

/// An HTML page response
pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}
