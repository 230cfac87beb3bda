//! HTML parser for extracting checkable links
//!
//! Which elements count as links depends on the filter level:
//! - 0: clickable links (`<a>`, `<area>`)
//! - 1: + media (`<img>`, `<iframe>`, `<audio>`, `<video>`, `<source>`, `<embed>`, `<object>`)
//! - 2: + forms, scripts and stylesheets
//! - 3: + metadata (other `<link>` rels, meta refresh, `cite` attributes)
//!
//! Links are returned in document order, with `<base href>` honored.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A link found in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    /// The attribute value exactly as written
    pub original: String,

    /// The absolute URL, or None if the value cannot be resolved
    pub resolved: Option<Url>,

    /// The tag the link was found on
    pub tag: &'static str,
}

const CANDIDATES: &str = "a[href], area[href], img[src], iframe[src], audio[src], \
    video[src], video[poster], source[src], embed[src], object[data], form[action], \
    script[src], link[href], meta[http-equiv][content], blockquote[cite], q[cite]";

/// Parses HTML content and extracts links up to `filter_level`
///
/// # Example
///
/// ```
/// use link_ledger::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/a">A</a><img src="b.png">"#;
/// let page = Url::parse("https://example.com/dir/").unwrap();
///
/// let links = extract_links(html, &page, 0);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].resolved.as_ref().unwrap().as_str(), "https://example.com/a");
/// ```
pub fn extract_links(html: &str, page_url: &Url, filter_level: u8) -> Vec<ExtractedLink> {
    let document = Html::parse_document(html);
    let base = base_url(&document, page_url);

    let Ok(selector) = Selector::parse(CANDIDATES) else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        for (tag, value) in link_attributes(element, filter_level) {
            let original = value.trim().to_string();
            let resolved = resolve(&original, &base);
            links.push(ExtractedLink {
                original,
                resolved,
                tag,
            });
        }
    }

    links
}

/// The first `<base href>` resolved against the page, or the page itself
fn base_url(document: &Html, page_url: &Url) -> Url {
    Selector::parse("base[href]")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|element| element.value().attr("href"))
                .and_then(|href| page_url.join(href.trim()).ok())
        })
        .unwrap_or_else(|| page_url.clone())
}

/// Link-carrying attribute values of one element, filtered by level
fn link_attributes(element: ElementRef<'_>, filter_level: u8) -> Vec<(&'static str, String)> {
    let el = element.value();
    let attr = |name: &str| el.attr(name).map(str::to_string);

    let found: Vec<(&'static str, u8, Option<String>)> = match el.name() {
        "a" => vec![("a", 0, attr("href"))],
        "area" => vec![("area", 0, attr("href"))],
        "img" => vec![("img", 1, attr("src"))],
        "iframe" => vec![("iframe", 1, attr("src"))],
        "audio" => vec![("audio", 1, attr("src"))],
        "video" => vec![("video", 1, attr("src")), ("video", 1, attr("poster"))],
        "source" => vec![("source", 1, attr("src"))],
        "embed" => vec![("embed", 1, attr("src"))],
        "object" => vec![("object", 1, attr("data"))],
        "form" => vec![("form", 2, attr("action"))],
        "script" => vec![("script", 2, attr("src"))],
        "link" => {
            let level = if is_stylesheet(el.attr("rel")) { 2 } else { 3 };
            vec![("link", level, attr("href"))]
        }
        "meta" => {
            let refresh = el
                .attr("http-equiv")
                .map_or(false, |v| v.eq_ignore_ascii_case("refresh"));
            let target = if refresh {
                el.attr("content").and_then(refresh_target)
            } else {
                None
            };
            vec![("meta", 3, target)]
        }
        "blockquote" => vec![("blockquote", 3, attr("cite"))],
        "q" => vec![("q", 3, attr("cite"))],
        _ => Vec::new(),
    };

    found
        .into_iter()
        .filter(|(_, level, _)| *level <= filter_level)
        .filter_map(|(tag, _, value)| value.map(|v| (tag, v)))
        .collect()
}

fn is_stylesheet(rel: Option<&str>) -> bool {
    rel.map_or(false, |rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

/// Extracts the URL from a meta refresh value like `5; url=/next`
fn refresh_target(content: &str) -> Option<String> {
    let (_, rest) = content.split_once(';')?;
    let rest = rest.trim();
    let (key, value) = rest.split_once('=')?;
    if !key.trim().eq_ignore_ascii_case("url") {
        return None;
    }
    let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
    (!value.is_empty()).then(|| value.to_string())
}

/// Resolves a link against the base URL
///
/// An empty value resolves to the base itself, as a browser would.
fn resolve(value: &str, base: &Url) -> Option<Url> {
    base.join(value).ok()
}
