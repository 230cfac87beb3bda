use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a URL and requires an http(s) scheme and a host
///
/// # Examples
///
/// ```
/// use link_ledger::url::parse_http_url;
///
/// assert!(parse_http_url("https://example.com/page").is_ok());
/// assert!(parse_http_url("mailto:someone@example.com").is_err());
/// ```
pub fn parse_http_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_http_scheme(url.scheme()) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns the key a URL is cached and de-duplicated under
///
/// Two links that differ only by fragment point at the same document, so the
/// fragment is dropped. Everything else (query, trailing slash) is kept as the
/// server may treat those differently.
pub fn crawl_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.to_string()
}

/// Whether a scheme is fetched over HTTP
pub fn is_http_scheme(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}

/// Whether two URLs share a host (and port)
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str().map(str::to_lowercase) == b.host_str().map(str::to_lowercase)
        && a.port_or_known_default() == b.port_or_known_default()
}

/// Whether `link` points at the document `page` itself (ignoring fragment)
pub fn is_same_page(link: &Url, page: &Url) -> bool {
    crawl_key(link) == crawl_key(page)
}

/// Normalizes a scheme exclusion entry (`"mailto:"`, `"MAILTO"`) to `"mailto"`
pub fn normalize_scheme(scheme: &str) -> String {
    scheme.trim().trim_end_matches(':').to_lowercase()
}
