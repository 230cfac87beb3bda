use serde::Deserialize;

/// Main configuration structure for Link-Ledger
///
/// Every section is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub sheet: SheetConfig,
    pub auth: AuthConfig,
    pub shutdown: ShutdownConfig,
}

/// The site being checked
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Root URL the crawl starts from
    pub root_url: String,

    /// Prefix prepended to page paths in spreadsheet hyperlink labels
    pub label_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_url: "https://web-central.appspot.com/web/".to_string(),
            label_prefix: "/web/".to_string(),
        }
    }
}

/// HTTP method used to check links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestMethod {
    Get,
    Head,
}

/// Crawl driver behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// How long a cached link check stays valid (milliseconds)
    pub cache_expiry_ms: u64,

    /// Whether link check responses are cached at all
    pub cache_responses: bool,

    /// Keyword exclusions merged with the ones read from the spreadsheet
    pub excluded_keywords: Vec<String>,

    /// Scheme exclusions merged with the ones read from the spreadsheet
    pub excluded_schemes: Vec<String>,

    /// Skip checking links that leave the site's host
    pub exclude_external_links: bool,

    /// Skip fragment links pointing back at the page they appear on
    pub exclude_links_to_same_page: bool,

    /// Which tags links are collected from (0 clickable .. 3 metadata)
    pub filter_level: u8,

    /// Whether robots.txt disallow rules exclude links
    pub honor_robot_exclusions: bool,

    /// Minimum time between request starts to one host (milliseconds)
    pub rate_limit_ms: u64,

    /// Maximum concurrent link checks
    pub max_sockets_per_host: usize,

    /// HTTP method used for link checks
    pub request_method: RequestMethod,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Accept invalid TLS certificates
    pub accept_invalid_certs: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            cache_expiry_ms: 3 * 60 * 60 * 1000,
            cache_responses: true,
            excluded_keywords: Vec::new(),
            excluded_schemes: Vec::new(),
            exclude_external_links: false,
            exclude_links_to_same_page: true,
            filter_level: 3,
            honor_robot_exclusions: false,
            rate_limit_ms: 10,
            max_sockets_per_host: 1,
            request_method: RequestMethod::Get,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/63.0.3239.30 Safari/537.36"
                .to_string(),
            request_timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

/// Which columns the final summary row carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryLayout {
    /// Status, timestamps and every run counter
    Cumulative,
    /// Status and timestamps only
    PerRun,
}

/// Destination spreadsheet configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SheetConfig {
    pub spreadsheet_id: String,

    /// Base URL of the Sheets REST API
    pub api_base_url: String,

    /// Numeric sheet id of the Summary tab
    pub summary_sheet_id: i64,

    /// Numeric sheet id of the Errors tab
    pub errors_sheet_id: i64,

    /// Numeric sheet id of the Pages tab
    pub pages_sheet_id: i64,

    /// Range holding keyword and scheme exclusions
    pub exclusions_range: String,

    pub summary_layout: SummaryLayout,

    /// Extra attempts for a failed row write (0 means log and drop)
    pub write_retries: u32,

    /// Backoff before the first retry (milliseconds), doubled per attempt
    pub retry_backoff_ms: u64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: "1ObBKWXu0KQ7yaew8VvG-eArXXyIX64sSSseXRZRADuU".to_string(),
            api_base_url: "https://sheets.googleapis.com".to_string(),
            summary_sheet_id: 635298754,
            errors_sheet_id: 0,
            pages_sheet_id: 352617043,
            exclusions_range: "ExcludeKeywords!A2:B".to_string(),
            summary_layout: SummaryLayout::Cumulative,
            write_retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

/// OAuth configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AuthConfig {
    /// Path to the downloaded OAuth client credentials
    pub client_secret_path: String,

    /// File name of the token cache inside `<home>/.credentials/`
    pub token_file: String,

    pub scopes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_secret_path: "client_secret.json".to_string(),
            token_file: "sheets.googleapis.com-blc.json".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/spreadsheets".to_string()],
        }
    }
}

/// Shutdown behavior once the crawl has finished
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ShutdownConfig {
    /// Wait for in-flight spreadsheet writes before exiting
    pub wait_for_pending_writes: bool,

    /// How often the pending write count is polled (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            wait_for_pending_writes: true,
            poll_interval_ms: 750,
        }
    }
}
