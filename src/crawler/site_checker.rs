//! Site checker - the crawl loop
//!
//! Pages are processed one at a time, so the events of one page are never
//! interleaved with another page's. Link checks inside a page run
//! concurrently, and their results are emitted in document order.

use crate::crawler::cache::ResponseCache;
use crate::crawler::events::{CrawlEvent, LinkResult, PageError};
use crate::crawler::fetcher::{check_link, fetch_page, LinkCheck, PageFetch};
use crate::crawler::filter::{LinkFilter, Screening};
use crate::crawler::options::CrawlOptions;
use crate::crawler::parser::{extract_links, ExtractedLink};
use crate::crawler::scheduler::{crawl_delay_duration, host_key, Frontier, HostThrottle};
use crate::robots::{fetch_robots, ParsedRobots};
use crate::url::{crawl_key, parse_http_url, same_host};
use crate::{LedgerError, UrlResult};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use url::Url;

/// Crawls one site and reports every link it finds as events
pub struct SiteChecker {
    options: CrawlOptions,
    client: Client,
    frontier: Frontier,
    cache: ResponseCache,
    throttle: HostThrottle,
    site_url: Option<Url>,
}

/// How one extracted link will be reported
enum Plan {
    Ready(LinkResult),
    Pending { link: ExtractedLink, check: usize },
    Cached { link: ExtractedLink, check: LinkCheck },
}

impl SiteChecker {
    pub fn new(options: CrawlOptions, client: Client) -> Self {
        let cache = ResponseCache::new(options.cache_expiry, options.cache_responses);
        let throttle = HostThrottle::new(options.rate_limit);
        Self {
            options,
            client,
            frontier: Frontier::new(),
            cache,
            throttle,
            site_url: None,
        }
    }

    /// Queues the site root (or any page of the site)
    ///
    /// The first URL enqueued defines the site: only pages on its host are
    /// crawled.
    pub fn enqueue(&mut self, url: &str) -> UrlResult<()> {
        let url = parse_http_url(url)?;
        if self.site_url.is_none() {
            self.site_url = Some(url.clone());
        }
        self.frontier.push(&url);
        Ok(())
    }

    /// Number of pages waiting to be crawled
    pub fn queued(&self) -> usize {
        self.frontier.len()
    }

    /// Crawls until the frontier is empty, sending events to `events`
    ///
    /// Ends with `Site` then `End`. Fails only if the receiver goes away.
    pub async fn run(mut self, events: mpsc::Sender<CrawlEvent>) -> crate::Result<()> {
        let Some(site_url) = self.site_url.clone() else {
            tracing::warn!("Crawl started with nothing enqueued");
            emit(&events, CrawlEvent::End).await?;
            return Ok(());
        };

        tracing::info!("Crawling {}", site_url);

        while let Some(page_url) = self.frontier.pop() {
            self.check_page(&site_url, page_url, &events).await?;
        }

        emit(
            &events,
            CrawlEvent::Site {
                site_url: site_url.to_string(),
            },
        )
        .await?;
        emit(&events, CrawlEvent::End).await
    }

    async fn check_page(
        &mut self,
        site_url: &Url,
        page_url: Url,
        events: &mpsc::Sender<CrawlEvent>,
    ) -> crate::Result<()> {
        let host = host_key(&page_url);
        if self.options.honor_robot_exclusions && self.throttle.needs_robots(&host).await {
            let robots = fetch_robots(&self.client, &page_url).await;
            self.throttle.store_robots(&host, robots).await;
            emit(events, CrawlEvent::Robots { host: host.clone() }).await?;
        }

        let delay = self.crawl_delay(&host).await;
        self.throttle.acquire(&host, delay).await;

        tracing::debug!("Fetching page {}", page_url);
        let (final_url, body) = match fetch_page(&self.client, page_url.as_str()).await {
            PageFetch::Html { final_url, body } => (final_url, body),
            PageFetch::Failed(error) => {
                return self.finish_page(&page_url, Some(error), events).await;
            }
        };

        emit(
            events,
            CrawlEvent::Html {
                page_url: page_url.to_string(),
            },
        )
        .await?;

        let document_url = Url::parse(&final_url).unwrap_or_else(|_| page_url.clone());
        let links = extract_links(&body, &document_url, self.options.filter_level);
        let robots = if self.options.honor_robot_exclusions {
            self.throttle.robots(&host_key(site_url)).await
        } else {
            None
        };

        let results = self
            .check_links(site_url, &page_url, links, robots.as_ref())
            .await;

        for result in results {
            if !result.broken && !result.excluded {
                if let Some(url) = result.resolved_url.as_deref().and_then(|u| Url::parse(u).ok()) {
                    if same_host(&url, site_url) && self.frontier.push(&url) {
                        tracing::trace!("Queued {}", url);
                    }
                }
            }

            let event = if result.excluded {
                CrawlEvent::Junk(result)
            } else {
                CrawlEvent::Link(result)
            };
            emit(events, event).await?;
        }

        self.finish_page(&page_url, None, events).await
    }

    /// Screens, de-duplicates and checks the links of one page
    async fn check_links(
        &mut self,
        site_url: &Url,
        page_url: &Url,
        links: Vec<ExtractedLink>,
        robots: Option<&ParsedRobots>,
    ) -> Vec<LinkResult> {
        let filter = LinkFilter::new(&self.options, site_url, robots);
        let now = Instant::now();

        let mut to_check: Vec<Url> = Vec::new();
        let mut index_by_key: HashMap<String, usize> = HashMap::new();
        let mut plans = Vec::with_capacity(links.len());

        for link in links {
            match filter.screen(&link, page_url) {
                Screening::Broken(reason) => plans.push(Plan::Ready(screened_result(
                    page_url, link, Some(reason), None,
                ))),
                Screening::Excluded(reason) => plans.push(Plan::Ready(screened_result(
                    page_url, link, None, Some(reason),
                ))),
                Screening::Check(url) => {
                    let key = crawl_key(&url);
                    if let Some(check) = self.cache.get(&key, now) {
                        plans.push(Plan::Cached { link, check });
                    } else if let Some(&index) = index_by_key.get(&key) {
                        plans.push(Plan::Pending { link, check: index });
                    } else {
                        index_by_key.insert(key, to_check.len());
                        plans.push(Plan::Pending {
                            link,
                            check: to_check.len(),
                        });
                        to_check.push(url);
                    }
                }
            }
        }

        let checks = self.run_checks(&to_check).await;

        let finished = Instant::now();
        for (url, check) in to_check.iter().zip(&checks) {
            self.cache.insert(crawl_key(url), check.clone(), finished);
        }

        let mut first_use = vec![true; checks.len()];
        plans
            .into_iter()
            .map(|plan| match plan {
                Plan::Ready(result) => result,
                Plan::Cached { link, check } => checked_result(page_url, link, &check, true),
                Plan::Pending { link, check } => {
                    // Repeats of a URL on the same page are answered from the first check
                    let cached = !std::mem::replace(&mut first_use[check], false);
                    checked_result(page_url, link, &checks[check], cached)
                }
            })
            .collect()
    }

    /// Checks URLs concurrently, keeping their order
    async fn run_checks(&self, urls: &[Url]) -> Vec<LinkCheck> {
        let mut delays = HashMap::new();
        for url in urls {
            let host = host_key(url);
            if !delays.contains_key(&host) {
                let delay = self.crawl_delay(&host).await;
                delays.insert(host, delay);
            }
        }

        let client = &self.client;
        let throttle = &self.throttle;
        let method = self.options.request_method;

        let checks: Vec<_> = urls
            .iter()
            .cloned()
            .map(|url| {
                let host = host_key(&url);
                let delay = delays.get(&host).copied().flatten();
                async move {
                    throttle.acquire(&host, delay).await;
                    let check = check_link(client, url.as_str(), method).await;
                    if let Some(reason) = &check.broken_reason {
                        tracing::debug!("{} is broken: {}", url, reason);
                    }
                    check
                }
            })
            .collect();

        stream::iter(checks)
            .buffered(self.options.max_sockets_per_host)
            .collect()
            .await
    }

    /// robots.txt crawl delay for `host`, when robots are honored
    async fn crawl_delay(&self, host: &str) -> Option<Duration> {
        if !self.options.honor_robot_exclusions {
            return None;
        }
        self.throttle
            .robots(host)
            .await
            .and_then(|robots| robots.crawl_delay(&self.options.user_agent))
            .and_then(crawl_delay_duration)
    }

    async fn finish_page(
        &self,
        page_url: &Url,
        error: Option<PageError>,
        events: &mpsc::Sender<CrawlEvent>,
    ) -> crate::Result<()> {
        if let Some(error) = &error {
            tracing::debug!("Page {} failed: {} {}", page_url, error.code, error.message);
        }
        emit(
            events,
            CrawlEvent::Page {
                page_url: page_url.to_string(),
                error,
                queued: self.frontier.len(),
            },
        )
        .await
    }
}

fn screened_result(
    page_url: &Url,
    link: ExtractedLink,
    broken_reason: Option<&'static str>,
    excluded_reason: Option<&'static str>,
) -> LinkResult {
    LinkResult {
        base_url: page_url.to_string(),
        original_url: link.original,
        resolved_url: link.resolved.map(String::from),
        tag: link.tag,
        broken: broken_reason.is_some(),
        broken_reason: broken_reason.map(str::to_string),
        excluded: excluded_reason.is_some(),
        excluded_reason: excluded_reason.map(str::to_string),
        cached: false,
    }
}

fn checked_result(page_url: &Url, link: ExtractedLink, check: &LinkCheck, cached: bool) -> LinkResult {
    LinkResult {
        base_url: page_url.to_string(),
        original_url: link.original,
        resolved_url: link.resolved.map(String::from),
        tag: link.tag,
        broken: check.is_broken(),
        broken_reason: check.broken_reason.clone(),
        excluded: false,
        excluded_reason: None,
        cached,
    }
}

async fn emit(events: &mpsc::Sender<CrawlEvent>, event: CrawlEvent) -> crate::Result<()> {
    events
        .send(event)
        .await
        .map_err(|_| LedgerError::Driver("event receiver dropped".to_string()))
}
