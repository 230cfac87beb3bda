//! Exclusion rules applied to every extracted link before it is checked

use crate::crawler::options::CrawlOptions;
use crate::crawler::parser::ExtractedLink;
use crate::robots::ParsedRobots;
use crate::url::{is_http_scheme, is_same_page, matches_keyword, same_host};
use url::Url;

/// What to do with an extracted link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screening {
    /// Broken without a request (`BLC_INVALID`)
    Broken(&'static str),

    /// Skipped without a request (`BLC_SCHEME`, `BLC_KEYWORD`, ...)
    Excluded(&'static str),

    /// Must be checked over HTTP
    Check(Url),
}

/// Applies the crawl's exclusion rules, in order
///
/// 1. unresolvable → broken `BLC_INVALID`
/// 2. excluded scheme → `BLC_SCHEME`
/// 3. any other non-http(s) scheme → broken `BLC_INVALID`
/// 4. same page fragment → `BLC_SAMEPAGE`
/// 5. other host, when external links are excluded → `BLC_EXTERNAL`
/// 6. keyword match → `BLC_KEYWORD`
/// 7. disallowed by the site's robots.txt → `BLC_ROBOTS`
pub struct LinkFilter<'a> {
    options: &'a CrawlOptions,
    site_url: &'a Url,
    robots: Option<&'a ParsedRobots>,
}

impl<'a> LinkFilter<'a> {
    /// `robots` is the site host's robots.txt, consulted only when honoring is on
    pub fn new(options: &'a CrawlOptions, site_url: &'a Url, robots: Option<&'a ParsedRobots>) -> Self {
        Self {
            options,
            site_url,
            robots,
        }
    }

    pub fn screen(&self, link: &ExtractedLink, page_url: &Url) -> Screening {
        let Some(url) = link.resolved.as_ref() else {
            return Screening::Broken("BLC_INVALID");
        };

        if self.options.is_scheme_excluded(url.scheme()) {
            return Screening::Excluded("BLC_SCHEME");
        }

        if !is_http_scheme(url.scheme()) || url.host_str().is_none() {
            return Screening::Broken("BLC_INVALID");
        }

        if self.options.exclude_links_to_same_page
            && url.fragment().is_some()
            && is_same_page(url, page_url)
        {
            return Screening::Excluded("BLC_SAMEPAGE");
        }

        let internal = same_host(url, self.site_url);
        if self.options.exclude_external_links && !internal {
            return Screening::Excluded("BLC_EXTERNAL");
        }

        if self
            .options
            .excluded_keywords
            .iter()
            .any(|keyword| matches_keyword(keyword, url.as_str()))
        {
            return Screening::Excluded("BLC_KEYWORD");
        }

        if self.options.honor_robot_exclusions && internal {
            if let Some(robots) = self.robots {
                if !robots.is_allowed(url.as_str(), &self.options.user_agent) {
                    return Screening::Excluded("BLC_ROBOTS");
                }
            }
        }

        Screening::Check(url.clone())
    }
}
