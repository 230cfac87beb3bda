//! robots.txt rule evaluation backed by the robotstxt crate

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data
///
/// Holds the raw file and evaluates rules on demand; an empty file or an
/// unreachable robots.txt allows everything.
#[derive(Debug, Clone, Default)]
pub struct ParsedRobots {
    content: String,
}

impl ParsedRobots {
    /// Creates a ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
        }
    }

    /// A permissive ParsedRobots, used when robots.txt is missing or unreadable
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `user_agent` - The user agent string
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay (seconds) that applies to a user agent
    ///
    /// A group naming the agent's product token wins over the `*` group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let agent = product_token(user_agent);
        let mut group: Vec<String> = Vec::new();
        let mut in_rules = false;
        let mut for_agent = None;
        let mut for_wildcard = None;

        for line in self.content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "user-agent" => {
                    if in_rules {
                        group.clear();
                        in_rules = false;
                    }
                    group.push(if value == "*" {
                        value.to_string()
                    } else {
                        product_token(value)
                    });
                }
                "crawl-delay" => {
                    in_rules = true;
                    let Ok(delay) = value.parse::<f64>() else {
                        continue;
                    };
                    if group.iter().any(|ua| ua != "*" && !ua.is_empty() && *ua == agent) {
                        for_agent = Some(delay);
                    } else if group.iter().any(|ua| ua == "*") {
                        for_wildcard = Some(delay);
                    }
                }
                _ => in_rules = true,
            }
        }

        for_agent.or(for_wildcard)
    }
}

/// Leading `[a-zA-Z_-]` run of a user agent, lowercased (`Mozilla/5.0 ...` is `mozilla`)
fn product_token(user_agent: &str) -> String {
    user_agent
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == '_' || *c == '-')
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.com/page";

    #[test]
    fn test_allow_all() {
        let robots = ParsedRobots::allow_all();
        assert!(robots.is_allowed("https://example.com/admin", "TestBot"));
    }

    #[test]
    fn test_disallow_specific() {
        let robots = ParsedRobots::from_content("User-agent: *\nDisallow: /admin");
        assert!(robots.is_allowed(PAGE, "TestBot"));
        assert!(!robots.is_allowed("https://example.com/admin", "TestBot"));
        assert!(!robots.is_allowed("https://example.com/admin/users", "TestBot"));
    }

    #[test]
    fn test_allow_overrides_broader_disallow() {
        let robots =
            ParsedRobots::from_content("User-agent: *\nDisallow: /private\nAllow: /private/public");
        assert!(!robots.is_allowed("https://example.com/private", "TestBot"));
        assert!(robots.is_allowed("https://example.com/private/public", "TestBot"));
    }

    #[test]
    fn test_specific_user_agent_group() {
        let robots =
            ParsedRobots::from_content("User-agent: BadBot\nDisallow: /\n\nUser-agent: *\nAllow: /");
        assert!(robots.is_allowed(PAGE, "GoodBot"));
        assert!(!robots.is_allowed(PAGE, "BadBot"));
    }

    #[test]
    fn test_garbage_allows_everything() {
        let robots = ParsedRobots::from_content("This is not valid robots.txt {{{");
        assert!(robots.is_allowed(PAGE, "TestBot"));
    }

    #[test]
    fn test_crawl_delay_wildcard() {
        let robots = ParsedRobots::from_content("User-agent: *\nCrawl-delay: 10\nDisallow: /admin");
        assert_eq!(robots.crawl_delay("TestBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_specific_agent_wins() {
        let robots = ParsedRobots::from_content(
            "User-agent: TestBot\nCrawl-delay: 5\n\nUser-agent: *\nCrawl-delay: 10",
        );
        assert_eq!(robots.crawl_delay("TestBot/1.0"), Some(5.0));
        assert_eq!(robots.crawl_delay("OtherBot"), Some(10.0));
    }

    #[test]
    fn test_crawl_delay_shared_group() {
        let robots = ParsedRobots::from_content("User-agent: BotA\nUser-agent: BotB\nCrawl-delay: 2.5");
        assert_eq!(robots.crawl_delay("BotB"), Some(2.5));
        assert_eq!(robots.crawl_delay("BotC"), None);
    }

    #[test]
    fn test_crawl_delay_matches_product_token_only() {
        let robots = ParsedRobots::from_content(
            "User-agent: m\nCrawl-delay: 30\n\nUser-agent: *\nCrawl-delay: 1",
        );
        let browser = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_6) AppleWebKit/537.36";
        assert_eq!(robots.crawl_delay(browser), Some(1.0));

        let robots = ParsedRobots::from_content("User-agent: Mozilla/5.0\nCrawl-delay: 4");
        assert_eq!(robots.crawl_delay(browser), Some(4.0));
    }

    #[test]
    fn test_crawl_delay_absent() {
        assert_eq!(ParsedRobots::allow_all().crawl_delay("TestBot"), None);
    }
}
