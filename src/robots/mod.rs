//! Robots.txt handling module
//!
//! The crawl fetches the seed site's robots.txt once, before any worker starts, and
//! consults it for every discovered link. Only the wildcard (`*`) group is obeyed.
//! Failing to obtain robots.txt never aborts a crawl: it degrades to allow-all,
//! except for 401/403 responses which deny the whole site.

mod parser;

pub use parser::{ParsedRobots, WILDCARD_AGENT};

use crate::url::registrable_domain_of;
use reqwest::{Client, StatusCode};
use url::Url;

/// Robots rules bound to the site they were fetched from
///
/// URLs whose registrable domain differs from the seed's are outside the rules'
/// jurisdiction and are always allowed.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    robots: ParsedRobots,
    base_domain: String,
}

impl RobotsPolicy {
    /// Creates a policy applying `robots` to URLs on `base_domain`
    pub fn new(robots: ParsedRobots, base_domain: impl Into<String>) -> Self {
        Self {
            robots,
            base_domain: base_domain.into(),
        }
    }

    /// Creates a policy that allows every URL
    pub fn allow_all(base_domain: impl Into<String>) -> Self {
        Self::new(ParsedRobots::allow_all(), base_domain)
    }

    /// Returns the underlying rules
    pub fn robots(&self) -> &ParsedRobots {
        &self.robots
    }

    /// Checks whether the archiver may fetch `url`
    pub fn is_allowed(&self, url: &Url) -> bool {
        if registrable_domain_of(url).as_deref() != Some(self.base_domain.as_str()) {
            return true;
        }
        self.robots.is_allowed(url.as_str())
    }
}

/// Builds the robots.txt location for a crawl
///
/// The file is always requested over plain HTTP from the seed's registrable
/// domain. An explicit port on the seed is kept.
///
/// # Examples
///
/// ```
/// use site_archiver::robots::robots_url;
/// use url::Url;
///
/// let seed = Url::parse("https://www.example.com/start").unwrap();
/// assert_eq!(robots_url(&seed, "example.com"), "http://example.com/robots.txt");
/// ```
pub fn robots_url(seed: &Url, base_domain: &str) -> String {
    match seed.port() {
        Some(port) => format!("http://{}:{}/robots.txt", base_domain, port),
        None => format!("http://{}/robots.txt", base_domain),
    }
}

/// Fetches and parses a robots.txt file
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `robots_url` - Absolute location of the robots.txt file
///
/// # Returns
///
/// The parsed rules. 2xx bodies are parsed, 401 and 403 deny everything, and any
/// other status or a network failure allows everything.
pub async fn fetch_robots(client: &Client, robots_url: &str) -> ParsedRobots {
    let response = match client.get(robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                "Could not fetch {}: {}; allowing all URLs",
                robots_url,
                e
            );
            return ParsedRobots::allow_all();
        }
    };

    let status = response.status();

    if status.is_success() {
        return match response.text().await {
            Ok(content) => {
                tracing::debug!("Parsed robots.txt from {} ({} bytes)", robots_url, content.len());
                ParsedRobots::from_content(&content)
            }
            Err(e) => {
                tracing::warn!(
                    "Could not read {}: {}; allowing all URLs",
                    robots_url,
                    e
                );
                ParsedRobots::allow_all()
            }
        };
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tracing::warn!(
            "{} answered {}; disallowing the whole site",
            robots_url,
            status.as_u16()
        );
        return ParsedRobots::disallow_all();
    }

    tracing::info!(
        "{} answered {}; allowing all URLs",
        robots_url,
        status.as_u16()
    );
    ParsedRobots::allow_all()
}

/// Loads the robots policy for a crawl starting at `seed`
pub async fn load_policy(client: &Client, seed: &Url, base_domain: &str) -> RobotsPolicy {
    let location = robots_url(seed, base_domain);
    let robots = fetch_robots(client, &location).await;
    RobotsPolicy::new(robots, base_domain)
}
