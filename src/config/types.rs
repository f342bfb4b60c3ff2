use serde::Deserialize;
use std::time::Duration;

/// Default request timeout for page fetches, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Main configuration structure for Site-Archiver
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URL; `http://` is assumed when no scheme is given
    pub seed: String,

    /// Maximum number of link hops from the seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of distinct pages to schedule (0 = unbounded)
    #[serde(rename = "max-pages", default)]
    pub max_pages: u32,

    /// Number of concurrent workers
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Drop links whose registrable domain differs from the seed's
    #[serde(rename = "exclude-external-links", default = "default_exclude_external")]
    pub exclude_external_links: bool,

    /// Per-request timeout in seconds
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "site-archiver".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/site-archiver".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// The immutable settings of a single crawl
///
/// This is what the crawl engine consumes; it can be built from a loaded
/// [`Config`] or directly by an embedding application.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed: String,
    pub max_depth: u32,
    /// 0 means unbounded
    pub max_pages: usize,
    pub workers: usize,
    pub exclude_external_links: bool,
    pub request_timeout: Duration,
    pub user_agent: UserAgentConfig,
}

impl CrawlConfig {
    /// Creates a crawl configuration with the default worker count and timeout
    pub fn new(seed: impl Into<String>, max_depth: u32, max_pages: usize) -> Self {
        Self {
            seed: seed.into(),
            max_depth,
            max_pages,
            workers: default_workers() as usize,
            exclude_external_links: default_exclude_external(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: UserAgentConfig::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_exclude_external_links(mut self, exclude: bool) -> Self {
        self.exclude_external_links = exclude;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the crawl settings from a validated file configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            seed: config.crawler.seed.clone(),
            max_depth: config.crawler.max_depth,
            max_pages: config.crawler.max_pages as usize,
            workers: config.crawler.workers as usize,
            exclude_external_links: config.crawler.exclude_external_links,
            request_timeout: Duration::from_secs(config.crawler.request_timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

fn default_workers() -> u32 {
    8
}

fn default_exclude_external() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
