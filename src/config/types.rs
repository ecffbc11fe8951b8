use serde::Deserialize;
use std::path::PathBuf;

/// Portal root used when neither the config file nor the CLI names one
pub const DEFAULT_BASE_URL: &str = "https://gunosy.com";

/// Main configuration structure for News-Harvester
///
/// Every section is optional; missing sections and keys take their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Target portal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Portal root whose navigation lists the categories
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Crawl traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of navigation categories the portal must expose
    #[serde(rename = "expected-categories")]
    pub expected_categories: usize,

    /// Maximum number of categories walked at the same time
    #[serde(rename = "max-concurrent-categories")]
    pub max_concurrent_categories: usize,

    /// Maximum number of article pages fetched at once within one listing page
    #[serde(rename = "max-concurrent-articles")]
    pub max_concurrent_articles: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            expected_categories: 8,
            max_concurrent_categories: 8,
            max_concurrent_articles: 4,
        }
    }
}

/// HTTP request behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Extra attempts after a retryable failure
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay between attempts (milliseconds), multiplied by the attempt number
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 3,
            retry_delay_ms: 500,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "NewsHarvester".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory holding one subdirectory per category
    #[serde(rename = "data-root-dir")]
    pub data_root_dir: PathBuf,

    /// Optional path of a markdown crawl summary
    #[serde(rename = "summary-path")]
    pub summary_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_root_dir: PathBuf::from("data").join("articles"),
            summary_path: None,
        }
    }
}
