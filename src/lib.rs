//! News-Harvester: a category-aware news article harvester
//!
//! This crate walks a news portal's category listings page by page, scrapes
//! every linked article, and stores each one as a JSON document keyed by the
//! MD5 digest of its title under a per-category directory.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for News-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Extraction error for {url}: {source}")]
    Extract {
        url: String,
        source: crawler::ExtractError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("Category task failed: {0}")]
    Task(String),
}

impl HarvestError {
    /// Wraps an extraction failure with the URL of the page it came from
    pub fn extract(url: impl Into<String>, source: crawler::ExtractError) -> Self {
        Self::Extract {
            url: url.into(),
            source,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for News-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl_all, Coordinator, CrawlReport};
pub use model::{Article, Category};
pub use storage::{ArticleStore, JsonFileStore};
