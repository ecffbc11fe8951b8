//! Configuration module for News-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing file is not required: [`Config::default`] targets the default
//! portal and writes under `data/articles`.
//!
//! # Example
//!
//! ```no_run
//! use news_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Crawling {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, SiteConfig, UserAgentConfig,
    DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
