//! Output module for crawl summaries and corpus reports
//!
//! This module handles:
//! - Recording what a crawl run did (counts, timings, failures)
//! - Generating markdown summaries of crawl results
//! - Reporting statistics of a stored corpus

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, CorpusStatistics};
pub use summary::{print_summary, CategoryFailure, CrawlSummary};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
