//! Crawl summary: what one crawl run did

use crate::crawler::WalkReport;
use crate::model::Article;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;

/// A category whose walk did not reach its last page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryFailure {
    pub category: String,
    pub error: String,
}

/// Summary statistics for a crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    // Run metadata
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub config_hash: Option<String>,

    // Categories
    pub categories_discovered: usize,
    pub categories_completed: usize,
    pub category_failures: Vec<CategoryFailure>,

    // Pages and articles
    pub pages_walked: usize,
    pub articles_scraped: usize,
    pub articles_failed: usize,
    pub articles_by_category: BTreeMap<String, usize>,

    // Persistence
    pub articles_persisted: usize,
    pub articles_overwritten: usize,
    pub persist_failures: usize,
}

impl CrawlSummary {
    pub fn new(started_at: DateTime<Utc>, config_hash: Option<String>) -> Self {
        Self {
            started_at,
            finished_at: None,
            config_hash,
            categories_discovered: 0,
            categories_completed: 0,
            category_failures: Vec::new(),
            pages_walked: 0,
            articles_scraped: 0,
            articles_failed: 0,
            articles_by_category: BTreeMap::new(),
            articles_persisted: 0,
            articles_overwritten: 0,
            persist_failures: 0,
        }
    }

    /// Counts an article received from a walker
    pub fn record_article(&mut self, article: &Article) {
        self.articles_scraped += 1;
        *self
            .articles_by_category
            .entry(article.category.clone())
            .or_insert(0) += 1;
    }

    /// Adds a walk's page and skip counts, whether or not it completed
    pub fn record_walk(&mut self, report: &WalkReport) {
        self.pages_walked += report.pages_walked;
        self.articles_failed += report.articles_failed;
    }

    /// Records a category that failed; later failures of the same category are ignored
    pub fn record_failure(&mut self, category: &str, error: &impl Display) {
        if self
            .category_failures
            .iter()
            .any(|failure| failure.category == category)
        {
            return;
        }
        self.category_failures.push(CategoryFailure {
            category: category.to_string(),
            error: error.to_string(),
        });
    }

    /// Marks the run as finished
    pub fn finish(&mut self, finished_at: DateTime<Utc>) {
        self.finished_at = Some(finished_at);
        self.category_failures
            .sort_by(|a, b| a.category.cmp(&b.category));
    }

    /// Run duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// "completed" or "failed"
    pub fn status(&self) -> &'static str {
        if self.category_failures.is_empty() {
            "completed"
        } else {
            "failed"
        }
    }

    /// Percentage of attempted articles that were scraped
    pub fn success_rate(&self) -> f64 {
        let attempted = self.articles_scraped + self.articles_failed;
        if attempted == 0 {
            0.0
        } else {
            (self.articles_scraped as f64 / attempted as f64) * 100.0
        }
    }
}

/// Prints a crawl summary to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Run:");
    println!("  Started: {}", summary.started_at.to_rfc3339());
    if let Some(finished) = summary.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = summary.duration_seconds() {
        println!("  Duration: {}s", duration);
    }
    println!("  Status: {}", summary.status());
    if let Some(hash) = &summary.config_hash {
        println!("  Config hash: {}", hash);
    }
    println!();

    println!("Categories:");
    println!("  Discovered: {}", summary.categories_discovered);
    println!("  Completed: {}", summary.categories_completed);
    println!("  Failed: {}", summary.category_failures.len());
    println!();

    println!("Articles:");
    println!("  Listing pages walked: {}", summary.pages_walked);
    println!("  Scraped: {}", summary.articles_scraped);
    println!("  Failed: {}", summary.articles_failed);
    println!("  Persisted: {}", summary.articles_persisted);
    println!("  Overwritten: {}", summary.articles_overwritten);
    println!("  Persist failures: {}", summary.persist_failures);
    println!();

    if !summary.articles_by_category.is_empty() {
        println!("Articles by Category:");
        for (category, count) in &summary.articles_by_category {
            println!("  {}: {}", category, count);
        }
        println!();
    }

    if !summary.category_failures.is_empty() {
        println!("Category Failures:");
        for failure in &summary.category_failures {
            println!("  - {}: {}", failure.category, failure.error);
        }
        println!();
    }

    println!("Success Rate: {:.1}%", summary.success_rate());
}
