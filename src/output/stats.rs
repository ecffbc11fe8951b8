//! Statistics of a stored corpus
//!
//! This module reads an article store and reports how many documents each
//! category holds, flagging layouts a downstream reader would reject.

use crate::storage::ArticleStore;
use crate::HarvestError;
use std::collections::BTreeMap;

/// Corpus statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusStatistics {
    /// Article count per category directory
    pub articles_by_category: BTreeMap<String, usize>,

    /// Total number of stored articles
    pub total_articles: usize,

    /// Number of category directories a complete corpus has
    pub expected_categories: usize,
}

impl CorpusStatistics {
    /// Number of category directories found
    pub fn category_count(&self) -> usize {
        self.articles_by_category.len()
    }

    /// True when the corpus has exactly the expected category directories
    pub fn has_expected_layout(&self) -> bool {
        self.category_count() == self.expected_categories
    }

    /// Categories without any documents
    pub fn empty_categories(&self) -> Vec<&str> {
        self.articles_by_category
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(category, _)| category.as_str())
            .collect()
    }
}

/// Loads statistics from a store
///
/// # Arguments
///
/// * `store` - The store to inspect
/// * `expected_categories` - Category count a complete corpus must have
pub fn load_statistics(
    store: &dyn ArticleStore,
    expected_categories: usize,
) -> Result<CorpusStatistics, HarvestError> {
    let mut articles_by_category = BTreeMap::new();
    for category in store.list_categories()? {
        let count = store.count(&category)?;
        articles_by_category.insert(category, count);
    }

    let total_articles = articles_by_category.values().sum();

    Ok(CorpusStatistics {
        articles_by_category,
        total_articles,
        expected_categories,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CorpusStatistics) {
    println!("=== Corpus Statistics ===\n");

    println!("Overview:");
    println!("  Total articles: {}", stats.total_articles);
    println!(
        "  Categories: {} (expected {})",
        stats.category_count(),
        stats.expected_categories
    );
    println!();

    println!("Articles by Category:");
    let mut counts: Vec<_> = stats.articles_by_category.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (category, count) in counts {
        let percentage = if stats.total_articles > 0 {
            (*count as f64 / stats.total_articles as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", category, count, percentage);
    }
    println!();

    if !stats.has_expected_layout() {
        println!(
            "WARNING: found {} category directories, expected {}",
            stats.category_count(),
            stats.expected_categories
        );
    }

    let empty = stats.empty_categories();
    if !empty.is_empty() {
        println!("WARNING: categories without articles: {}", empty.join(", "));
    }
}
