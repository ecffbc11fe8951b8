//! Storage traits and error types
//!
//! This module defines the trait interface for article stores and
//! associated error types.

use crate::model::Article;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid category name: {0:?}")]
    InvalidCategory(String),

    #[error("Failed to move document into {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Article not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What [`ArticleStore::persist`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// No document with this key existed; it was created at the path
    Created(PathBuf),

    /// A document with the same key was replaced
    Overwritten(PathBuf),
}

impl PersistOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Created(path) | Self::Overwritten(path) => path,
        }
    }
}

/// Trait for article store implementations
///
/// Articles are identified by `(category, key)` where the key is the MD5
/// digest of the title. Writing an article whose key already exists in its
/// category replaces the earlier document. Implementations must be safe to
/// share between tasks.
pub trait ArticleStore: Send + Sync {
    /// Creates the (possibly still empty) location for a category's articles
    fn prepare_category(&self, category: &str) -> StorageResult<()>;

    /// Writes an article under its category
    fn persist(&self, article: &Article) -> StorageResult<PersistOutcome>;

    /// Reads an article back
    fn load(&self, category: &str, key: &str) -> StorageResult<Article>;

    /// Names of all categories holding at least a directory, sorted
    fn list_categories(&self) -> StorageResult<Vec<String>>;

    /// Keys of every article stored under a category, sorted
    fn list_keys(&self, category: &str) -> StorageResult<Vec<String>>;

    /// Number of articles stored under a category
    fn count(&self, category: &str) -> StorageResult<usize> {
        Ok(self.list_keys(category)?.len())
    }
}
