//! Storage module for persisting scraped articles
//!
//! This module handles writing the corpus to disk:
//! - One directory per category under the data root
//! - One pretty-printed JSON document per article, named by title hash
//! - Atomic replacement of documents with the same title
//!
//! ```text
//! data_root/
//! └── Sports/
//!     ├── 0cc175b9c0f1b6a831c399e269772661.json
//!     └── 92eb5ffee6ae2fec3ad71c777531578f.json
//! ```

mod json;
mod traits;

pub use json::JsonFileStore;
pub use traits::{ArticleStore, PersistOutcome, StorageError, StorageResult};

/// File extension of stored article documents
pub const DOCUMENT_EXTENSION: &str = "json";

/// Checks that a category name can be used as a single directory name
///
/// Rejects empty names, `.` and `..`, and names containing path separators
/// or NUL, any of which would place documents outside their category
/// directory.
pub fn validate_category_name(name: &str) -> StorageResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        return Err(StorageError::InvalidCategory(name.to_string()));
    }
    Ok(())
}
