//! JSON file store implementation

use crate::model::{title_key, Article};
use crate::storage::traits::{ArticleStore, PersistOutcome, StorageError, StorageResult};
use crate::storage::{validate_category_name, DOCUMENT_EXTENSION};
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Permission bits of stored documents
#[cfg(unix)]
const DOCUMENT_MODE: u32 = 0o644;

/// Stores each article as `{root}/{category}/{md5(title)}.json`
///
/// Documents are written to a temporary file in the category directory and
/// renamed into place, so readers and concurrent writers of the same key
/// only ever see complete documents. The last rename wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `root`; directories are created on first write
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory holding a category's documents
    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.root.join(category)
    }

    /// Path of the document for `key` in `category`
    pub fn document_path(&self, category: &str, key: &str) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}.{}", key, DOCUMENT_EXTENSION))
    }

    /// Path an article would be stored at
    pub fn path_for(&self, article: &Article) -> PathBuf {
        self.document_path(&article.category, &title_key(&article.title))
    }
}

/// Pretty-prints with four-space indentation, leaving non-ASCII text unescaped
fn to_document(article: &Article) -> StorageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    article.serialize(&mut serializer)?;
    Ok(buf)
}

/// Makes a document readable by other users; temp files start out owner-only
#[cfg(unix)]
fn set_document_permissions(file: &NamedTempFile) -> StorageResult<()> {
    use std::os::unix::fs::PermissionsExt;
    file.as_file()
        .set_permissions(std::fs::Permissions::from_mode(DOCUMENT_MODE))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_document_permissions(_file: &NamedTempFile) -> StorageResult<()> {
    Ok(())
}

/// Sorted names of the entries in `dir` accepted by `select`
fn list_dir<F>(dir: &Path, select: F) -> StorageResult<Vec<String>>
where
    F: Fn(&std::fs::DirEntry) -> Option<String>,
{
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        if let Some(name) = select(&entry?) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

impl ArticleStore for JsonFileStore {
    fn prepare_category(&self, category: &str) -> StorageResult<()> {
        validate_category_name(category)?;
        std::fs::create_dir_all(self.category_dir(category))?;
        Ok(())
    }

    fn persist(&self, article: &Article) -> StorageResult<PersistOutcome> {
        validate_category_name(&article.category)?;

        let dir = self.category_dir(&article.category);
        std::fs::create_dir_all(&dir)?;

        let path = self.path_for(article);
        let existed = path.exists();

        let document = to_document(article)?;
        let mut file = NamedTempFile::new_in(&dir)?;
        file.write_all(&document)?;
        file.flush()?;
        set_document_permissions(&file)?;
        file.persist(&path).map_err(|e| StorageError::Persist {
            path: path.clone(),
            source: e.error,
        })?;

        Ok(if existed {
            PersistOutcome::Overwritten(path)
        } else {
            PersistOutcome::Created(path)
        })
    }

    fn load(&self, category: &str, key: &str) -> StorageResult<Article> {
        validate_category_name(category)?;
        let path = self.document_path(category, key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::NotFound(path)),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    fn list_categories(&self) -> StorageResult<Vec<String>> {
        list_dir(&self.root, |entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                entry.file_name().to_str().map(str::to_string)
            } else {
                None
            }
        })
    }

    fn list_keys(&self, category: &str) -> StorageResult<Vec<String>> {
        validate_category_name(category)?;
        list_dir(&self.category_dir(category), |entry| {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                return None;
            }
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        })
    }
}
