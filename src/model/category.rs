use serde::{Deserialize, Serialize};
use std::fmt;

/// A top-level section of the portal, pointing at one of its listing pages
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// Listing page URL (the first page on discovery, later pages while walking)
    pub url: String,

    /// Display name, also used as the category's storage directory
    pub name: String,
}

impl Category {
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }

    /// Returns a category with the same name pointing at another listing page
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}
