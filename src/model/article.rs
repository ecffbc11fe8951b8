use serde::{Deserialize, Serialize};

/// One scraped article, tagged with the category it was found under
///
/// Field order matches the stored JSON document: `html`, `title`,
/// `content`, `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Raw markup of the article page as fetched
    pub html: String,

    /// Text of the page's first `<h1>`
    pub title: String,

    /// Paragraph texts joined with a blank line (`"\n\n"`)
    pub content: String,

    /// Name of the category whose listing linked to this article
    pub category: String,
}

impl Article {
    /// Identity key of this article: the hex MD5 digest of its title
    pub fn key(&self) -> String {
        title_key(&self.title)
    }

    /// Number of paragraphs in the body
    pub fn paragraph_count(&self) -> usize {
        if self.content.is_empty() {
            0
        } else {
            self.content.split("\n\n").count()
        }
    }
}

/// Computes the storage key for a title
pub fn title_key(title: &str) -> String {
    format!("{:x}", md5::compute(title.as_bytes()))
}
