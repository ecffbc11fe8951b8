//! Article scraping: one article URL in, one [`Article`] out

use crate::crawler::extractor::parse_article_page;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::ExtractError;
use crate::model::Article;
use thiserror::Error;

/// Why a single article could not be scraped
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Unexpected article markup at {url}: {source}")]
    Extract {
        url: String,
        #[source]
        source: ExtractError,
    },
}

/// Fetches an article page and builds its record
///
/// The article is tagged with `category_name`, the category whose listing
/// linked to it; nothing on the article page itself decides its category.
pub async fn scrape_article(
    fetcher: &Fetcher,
    article_url: &str,
    category_name: &str,
) -> Result<Article, ScrapeError> {
    tracing::info!("Scraping article: {}", article_url);

    let html = fetcher.fetch(article_url).await?;
    let (title, content) = parse_article_page(&html).map_err(|source| ScrapeError::Extract {
        url: article_url.to_string(),
        source,
    })?;

    let article = Article {
        html,
        title,
        content,
        category: category_name.to_string(),
    };
    tracing::debug!(
        "Scraped \"{}\" ({} paragraphs) for {}",
        article.title,
        article.paragraph_count(),
        category_name
    );

    Ok(article)
}
