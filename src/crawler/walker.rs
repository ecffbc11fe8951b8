//! Pagination walker
//!
//! Walks one category's listing pages in order, scraping the articles each
//! page links to and sending every article down a channel as soon as it is
//! scraped. The walk is an explicit loop over a [`Category`] cursor, so the
//! number of pages a category may have is not bounded by stack depth.
//!
//! Failure policy within a category:
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Listing page fetch fails (after retries) | Walk fails |
//! | Listing page markup unexpected | Walk fails |
//! | Article fetch fails (after retries) | Article skipped, counted |
//! | Article markup unexpected | Walk fails |
//! | Cancellation token fired | Walk fails with `Cancelled` |

use crate::crawler::article::{scrape_article, ScrapeError};
use crate::crawler::extractor::{parse_listing_page, resolve_href};
use crate::crawler::fetcher::Fetcher;
use crate::model::{Article, Category};
use crate::HarvestError;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Progress of one category walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Category name
    pub category: String,

    /// Listing pages fetched
    pub pages_walked: usize,

    /// Articles scraped and handed to the channel
    pub articles_scraped: usize,

    /// Articles skipped because their page could not be fetched
    pub articles_failed: usize,
}

impl WalkReport {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }
}

/// A running walk: the article stream plus the task producing it
pub struct WalkHandle {
    /// Articles in listing order, page after page
    pub articles: mpsc::Receiver<Article>,

    /// Resolves once the last page has been walked
    pub task: JoinHandle<(WalkReport, Result<(), HarvestError>)>,
}

/// Walks category listings page by page
#[derive(Debug, Clone)]
pub struct PaginationWalker {
    fetcher: Fetcher,
    max_concurrent_articles: usize,
    cancel: CancellationToken,
}

impl PaginationWalker {
    /// Creates a walker
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared HTTP fetcher
    /// * `max_concurrent_articles` - Articles of one listing page fetched at once
    /// * `cancel` - Stops the walk at the next request boundary when fired
    pub fn new(
        fetcher: Fetcher,
        max_concurrent_articles: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            max_concurrent_articles: max_concurrent_articles.max(1),
            cancel,
        }
    }

    /// Starts walking `category` on a background task
    ///
    /// Articles arrive on the returned receiver while the walk is still
    /// fetching later pages.
    pub fn walk(&self, category: Category) -> WalkHandle {
        let (tx, rx) = mpsc::channel(self.max_concurrent_articles * 2);
        let walker = self.clone();
        let task = tokio::spawn(async move {
            let mut report = WalkReport::new(category.name.clone());
            let result = walker.walk_into(category, tx, &mut report).await;
            (report, result)
        });
        WalkHandle { articles: rx, task }
    }

    /// Walks `category` to its last page, sending articles into `sink`
    ///
    /// `report` is updated as the walk progresses, so it stays accurate when
    /// the walk fails part way through.
    pub async fn walk_into(
        &self,
        category: Category,
        sink: mpsc::Sender<Article>,
        report: &mut WalkReport,
    ) -> Result<(), HarvestError> {
        let mut cursor = category;
        let mut visited = HashSet::new();

        loop {
            visited.insert(cursor.url.clone());

            let markup = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(HarvestError::Cancelled),
                result = self.fetcher.fetch(&cursor.url) => result?,
            };
            report.pages_walked += 1;

            let page = parse_listing_page(&markup, &cursor.url)
                .map_err(|e| HarvestError::extract(cursor.url.clone(), e))?;
            tracing::info!(
                "{}: listing page {} has {} articles",
                cursor.name,
                report.pages_walked,
                page.article_urls.len()
            );

            let article_urls: Vec<String> = page
                .article_urls
                .iter()
                .map(|href| resolve_href(&cursor.url, href))
                .collect();
            self.scrape_page(&cursor, article_urls, &sink, report).await?;

            // An empty listing page is not the end; only a missing pager is.
            match page.next_page_url {
                Some(next) if visited.contains(&next) => {
                    tracing::warn!(
                        "{}: pager points back to {}, stopping",
                        cursor.name,
                        next
                    );
                    break;
                }
                Some(next) => {
                    tracing::debug!("{}: next listing page {}", cursor.name, next);
                    cursor = cursor.with_url(next);
                }
                None => break,
            }
        }

        tracing::info!(
            "{}: finished after {} pages ({} articles, {} skipped)",
            cursor.name,
            report.pages_walked,
            report.articles_scraped,
            report.articles_failed
        );
        Ok(())
    }

    /// Scrapes the articles of one listing page, preserving page order
    async fn scrape_page(
        &self,
        cursor: &Category,
        article_urls: Vec<String>,
        sink: &mpsc::Sender<Article>,
        report: &mut WalkReport,
    ) -> Result<(), HarvestError> {
        let fetcher = &self.fetcher;
        let category_name = cursor.name.as_str();
        let scrapes = stream::iter(article_urls)
            .map(|url| async move {
                let result = scrape_article(fetcher, &url, category_name).await;
                (url, result)
            })
            .buffered(self.max_concurrent_articles);
        tokio::pin!(scrapes);

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(HarvestError::Cancelled),
                next = scrapes.next() => next,
            };
            let Some((url, result)) = next else {
                break;
            };

            match result {
                Ok(article) => {
                    report.articles_scraped += 1;
                    if sink.send(article).await.is_err() {
                        return Err(HarvestError::Cancelled);
                    }
                }
                Err(ScrapeError::Fetch(e)) => {
                    report.articles_failed += 1;
                    tracing::warn!("Skipping article {}: {}", url, e);
                }
                Err(ScrapeError::Extract { url, source }) => {
                    return Err(HarvestError::extract(url, source));
                }
            }
        }

        Ok(())
    }
}
