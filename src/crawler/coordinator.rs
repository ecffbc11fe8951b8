//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the top-level crawl that:
//! - Discovers the portal's categories from its root page
//! - Walks every category on its own task, a bounded number at a time
//! - Persists each article as it arrives and collects the corpus
//! - Cancels all walks when one category fails
//! - Produces the crawl summary

use crate::config::Config;
use crate::crawler::extractor::{parse_categories, resolve_href};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::walker::{PaginationWalker, WalkReport};
use crate::model::{Article, Category};
use crate::output::CrawlSummary;
use crate::storage::{ArticleStore, JsonFileStore, PersistOutcome};
use crate::HarvestError;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Articles buffered between the walkers and the store
const ARTICLE_CHANNEL_CAPACITY: usize = 64;

/// Everything one crawl produced
#[derive(Debug)]
pub struct CrawlReport {
    /// Every article scraped, in arrival order
    pub articles: Vec<Article>,

    /// Counts, timings, and category failures
    pub summary: CrawlSummary,
}

impl CrawlReport {
    /// True when every category was walked to its last page
    pub fn is_success(&self) -> bool {
        self.summary.category_failures.is_empty()
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Fetcher,
    store: Arc<dyn ArticleStore>,
    cancel: CancellationToken,
    config_hash: Option<String>,
}

impl Coordinator {
    /// Creates a coordinator writing into the configured data root
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let store = Arc::new(JsonFileStore::new(&config.output.data_root_dir));
        Self::with_store(config, store)
    }

    /// Creates a coordinator persisting into the given store
    pub fn with_store(config: Config, store: Arc<dyn ArticleStore>) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::from_config(&config.user_agent, &config.fetch)?;
        Ok(Self {
            config: Arc::new(config),
            fetcher,
            store,
            cancel: CancellationToken::new(),
            config_hash: None,
        })
    }

    /// Records the hash of the config file this crawl was started with
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Token that aborts the crawl when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetches the portal root and reads its categories
    ///
    /// Fails unless exactly the configured number of categories is found.
    pub async fn discover_categories(
        &self,
        entry_url: &str,
    ) -> Result<Vec<Category>, HarvestError> {
        let markup = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(HarvestError::Cancelled),
            result = self.fetcher.fetch(entry_url) => result?,
        };

        let categories = parse_categories(&markup, self.config.crawler.expected_categories)
            .map_err(|e| HarvestError::extract(entry_url, e))?;

        Ok(categories
            .into_iter()
            .map(|category| {
                let url = resolve_href(entry_url, &category.url);
                category.with_url(url)
            })
            .collect())
    }

    /// Crawls the configured portal
    pub async fn run(&self) -> Result<CrawlReport, HarvestError> {
        let entry_url = self.config.site.base_url.clone();
        self.crawl_all(&entry_url).await
    }

    /// Crawls every category reachable from `entry_url`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Categories were discovered; the report lists any
    ///   category walks that failed. Articles scraped before a failure are
    ///   already persisted and included.
    /// * `Err(HarvestError)` - Category discovery failed, or a category's
    ///   directory could not be created; nothing was crawled
    pub async fn crawl_all(&self, entry_url: &str) -> Result<CrawlReport, HarvestError> {
        let mut summary = CrawlSummary::new(Utc::now(), self.config_hash.clone());

        tracing::info!("Discovering categories from {}", entry_url);
        let categories = self.discover_categories(entry_url).await?;
        summary.categories_discovered = categories.len();
        for category in &categories {
            tracing::info!("Found category {}", category);
            self.store.prepare_category(&category.name)?;
        }

        let walker = PaginationWalker::new(
            self.fetcher.clone(),
            self.config.crawler.max_concurrent_articles,
            self.cancel.clone(),
        );
        let limit = Arc::new(Semaphore::new(self.config.crawler.max_concurrent_categories));
        let (tx, mut rx) = mpsc::channel::<Article>(ARTICLE_CHANNEL_CAPACITY);

        let mut tasks = JoinSet::new();
        for category in categories {
            let walker = walker.clone();
            let tx = tx.clone();
            let limit = Arc::clone(&limit);
            let cancel = self.cancel.clone();

            tasks.spawn(async move {
                let mut report = WalkReport::new(category.name.clone());
                let result = match limit.acquire_owned().await {
                    Ok(_permit) => walker.walk_into(category, tx, &mut report).await,
                    Err(_) => Err(HarvestError::Cancelled),
                };

                if let Err(e) = &result {
                    if !matches!(e, HarvestError::Cancelled) {
                        tracing::error!("Category {} failed: {}", report.category, e);
                        cancel.cancel();
                    }
                }
                (report, result)
            });
        }
        drop(tx);

        let mut articles = Vec::new();
        while let Some(article) = rx.recv().await {
            self.persist(&article, &mut summary).await;
            articles.push(article);
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((report, Ok(()))) => {
                    summary.record_walk(&report);
                    summary.categories_completed += 1;
                }
                Ok((report, Err(e))) => {
                    summary.record_walk(&report);
                    summary.record_failure(&report.category, &e);
                }
                Err(e) => {
                    let error = HarvestError::Task(e.to_string());
                    tracing::error!("{}", error);
                    summary.record_failure("<unknown>", &error);
                }
            }
        }

        summary.finish(Utc::now());
        tracing::info!(
            "Crawl finished: {} articles from {} categories ({} failed)",
            articles.len(),
            summary.categories_completed,
            summary.category_failures.len()
        );

        Ok(CrawlReport { articles, summary })
    }

    /// Writes one article, recording the outcome without aborting the crawl
    ///
    /// Store writes are filesystem calls, so they run on the blocking pool.
    async fn persist(&self, article: &Article, summary: &mut CrawlSummary) {
        summary.record_article(article);

        let store = Arc::clone(&self.store);
        let document = article.clone();
        let written = tokio::task::spawn_blocking(move || store.persist(&document))
            .await
            .map_err(|e| HarvestError::Task(e.to_string()))
            .and_then(|result| result.map_err(HarvestError::from));

        match written {
            Ok(PersistOutcome::Created(path)) => {
                summary.articles_persisted += 1;
                tracing::debug!("Saved {}", path.display());
            }
            Ok(PersistOutcome::Overwritten(path)) => {
                summary.articles_persisted += 1;
                summary.articles_overwritten += 1;
                tracing::debug!("Overwrote {}", path.display());
            }
            Err(e) => {
                summary.persist_failures += 1;
                tracing::error!("Failed to save \"{}\": {}", article.title, e);
            }
        }
    }
}

/// Runs a complete crawl of the configured portal
///
/// # Example
///
/// ```no_run
/// use news_harvester::config::Config;
/// use news_harvester::crawler::crawl_all;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = crawl_all(Config::default()).await?;
/// println!("{} articles", report.articles.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl_all(config: Config) -> Result<CrawlReport, HarvestError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
