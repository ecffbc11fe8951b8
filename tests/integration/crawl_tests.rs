//! End-to-end crawls against a mock portal

use crate::portal::{
    article_html, category_path, listing_html, mount_article, mount_html, mount_portal,
    mount_slow_html, mount_status, nav_html, test_config, CATEGORY_NAMES,
};
use news_harvester::crawler::{ExtractError, Fetcher, PaginationWalker};
use news_harvester::model::{title_key, Article, Category};
use news_harvester::storage::{ArticleStore, JsonFileStore, PersistOutcome, StorageResult};
use news_harvester::{Coordinator, HarvestError};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

fn coordinator(server: &MockServer, data_root: &TempDir) -> (Coordinator, JsonFileStore) {
    let config = test_config(&server.uri(), data_root.path());
    let store = JsonFileStore::new(data_root.path());
    let coordinator = Coordinator::with_store(config, Arc::new(store.clone())).unwrap();
    (coordinator, store)
}

#[tokio::test]
async fn test_full_crawl_with_paginated_category() {
    let server = MockServer::start().await;
    mount_portal(&server, &["Sports"]).await;

    let mut first_page = Vec::new();
    for (id, title) in [("s1", "Cup final"), ("s2", "Transfer news"), ("s3", "Derby")] {
        first_page.push(mount_article(&server, id, title).await);
    }
    let last_page = vec![mount_article(&server, "s4", "Season review").await];

    let sports = category_path("Sports");
    mount_html(&server, &sports, listing_html(&first_page, Some("/page/2"))).await;
    mount_html(
        &server,
        &format!("{}/page/2", sports),
        listing_html(&last_page, None),
    )
    .await;

    let data_root = TempDir::new().unwrap();
    let (coordinator, store) = coordinator(&server, &data_root);

    let report = coordinator.run().await.unwrap();

    assert!(report.is_success(), "failures: {:?}", report.summary.category_failures);
    assert_eq!(report.articles.len(), 4);
    assert!(report.articles.iter().all(|a| a.category == "Sports"));

    let titles: Vec<&str> = report.articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Cup final", "Transfer news", "Derby", "Season review"]);

    assert_eq!(store.count("Sports").unwrap(), 4);
    assert!(store.load("Sports", &title_key("Season review")).is_ok());

    let mut expected_dirs: Vec<String> = CATEGORY_NAMES.iter().map(|s| s.to_string()).collect();
    expected_dirs.sort();
    assert_eq!(store.list_categories().unwrap(), expected_dirs);

    let summary = &report.summary;
    assert_eq!(summary.categories_discovered, 8);
    assert_eq!(summary.categories_completed, 8);
    assert_eq!(summary.articles_scraped, 4);
    assert_eq!(summary.articles_persisted, 4);
    assert_eq!(summary.pages_walked, 9);
    assert!(summary.finished_at.is_some());
}

#[tokio::test]
async fn test_stored_document_matches_article() {
    let server = MockServer::start().await;
    mount_portal(&server, &["IT"]).await;
    let article = mount_article(&server, "it1", "新しい端末").await;
    mount_html(&server, &category_path("IT"), listing_html(&[article], None)).await;

    let data_root = TempDir::new().unwrap();
    let (coordinator, store) = coordinator(&server, &data_root);
    let report = coordinator.run().await.unwrap();

    let scraped = &report.articles[0];
    assert_eq!(scraped.content, "新しい端末 opens.\n\nIt ends.");
    assert!(scraped.html.contains("<h1>新しい端末</h1>"));

    let loaded = store.load("IT", &title_key("新しい端末")).unwrap();
    assert_eq!(&loaded, scraped);
}

#[tokio::test]
async fn test_walker_follows_pages_in_order() {
    let server = MockServer::start().await;

    let a = vec![
        mount_article(&server, "a1", "First").await,
        mount_article(&server, "a2", "Second").await,
    ];
    let c = vec![mount_article(&server, "c1", "Third").await];

    mount_html(&server, "/world", listing_html(&a, Some("/b"))).await;
    mount_html(&server, "/world/b", listing_html(&[], Some("/c"))).await;
    mount_html(&server, "/world/b/c", listing_html(&c, None)).await;

    let data_root = TempDir::new().unwrap();
    let config = test_config(&server.uri(), data_root.path());
    let fetcher = Fetcher::from_config(&config.user_agent, &config.fetch).unwrap();
    let walker = PaginationWalker::new(fetcher, 2, CancellationToken::new());

    let mut handle = walker.walk(Category::new(format!("{}/world", server.uri()), "World"));
    let mut titles = Vec::new();
    while let Some(article) = handle.articles.recv().await {
        assert_eq!(article.category, "World");
        titles.push(article.title);
    }
    let (report, result) = handle.task.await.unwrap();

    assert!(result.is_ok());
    assert_eq!(titles, vec!["First", "Second", "Third"]);
    assert_eq!(report.pages_walked, 3);
    assert_eq!(report.articles_scraped, 3);
}

#[tokio::test]
async fn test_walker_stops_when_pager_loops() {
    let server = MockServer::start().await;
    mount_html(&server, "/loop", listing_html(&[], Some(""))).await;

    let data_root = TempDir::new().unwrap();
    let config = test_config(&server.uri(), data_root.path());
    let fetcher = Fetcher::from_config(&config.user_agent, &config.fetch).unwrap();
    let walker = PaginationWalker::new(fetcher, 1, CancellationToken::new());

    let handle = walker.walk(Category::new(format!("{}/loop", server.uri()), "Loop"));
    let (report, result) = handle.task.await.unwrap();

    assert!(result.is_ok());
    assert_eq!(report.pages_walked, 1);
}

#[tokio::test]
async fn test_wrong_category_count_aborts_crawl() {
    let server = MockServer::start().await;
    mount_html(&server, "/", nav_html(&CATEGORY_NAMES[..7])).await;

    let data_root = TempDir::new().unwrap();
    let (coordinator, store) = coordinator(&server, &data_root);

    let result = coordinator.run().await;

    assert!(matches!(
        result,
        Err(HarvestError::Extract {
            source: ExtractError::CategoryCount {
                expected: 8,
                found: 7
            },
            ..
        })
    ));
    assert!(store.list_categories().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_portal_aborts_crawl() {
    let server = MockServer::start().await;
    mount_status(&server, "/", 404).await;

    let data_root = TempDir::new().unwrap();
    let (coordinator, _) = coordinator(&server, &data_root);

    assert!(matches!(coordinator.run().await, Err(HarvestError::Fetch(_))));
}

#[tokio::test]
async fn test_missing_article_is_skipped() {
    let server = MockServer::start().await;
    mount_portal(&server, &["Funny"]).await;

    let kept = mount_article(&server, "f1", "Cat video").await;
    mount_status(&server, "/articles/gone", 404).await;
    mount_html(
        &server,
        &category_path("Funny"),
        listing_html(&["/articles/gone".to_string(), kept], None),
    )
    .await;

    let data_root = TempDir::new().unwrap();
    let (coordinator, store) = coordinator(&server, &data_root);
    let report = coordinator.run().await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.articles.len(), 1);
    assert_eq!(report.articles[0].title, "Cat video");
    assert_eq!(report.summary.articles_failed, 1);
    assert_eq!(store.count("Funny").unwrap(), 1);
}

#[tokio::test]
async fn test_failed_listing_fails_category() {
    let server = MockServer::start().await;
    mount_portal(&server, &["World"]).await;
    mount_status(&server, &category_path("World"), 500).await;

    let data_root = TempDir::new().unwrap();
    let (coordinator, store) = coordinator(&server, &data_root);
    let report = coordinator.run().await.unwrap();

    assert!(!report.is_success());
    assert!(report
        .summary
        .category_failures
        .iter()
        .any(|failure| failure.category == "World"));

    let stored: usize = CATEGORY_NAMES
        .iter()
        .map(|name| store.count(name).unwrap())
        .sum();
    assert_eq!(stored, report.articles.len());
}

#[tokio::test]
async fn test_failed_category_cancels_the_others() {
    let server = MockServer::start().await;
    mount_html(&server, "/", nav_html(&CATEGORY_NAMES)).await;
    mount_status(&server, &category_path("World"), 500).await;
    for name in CATEGORY_NAMES.iter().filter(|name| **name != "World") {
        mount_slow_html(
            &server,
            &category_path(name),
            listing_html(&[], None),
            Duration::from_secs(3),
        )
        .await;
    }

    let data_root = TempDir::new().unwrap();
    let (coordinator, _) = coordinator(&server, &data_root);
    let report = coordinator.run().await.unwrap();

    let summary = &report.summary;
    assert_eq!(summary.categories_completed, 0);
    assert_eq!(summary.category_failures.len(), 8);
    for failure in &summary.category_failures {
        if failure.category == "World" {
            assert!(failure.error.contains("500"), "unexpected error: {}", failure.error);
        } else {
            assert_eq!(failure.error, HarvestError::Cancelled.to_string());
        }
    }
}

#[tokio::test]
async fn test_heading_without_text_is_kept() {
    let server = MockServer::start().await;
    mount_portal(&server, &["Sports"]).await;
    mount_html(
        &server,
        "/articles/logo",
        r#"<html><body><h1><a href="/"><img src="/logo.png"></a></h1><div class="article"><p>Body</p></div></body></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &server,
        &category_path("Sports"),
        listing_html(&["/articles/logo".to_string()], None),
    )
    .await;

    let data_root = TempDir::new().unwrap();
    let (coordinator, store) = coordinator(&server, &data_root);
    let report = coordinator.run().await.unwrap();

    assert!(report.is_success(), "failures: {:?}", report.summary.category_failures);
    assert_eq!(report.articles.len(), 1);
    assert_eq!(report.articles[0].title, "");
    assert_eq!(store.load("Sports", &title_key("")).unwrap().content, "Body");
}

#[tokio::test]
async fn test_title_whitespace_is_part_of_the_key() {
    let server = MockServer::start().await;
    mount_portal(&server, &["Columns"]).await;
    mount_html(
        &server,
        "/articles/spaced",
        article_html("\n  Weekly column \n", &["Text."]),
    )
    .await;
    mount_html(
        &server,
        &category_path("Columns"),
        listing_html(&["/articles/spaced".to_string()], None),
    )
    .await;

    let data_root = TempDir::new().unwrap();
    let (coordinator, store) = coordinator(&server, &data_root);
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.articles[0].title, "\n  Weekly column \n");
    assert_eq!(
        store.list_keys("Columns").unwrap(),
        vec![title_key("\n  Weekly column \n")]
    );
}

/// Delegates to a JSON store, remembering the thread each write ran on
struct ThreadRecordingStore {
    inner: JsonFileStore,
    writer_threads: Mutex<Vec<ThreadId>>,
}

impl ArticleStore for ThreadRecordingStore {
    fn prepare_category(&self, category: &str) -> StorageResult<()> {
        self.inner.prepare_category(category)
    }

    fn persist(&self, article: &Article) -> StorageResult<PersistOutcome> {
        self.writer_threads
            .lock()
            .unwrap()
            .push(std::thread::current().id());
        self.inner.persist(article)
    }

    fn load(&self, category: &str, key: &str) -> StorageResult<Article> {
        self.inner.load(category, key)
    }

    fn list_categories(&self) -> StorageResult<Vec<String>> {
        self.inner.list_categories()
    }

    fn list_keys(&self, category: &str) -> StorageResult<Vec<String>> {
        self.inner.list_keys(category)
    }
}

#[tokio::test]
async fn test_writes_run_off_the_runtime_thread() {
    let server = MockServer::start().await;
    mount_portal(&server, &["Domestic"]).await;
    let article = mount_article(&server, "d1", "Budget passed").await;
    mount_html(&server, &category_path("Domestic"), listing_html(&[article], None)).await;

    let data_root = TempDir::new().unwrap();
    let store = Arc::new(ThreadRecordingStore {
        inner: JsonFileStore::new(data_root.path()),
        writer_threads: Mutex::new(Vec::new()),
    });
    let config = test_config(&server.uri(), data_root.path());
    let coordinator = Coordinator::with_store(config, store.clone()).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.summary.articles_persisted, 1);
    let writer_threads = store.writer_threads.lock().unwrap();
    assert_eq!(writer_threads.len(), 1);
    assert_ne!(writer_threads[0], std::thread::current().id());
}

#[tokio::test]
async fn test_unexpected_article_markup_fails_category() {
    let server = MockServer::start().await;
    mount_portal(&server, &["Gourmet"]).await;
    mount_html(
        &server,
        "/articles/broken",
        "<html><body><p>no heading</p></body></html>".to_string(),
    )
    .await;
    mount_html(
        &server,
        &category_path("Gourmet"),
        listing_html(&["/articles/broken".to_string()], None),
    )
    .await;

    let data_root = TempDir::new().unwrap();
    let (coordinator, _) = coordinator(&server, &data_root);
    let report = coordinator.run().await.unwrap();

    let failure = report
        .summary
        .category_failures
        .iter()
        .find(|failure| failure.category == "Gourmet")
        .expect("Gourmet should have failed");
    assert!(failure.error.contains("h1"), "unexpected error: {}", failure.error);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let server = MockServer::start().await;
    mount_portal(&server, &[]).await;

    let data_root = TempDir::new().unwrap();
    let (coordinator, _) = coordinator(&server, &data_root);
    coordinator.cancel_token().cancel();

    assert!(matches!(coordinator.run().await, Err(HarvestError::Cancelled)));
}
