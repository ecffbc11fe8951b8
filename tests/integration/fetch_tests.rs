//! Fetcher retry and status handling against a mock server

use crate::portal::{mount_html, test_config};
use news_harvester::crawler::{FetchError, Fetcher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Fails with `status` for the first `failures` requests, then serves a page
struct FlakyResponder {
    status: u16,
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl Respond for FlakyResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            ResponseTemplate::new(self.status)
        } else {
            ResponseTemplate::new(200).set_body_string("<html><body>ok</body></html>")
        }
    }
}

async fn mount_flaky(
    server: &MockServer,
    route: &str,
    status: u16,
    failures: usize,
) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(FlakyResponder {
            status,
            failures,
            calls: Arc::clone(&calls),
        })
        .mount(server)
        .await;
    calls
}

fn fetcher(server: &MockServer, max_retries: u32) -> Fetcher {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server.uri(), dir.path());
    config.fetch.max_retries = max_retries;
    Fetcher::from_config(&config.user_agent, &config.fetch).unwrap()
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let server = MockServer::start().await;
    mount_html(&server, "/page", "<p>hello</p>".to_string()).await;

    let body = fetcher(&server, 0)
        .fetch(&format!("{}/page", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, "<p>hello</p>");
}

#[tokio::test]
async fn test_fetch_retries_server_errors() {
    let server = MockServer::start().await;
    let calls = mount_flaky(&server, "/flaky", 503, 1).await;

    let body = fetcher(&server, 2)
        .fetch(&format!("{}/flaky", server.uri()))
        .await
        .unwrap();

    assert!(body.contains("ok"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_fetch_gives_up_after_max_retries() {
    let server = MockServer::start().await;
    let calls = mount_flaky(&server, "/down", 500, usize::MAX).await;

    let result = fetcher(&server, 2)
        .fetch(&format!("{}/down", server.uri()))
        .await;

    match result {
        Err(FetchError::Status { status, .. }) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected status error, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_fetch_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    let calls = mount_flaky(&server, "/missing", 404, usize::MAX).await;

    let result = fetcher(&server, 3)
        .fetch(&format!("{}/missing", server.uri()))
        .await;

    let error = result.unwrap_err();
    assert!(!error.is_retryable());
    assert!(error.url().ends_with("/missing"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_retries_rate_limit() {
    let server = MockServer::start().await;
    let calls = mount_flaky(&server, "/busy", 429, 1).await;

    assert!(fetcher(&server, 1)
        .fetch(&format!("{}/busy", server.uri()))
        .await
        .is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_fetch_sends_user_agent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = test_config(&server.uri(), dir.path());
    let expected = config.user_agent.header_value();

    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", expected.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("matched"))
        .mount(&server)
        .await;

    let fetcher = Fetcher::from_config(&config.user_agent, &config.fetch).unwrap();
    let body = fetcher.fetch(&format!("{}/ua", server.uri())).await.unwrap();
    assert_eq!(body, "matched");
}
