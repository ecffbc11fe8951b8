//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building one HTTP client per crawl with timeouts and a user agent
//! - GET requests returning the page markup
//! - Status code validation
//! - Retry logic for transient failures
//! - Error classification

use crate::config::{FetchConfig, UserAgentConfig};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors from a single page fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Returns true if another attempt may succeed
    ///
    /// | Condition | Retryable |
    /// |-----------|-----------|
    /// | HTTP 5xx | yes |
    /// | HTTP 429 | yes |
    /// | Other non-2xx | no |
    /// | Timeout | yes |
    /// | Connection failure | yes |
    /// | Other request/body errors | no |
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Timeout { .. } | Self::Connect { .. } => true,
            Self::Request { .. } | Self::Body { .. } => false,
        }
    }

    /// The URL the failed request was for
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Request { url, .. }
            | Self::Body { url, .. } => url,
        }
    }

    fn classify(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            Self::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch` - Timeouts for every request made with this client
///
/// # Example
///
/// ```no_run
/// use news_harvester::config::{FetchConfig, UserAgentConfig};
/// use news_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs a single GET and returns the body of a 2xx response
pub async fn fetch_url(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::classify(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    response.text().await.map_err(|e| FetchError::Body {
        url: url.to_string(),
        source: e,
    })
}

/// The crawl's shared HTTP client together with its retry policy
///
/// Built once per crawl and handed to every walker, so all requests share
/// one connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher around an existing client
    pub fn new(client: Client, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_retries,
            retry_delay,
        }
    }

    /// Builds the client and retry policy from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        fetch: &FetchConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, fetch)?;
        Ok(Self::new(
            client,
            fetch.max_retries,
            Duration::from_millis(fetch.retry_delay_ms),
        ))
    }

    /// Fetches a page, retrying retryable failures
    ///
    /// The n-th retry waits `retry_delay * n` before its attempt.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match fetch_url(&self.client, url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Fetch of {} failed ({}), retry {}/{}",
                        url,
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
