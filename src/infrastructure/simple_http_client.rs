//! HTTP page fetcher for listing pages
//!
//! The scrape pipeline only depends on the [`PageFetcher`] capability; the
//! reqwest-backed [`HttpClient`] is the production implementation and tests
//! substitute their own doubles. No retries are attempted: a transport
//! failure or a non-success status is terminal for the task.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::infrastructure::config::HttpConfig;

/// Fetch-stage failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// DNS, connection, timeout or body read failure
    #[error("getting url {url}: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status
    #[error("status code error: {code} {reason} ({url})")]
    Status {
        url: String,
        code: u16,
        reason: String,
    },
}

impl FetchError {
    pub fn transport(url: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// Status code for `Status` failures
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            Self::Transport { .. } => None,
        }
    }
}

/// Capability to retrieve the raw body of a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Return the full response body, only for a success status
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Whether to follow redirects
    pub follow_redirects: bool,
}

impl HttpClientConfig {
    /// Create HttpClientConfig from the `[http]` config section
    pub fn from_http_config(http: &HttpConfig) -> Self {
        Self {
            timeout_seconds: http.request_timeout_seconds,
            user_agent: http.user_agent.clone(),
            follow_redirects: http.follow_redirects,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_http_config(&HttpConfig::default())
    }
}

/// reqwest-backed page fetcher
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client from the `[http]` config section
    pub fn from_http_config(http: &HttpConfig) -> Result<Self, FetchError> {
        Self::with_config(HttpClientConfig::from_http_config(http))
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| FetchError::transport("<client>", format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Single GET; the response is consumed or dropped before returning
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        info!("🌐 HTTP GET: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!("❌ HTTP error {}: {}", status, url);
            return Err(FetchError::Status {
                url: url.to_string(),
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(url, format!("reading body: {e}")))?;

        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch_bytes(url).await
    }
}
