//! Outbound page fetching.

use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::config::FetchConfig;

/// Errors while retrieving a page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
}

/// Retrieves raw HTML with a browser-like user agent and a fixed timeout.
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, timeout })
    }

    /// GET `url` and return the body. Redirects are followed; any final
    /// non-2xx status is an error.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        debug!(url, bytes = body.len(), "page fetched");
        Ok(body)
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Network(e)
        }
    }
}
