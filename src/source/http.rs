//! HTTP item source backed by a summary endpoint
//!
//! Requests `GET {base_url}/summary?uri=<source id>` and expects a JSON
//! [`FeedSummary`] in return. Transient failures (timeouts, 429 and 5xx) are
//! retried with exponential backoff; any other non-success status fails
//! immediately with the response text as the message.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use std::time::Duration;
use url::Url;

use super::error::FetchError;
use super::ItemSource;
use crate::config::SourceConfig;
use crate::models::FeedSummary;

/// Upper bound for a single backoff delay
const MAX_BACKOFF_MS: u64 = 30_000;

/// Item source that asks a remote summary endpoint
#[derive(Debug, Clone)]
pub struct HttpItemSource {
    /// HTTP client with configured timeout and user agent
    client: Client,

    /// Endpoint base, without the trailing `/summary`
    base_url: Url,

    /// Maximum number of retry attempts for transient failures
    max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    base_delay_ms: u64,
}

impl HttpItemSource {
    /// Create a source for `base_url` with default settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if `base_url` does not parse, or
    /// `FetchError::Http` if the HTTP client cannot be created
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::from_config(&SourceConfig {
            base_url: base_url.to_string(),
            ..SourceConfig::default()
        })
    }

    /// Create a source from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the configured base URL does not
    /// parse, or `FetchError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &SourceConfig) -> Result<Self, FetchError> {
        // A trailing slash keeps `join` from replacing the last path segment
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url =
            Url::parse(&base).map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            max_retries: config.max_retries,
            base_delay_ms: 500,
        })
    }

    /// Override the backoff base delay
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay_ms = delay.as_millis() as u64;
        self
    }

    /// URL of the summary request for `source_id`
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the endpoint path cannot be joined
    pub fn summary_url(&self, source_id: &str) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join("summary")
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("uri", source_id);
        Ok(url)
    }

    /// Delay before retry `attempt` (1-based), doubling up to [`MAX_BACKOFF_MS`]
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u64.checked_pow(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor).min(MAX_BACKOFF_MS))
    }

    async fn fetch_with_retry(&self, url: Url) -> Result<FeedSummary, FetchError> {
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = self.backoff(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying summary request"
                );
                tokio::time::sleep(delay).await;
            }

            let result = self
                .client
                .get(url.clone())
                .header(header::ACCEPT, "application/json")
                .send()
                .await;

            let error = match result {
                Ok(response) if response.status().is_success() => {
                    return Self::decode(response).await;
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    FetchError::status(status, body)
                }
                Err(e) => FetchError::Http(e),
            };

            if !error.is_recoverable() || attempt >= self.max_retries {
                return Err(error);
            }
            tracing::warn!(error = %error, attempt, "Summary request failed");
            attempt += 1;
        }
    }

    async fn decode(response: Response) -> Result<FeedSummary, FetchError> {
        let bytes = response.bytes().await?;
        let summary: FeedSummary =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(summary.sorted())
    }
}

#[async_trait]
impl ItemSource for HttpItemSource {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch(&self, source_id: &str) -> Result<FeedSummary, FetchError> {
        let source_id = source_id.trim();
        if source_id.is_empty() {
            return Err(FetchError::MissingSource);
        }

        let url = self.summary_url(source_id)?;
        let mut summary = self.fetch_with_retry(url).await?;
        if summary.source_id.is_empty() {
            summary.source_id = source_id.to_string();
        }

        tracing::debug!(items = summary.len(), title = %summary.title, "Fetched summary");
        Ok(summary)
    }
}
