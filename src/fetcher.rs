use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::schema::{self, RawFeed};
use crate::xml::ParseError;

/// Errors that can occur while fetching and parsing the feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Body was not a well-formed RSS document
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// Failure reported by another [`FeedSource`] implementation
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err)
        }
    }
}

/// Fetches the feed and parses it into the raw model in one call.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self) -> Result<RawFeed, FetchError>;
}

/// [`FeedSource`] that downloads a single RSS endpoint over HTTP.
pub struct HttpFeedSource {
    client: Client,
    url: String,
    max_body_bytes: usize,
}

impl HttpFeedSource {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            url: config.feed_url.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_bytes(&self) -> Result<Vec<u8>, FetchError> {
        info!(url = %self.url, "Fetching feed");

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        read_limited_bytes(response, self.max_body_bytes).await
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_feed(&self) -> Result<RawFeed, FetchError> {
        let bytes = self.fetch_bytes().await?;
        debug!(url = %self.url, bytes = bytes.len(), "Feed downloaded");
        Ok(schema::parse_feed(&bytes)?)
    }
}

async fn read_limited_bytes(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
