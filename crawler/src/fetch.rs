use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = "sitesearch-bot/0.1";
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unexpected status {status}")]
    Status { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("body of {bytes} bytes exceeds limit")]
    TooLarge { bytes: usize },
}

/// Source of page bodies for the crawler.
#[async_trait]
pub trait Fetcher {
    /// Fetch `url` and return its body; non-success responses are errors.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, max_body_bytes: DEFAULT_MAX_BODY_BYTES })
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let resp = self.client.get(url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status { status: resp.status().as_u16() });
        }
        let bytes = resp.bytes().await?;
        if bytes.len() > self.max_body_bytes {
            return Err(FetchError::TooLarge { bytes: bytes.len() });
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
