//! External routing-number directory.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

/// Transport-level failure talking to the directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid directory url '{0}'")]
    InvalidUrl(String),
}

/// Raw directory answer. Interpreting it is the resolver's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Search endpoint mapping a bank name to its routing number.
#[async_trait]
pub trait RoutingDirectory: Send + Sync {
    async fn search(&self, bank_name: &str) -> Result<DirectoryReply, DirectoryError>;
}

/// Directory reached over HTTP at `GET {base_url}/search?name=<bank>`.
pub struct HttpDirectory {
    client: Client,
    search_url: Url,
}

impl HttpDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DirectoryError> {
        let invalid = || DirectoryError::InvalidUrl(base_url.to_string());
        let mut search_url = Url::parse(base_url).map_err(|_| invalid())?;
        search_url
            .path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("search");

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, search_url })
    }
}

#[async_trait]
impl RoutingDirectory for HttpDirectory {
    async fn search(&self, bank_name: &str) -> Result<DirectoryReply, DirectoryError> {
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("name", bank_name)])
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await?;

        Ok(DirectoryReply {
            status,
            content_type,
            body,
        })
    }
}
