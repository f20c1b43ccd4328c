//! Remote file download.
//!
//! Shared files live in an external object store and reach the pipeline as plain URLs. The
//! fetcher performs exactly one GET per request, reads the whole body, and refuses to hand back
//! anything produced by a non-2xx response: an error page must never be mistaken for document
//! content.

use crate::config::FetchConfig;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, redirect::Policy};
use std::time::Duration;
use thiserror::Error;

const ERROR_BODY_PREVIEW_CHARS: usize = 200;

/// Errors produced while downloading a remote file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, TLS, timeout, invalid URL, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a status outside the 2xx range.
    #[error("remote server responded with HTTP {status}")]
    UnexpectedStatus {
        /// Status returned by the remote server.
        status: StatusCode,
        /// Leading part of the response body, kept for diagnostics only.
        body: String,
    },
}

/// Raw bytes of a downloaded file, tagged with the status that produced them.
#[derive(Debug, Clone)]
pub struct RawContent {
    /// HTTP status of the successful response.
    pub status: u16,
    /// Complete response body.
    pub bytes: Bytes,
}

/// Source of remote file bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` in full, failing on transport errors and non-2xx statuses.
    async fn fetch(&self, url: &str) -> Result<RawContent, FetchError>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build the shared client from the configured transport options.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent("dropnotes/fetch");
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        if !config.follow_redirects {
            builder = builder.redirect(Policy::none());
        }
        let client = builder.build()?;
        tracing::debug!(
            timeout_ms = ?config.timeout_ms,
            follow_redirects = config.follow_redirects,
            "Initialized file fetcher"
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawContent, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
            tracing::warn!(%status, body = %body, "File download rejected");
            return Err(FetchError::UnexpectedStatus { status, body });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(%status, bytes = bytes.len(), "File downloaded");
        Ok(RawContent {
            status: status.as_u16(),
            bytes,
        })
    }
}
