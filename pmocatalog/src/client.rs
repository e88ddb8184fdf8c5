//! HTTP client for the catalog API
//!
//! Every request carries `Authorization: Bearer: <token>`. The colon after
//! `Bearer` is what the catalog backend expects and must be kept as is.

use crate::error::{Error, Result};
use crate::models::CatalogItem;
use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default timeout for catalog requests (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Authenticated catalog client
///
/// Stateless: no response is cached. Cloning is cheap and shares the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl CatalogClient {
    /// Create a client with a fresh default transport
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url, token))
    }

    /// Create a client on top of an existing reqwest::Client
    ///
    /// This is how the bridge injects its transport carrying the extra
    /// trusted CAs.
    pub fn with_client(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticated GET on `<base_url><path>`, returning the raw body
    ///
    /// Network errors, timeouts and non-2xx statuses are returned as is,
    /// without retry.
    pub async fn fetch(&self, path: &str) -> Result<Bytes> {
        let url = Url::parse(&format!("{}{}", self.base_url, path))?;
        debug!(%url, "catalog fetch");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer: {}", self.token))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }

        Ok(response.bytes().await?)
    }

    /// Children of `id`, in catalog order
    pub async fn browse_children(&self, id: &str) -> Result<Vec<CatalogItem>> {
        let body = self.fetch(&format!("/browse?id={}", encode(id))).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Single record `id`
    pub async fn fetch_object(&self, id: &str) -> Result<CatalogItem> {
        match self.fetch(&format!("/object?id={}", encode(id))).await {
            Err(Error::Status(StatusCode::NOT_FOUND)) => Err(Error::NotFound(id.to_string())),
            Err(e) => Err(e),
            Ok(body) => Ok(serde_json::from_slice(&body)?),
        }
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
