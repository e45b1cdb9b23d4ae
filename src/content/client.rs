//! Content store access
//!
//! `ContentStore` is the seam between page composition and the hosted
//! content API. `ContentfulClient` talks to the Delivery API over HTTP;
//! `MemoryStore` (see `memory.rs`) serves fixtures.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::model::{check_id, Asset, Collection, EntryQuery, RawEntry};
use crate::config::ContentfulConfig;
use crate::error::{Result, SiteError};

const TIMEOUT_SECONDS: u64 = 30;

/// Read-only access to entries and assets
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// List entries matching a content-type filter, in the query's order
    async fn entries(&self, query: &EntryQuery) -> Result<Vec<RawEntry>>;

    /// Fetch a single entry by id
    async fn entry(&self, id: &str) -> Result<RawEntry>;

    /// Fetch a single asset by id
    async fn asset(&self, id: &str) -> Result<Asset>;
}

/// Contentful Delivery API client
pub struct ContentfulClient {
    http_client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ContentfulClient {
    /// Create a client from explicit settings
    pub fn new(config: &ContentfulConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url(),
            token: config.access_token.clone(),
        })
    }

    fn entries_url(&self) -> String {
        format!("{}/entries", self.base_url)
    }

    fn entry_url(&self, id: &str) -> String {
        format!("{}/entries/{}", self.base_url, encode_segment(id))
    }

    fn asset_url(&self, id: &str) -> String {
        format!("{}/assets/{}", self.base_url, encode_segment(id))
    }

    /// JSON GET with bearer authentication; 404 becomes `NotFound(what)`
    async fn fetch_json<T>(&self, url: &str, query: &[(&str, &str)], what: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        tracing::debug!("GET {}", url);
        let response = self
            .http_client
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SiteError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SiteError::Store(format!("HTTP {} from {}: {}", status, url, body)));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ContentStore for ContentfulClient {
    async fn entries(&self, query: &EntryQuery) -> Result<Vec<RawEntry>> {
        let collection: Collection<RawEntry> = self
            .fetch_json(&self.entries_url(), &query.params(), &query.content_type)
            .await?;
        tracing::debug!(
            "Listed {} of {} `{}` entries",
            collection.items.len(),
            collection.total,
            query.content_type
        );
        Ok(collection.items)
    }

    async fn entry(&self, id: &str) -> Result<RawEntry> {
        let id = check_id(id)?;
        self.fetch_json(&self.entry_url(id), &[], id).await
    }

    async fn asset(&self, id: &str) -> Result<Asset> {
        let id = check_id(id)?;
        self.fetch_json(&self.asset_url(id), &[], id).await
    }
}

/// Encode an id as one path segment
fn encode_segment(id: &str) -> String {
    utf8_percent_encode(id, NON_ALPHANUMERIC).to_string()
}
