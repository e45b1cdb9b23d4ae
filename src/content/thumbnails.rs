//! Thumbnail resolution: work entries -> asset id -> file URL

use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::client::ContentStore;
use super::model::{Asset, Entry, Link, WorkFields, WORK};
use crate::error::{Result, SiteError};

/// Asset id -> file URL, built fresh for every render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailMap {
    links: HashMap<String, String>,
}

impl ThumbnailMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// New map containing everything in `self` plus `asset`
    pub fn with_asset(&self, asset: &Asset) -> Self {
        let mut links = self.links.clone();
        links.insert(asset.id().to_string(), asset.url().to_string());
        Self { links }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.links.get(id).map(String::as_str)
    }

    /// Image URL for an entry's thumbnail reference, or `default`
    pub fn image_for<'a>(&'a self, thumbnail: Option<&Link>, default: &'a str) -> &'a str {
        thumbnail
            .and_then(|link| self.get(link.id()))
            .unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Outcome of a complete resolution pass
#[derive(Debug, Default)]
pub struct ThumbnailResolution {
    pub links: ThumbnailMap,
    /// One `SiteError::AssetResolution` per asset that could not be fetched
    pub failures: Vec<SiteError>,
}

impl ThumbnailResolution {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Resolves thumbnail references against a content store
#[derive(Clone)]
pub struct ThumbnailResolver {
    store: Arc<dyn ContentStore>,
}

impl ThumbnailResolver {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Fetch every referenced asset and build the id -> URL map.
    ///
    /// An empty entry list is `EmptyResult`; entries without a thumbnail are
    /// skipped. Asset fetches run concurrently and a failed one never aborts
    /// the rest: it lands in `failures` and its entries use the default image.
    pub async fn resolve(&self, entries: &[Entry<WorkFields>]) -> Result<ThumbnailResolution> {
        if entries.is_empty() {
            return Err(SiteError::EmptyResult(WORK.to_string()));
        }

        let ids = thumbnail_ids(entries);
        if ids.is_empty() {
            tracing::debug!("No thumbnails referenced by {} works", entries.len());
            return Ok(ThumbnailResolution::default());
        }

        let fetches = ids.iter().map(|id| async move {
            let result = self.store.asset(id).await;
            (id.clone(), result)
        });
        let results = join_all(fetches).await;

        let resolution = results.into_iter().fold(
            ThumbnailResolution::default(),
            |mut acc, (id, result)| {
                match result {
                    Ok(asset) => acc.links = acc.links.with_asset(&asset),
                    Err(e) => {
                        tracing::warn!("Thumbnail {} unavailable, using default image: {}", id, e);
                        acc.failures.push(SiteError::AssetResolution {
                            id,
                            reason: e.to_string(),
                        });
                    }
                }
                acc
            },
        );

        tracing::debug!(
            "Resolved {} of {} thumbnails",
            resolution.links.len(),
            ids.len()
        );
        Ok(resolution)
    }
}

/// Unique thumbnail ids referenced by `entries`
pub fn thumbnail_ids(entries: &[Entry<WorkFields>]) -> BTreeSet<String> {
    entries
        .iter()
        .filter_map(|e| e.fields.thumbnail.as_ref())
        .map(|link| link.id().to_string())
        .collect()
}
