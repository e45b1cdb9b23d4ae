//! Fixture-backed content store for offline preview and tests

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::client::ContentStore;
use super::model::{Asset, EntryQuery, RawEntry};
use crate::error::{Result, SiteError};

/// Fixture file layout: `{ "entries": [...], "assets": [...] }`
#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    entries: Vec<RawEntry>,
    #[serde(default)]
    assets: Vec<Asset>,
}

/// In-memory content store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Vec<RawEntry>,
    assets: HashMap<String, Asset>,
    failing_assets: HashSet<String>,
    entry_fetches: AtomicUsize,
    asset_fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fixture file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let fixture: Fixture = serde_json::from_str(&content)?;
        let mut store = Self::new();
        for entry in fixture.entries {
            store.insert_entry(entry);
        }
        for asset in fixture.assets {
            store.insert_asset(asset);
        }
        tracing::info!(
            "Loaded {} entries and {} assets from {:?}",
            store.entries.len(),
            store.assets.len(),
            path.as_ref()
        );
        Ok(store)
    }

    pub fn insert_entry(&mut self, entry: RawEntry) {
        self.entries.retain(|e| e.sys.id != entry.sys.id);
        self.entries.push(entry);
    }

    pub fn insert_asset(&mut self, asset: Asset) {
        self.assets.insert(asset.sys.id.clone(), asset);
    }

    pub fn with_entry(mut self, entry: RawEntry) -> Self {
        self.insert_entry(entry);
        self
    }

    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.insert_asset(asset);
        self
    }

    /// Make fetches of this asset fail with a store error
    pub fn with_failing_asset(mut self, id: &str) -> Self {
        self.failing_assets.insert(id.to_string());
        self
    }

    /// Number of single-entry fetches served so far
    pub fn entry_fetches(&self) -> usize {
        self.entry_fetches.load(Ordering::SeqCst)
    }

    /// Number of asset fetches served so far
    pub fn asset_fetches(&self) -> usize {
        self.asset_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn entries(&self, query: &EntryQuery) -> Result<Vec<RawEntry>> {
        let mut items: Vec<RawEntry> = self
            .entries
            .iter()
            .filter(|e| e.content_type() == Some(query.content_type.as_str()))
            .cloned()
            .collect();

        match query.order.as_str() {
            "-sys.createdAt" => items.sort_by(|a, b| b.sys.created_at.cmp(&a.sys.created_at)),
            "sys.createdAt" => items.sort_by(|a, b| a.sys.created_at.cmp(&b.sys.created_at)),
            other => tracing::debug!("Ignoring unsupported order {:?}", other),
        }

        Ok(items)
    }

    async fn entry(&self, id: &str) -> Result<RawEntry> {
        self.entry_fetches.fetch_add(1, Ordering::SeqCst);
        self.entries
            .iter()
            .find(|e| e.sys.id == id)
            .cloned()
            .ok_or_else(|| SiteError::NotFound(id.to_string()))
    }

    async fn asset(&self, id: &str) -> Result<Asset> {
        self.asset_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing_assets.contains(id) {
            return Err(SiteError::Store(format!("asset {} unavailable", id)));
        }
        self.assets
            .get(id)
            .cloned()
            .ok_or_else(|| SiteError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Entry builders shared by tests across modules

    use super::*;
    use crate::content::model::{Link, Sys, BLOG, WORK};
    use chrono::{TimeZone, Utc};

    fn sys(id: &str, content_type: &str, minute: u32) -> Sys {
        let at = Utc.with_ymd_and_hms(2023, 5, 30, 1, minute, 0).unwrap();
        Sys {
            id: id.to_string(),
            created_at: Some(at),
            updated_at: Some(at),
            content_type: Some(Link::to(content_type, "ContentType")),
        }
    }

    /// A `work` entry; larger `minute` means newer
    pub fn work(id: &str, name: &str, thumbnail: Option<&str>, minute: u32) -> RawEntry {
        let mut fields = serde_json::json!({
            "name": name,
            "libs": ["Rust"],
            "link": format!("https://example.com/{}", id),
            "description": format!("{} description", name),
        });
        if let Some(asset) = thumbnail {
            fields["thumbnail"] = serde_json::json!({"sys": {"id": asset, "linkType": "Asset"}});
        }
        RawEntry {
            sys: sys(id, WORK, minute),
            fields,
        }
    }

    pub fn post(id: &str, title: &str, markdown: &str, minute: u32) -> RawEntry {
        RawEntry {
            sys: sys(id, BLOG, minute),
            fields: serde_json::json!({
                "title": title,
                "description": format!("About {}", title),
                "tags": ["rust", "web"],
                "markdown": markdown,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{post, work};
    use super::*;
    use crate::content::model::{BLOG, WORK};

    #[tokio::test]
    async fn test_entries_filter_and_order() {
        let store = MemoryStore::new()
            .with_entry(work("old", "Old", None, 1))
            .with_entry(work("new", "New", None, 9))
            .with_entry(post("p1", "Post", "body", 5));

        let works = store.entries(&EntryQuery::newest(WORK)).await.unwrap();
        let ids: Vec<_> = works.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["new", "old"]);

        let posts = store.entries(&EntryQuery::newest(BLOG)).await.unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_entry_and_failing_asset() {
        let store = MemoryStore::new()
            .with_asset(Asset::new("A", "https://img/a.png"))
            .with_failing_asset("B");

        assert!(store.entry("nope").await.unwrap_err().is_not_found());
        assert_eq!(store.asset("A").await.unwrap().url(), "https://img/a.png");
        assert!(matches!(
            store.asset("B").await.unwrap_err(),
            SiteError::Store(_)
        ));
        assert_eq!(store.asset_fetches(), 2);
        assert_eq!(store.entry_fetches(), 1);
    }

    #[test]
    fn test_load_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.json");
        fs::write(
            &path,
            r#"{
                "entries": [{"sys": {"id": "w1", "contentType": {"sys": {"id": "work"}}}, "fields": {"name": "One"}}],
                "assets": [{"sys": {"id": "A"}, "fields": {"file": {"url": "https://img/a.png"}}}]
            }"#,
        )
        .unwrap();

        let store = MemoryStore::load(&path).unwrap();
        assert_eq!(store.entries.len(), 1);
        assert!(store.assets.contains_key("A"));
    }
}
