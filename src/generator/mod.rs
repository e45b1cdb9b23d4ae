//! Generator module - renders the build-time snapshot and writes it to disk

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::model::check_id;
use crate::error::Result;
use crate::helpers::date_xml;
use crate::pages::SiteComposer;

/// Manifest file listing what a snapshot contains
pub const MANIFEST_FILE: &str = "manifest.json";

/// Every page of the site, rendered once
#[derive(Debug, Clone)]
pub struct SiteSnapshot {
    pub works: String,
    /// Post id -> rendered page; the keys are the enumerated id set
    pub posts: BTreeMap<String, String>,
    pub generated_at: DateTime<Utc>,
}

/// Contents of `manifest.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    pub generated_at: String,
    pub post_ids: Vec<String>,
}

impl SiteSnapshot {
    /// List all posts once, then render the works page and every post page
    pub async fn build(composer: &SiteComposer) -> Result<Self> {
        let ids: Vec<String> = composer
            .list_post_ids()
            .await?
            .into_iter()
            .filter(|id| match check_id(id) {
                Ok(_) => true,
                Err(_) => {
                    tracing::warn!("Skipping post with unusable id {:?}", id);
                    false
                }
            })
            .collect();
        tracing::info!("Rendering {} posts", ids.len());

        let pages = try_join_all(ids.iter().map(|id| async move {
            let post = composer.post_view(id).await?;
            let html = composer.render_post(&post)?;
            Ok::<_, crate::error::SiteError>((id.clone(), html))
        }))
        .await?;

        let view = composer.works_view().await?;
        let works = composer.render_works(&view)?;

        Ok(Self {
            works,
            posts: pages.into_iter().collect(),
            generated_at: Utc::now(),
        })
    }

    pub fn manifest(&self) -> BuildManifest {
        BuildManifest {
            generated_at: date_xml(&self.generated_at),
            post_ids: self.posts.keys().cloned().collect(),
        }
    }

    /// Write `works/index.html`, `posts/{id}/index.html` and the manifest
    pub fn write_to(&self, public_dir: &Path) -> Result<()> {
        write_page(&public_dir.join("works").join("index.html"), &self.works)?;

        for (id, html) in &self.posts {
            let id = check_id(id)?;
            write_page(&public_dir.join("posts").join(id).join("index.html"), html)?;
        }

        let manifest = serde_json::to_string_pretty(&self.manifest())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(public_dir.join(MANIFEST_FILE), manifest)?;

        Ok(())
    }
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    tracing::debug!("Generated: {:?}", path);
    Ok(())
}

/// Static site generator
pub struct Generator<'a> {
    composer: &'a SiteComposer,
}

impl<'a> Generator<'a> {
    pub fn new(composer: &'a SiteComposer) -> Self {
        Self { composer }
    }

    /// Render every page into `public_dir` and copy static assets next to them
    pub async fn generate(&self, public_dir: &Path, static_dir: &Path) -> Result<SiteSnapshot> {
        fs::create_dir_all(public_dir)?;

        let snapshot = SiteSnapshot::build(self.composer).await?;
        snapshot.write_to(public_dir)?;
        copy_static_assets(static_dir, public_dir)?;

        Ok(snapshot)
    }
}

/// Copy the static directory (images, css) into the public directory
fn copy_static_assets(static_dir: &Path, public_dir: &Path) -> Result<()> {
    if !static_dir.exists() {
        tracing::debug!("No static directory at {:?}", static_dir);
        return Ok(());
    }

    for entry in WalkDir::new(static_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let relative = match path.strip_prefix(static_dir) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let dest = public_dir.join(relative);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::copy(path, &dest)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::memory::fixtures::post;
    use crate::pages::testing::{composer, sample_store};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_snapshot_enumerates_posts() {
        let composer = composer(Arc::new(sample_store()));
        let snapshot = SiteSnapshot::build(&composer).await.unwrap();
        assert_eq!(
            snapshot.posts.keys().collect::<Vec<_>>(),
            vec!["p1", "p2"]
        );
        assert!(snapshot.works.contains("https://img/a.png"));
        assert_eq!(snapshot.manifest().post_ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_generate_writes_pages_and_assets() {
        let dir = tempfile::tempdir().unwrap();
        let public_dir = dir.path().join("public");
        let static_dir = dir.path().join("static");
        fs::create_dir_all(static_dir.join("images")).unwrap();
        fs::write(static_dir.join("images/portfolio_icon1.jpg"), b"jpg").unwrap();

        let composer = composer(Arc::new(sample_store()));
        Generator::new(&composer)
            .generate(&public_dir, &static_dir)
            .await
            .unwrap();

        assert!(public_dir.join("works/index.html").exists());
        assert!(public_dir.join("posts/p1/index.html").exists());
        assert!(public_dir.join("posts/p2/index.html").exists());
        assert!(public_dir.join("images/portfolio_icon1.jpg").exists());

        let manifest: BuildManifest =
            serde_json::from_str(&fs::read_to_string(public_dir.join(MANIFEST_FILE)).unwrap())
                .unwrap();
        assert_eq!(manifest.post_ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_snapshot_skips_unusable_ids() {
        let store = sample_store().with_entry(post("../escape", "Escape", "body", 7));
        let composer = composer(Arc::new(store));
        let snapshot = SiteSnapshot::build(&composer).await.unwrap();
        assert_eq!(
            snapshot.posts.keys().collect::<Vec<_>>(),
            vec!["p1", "p2"]
        );
    }

    #[test]
    fn test_write_refuses_ids_outside_posts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let public_dir = dir.path().join("public");
        let snapshot = SiteSnapshot {
            works: String::new(),
            posts: BTreeMap::from([("../../outside".to_string(), "<html>".to_string())]),
            generated_at: Utc::now(),
        };

        assert!(snapshot.write_to(&public_dir).unwrap_err().is_not_found());
        assert!(!dir.path().join("outside").exists());
    }
}
