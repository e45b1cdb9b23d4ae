//! folio: a portfolio and blog site rendered from Contentful entries
//!
//! Works and blog posts are fetched from a content store, thumbnails are
//! resolved to image URLs, Markdown bodies are rendered with syntax
//! highlighting, and the resulting pages are served over HTTP or written out
//! as a static snapshot.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod pages;
pub mod server;
pub mod templates;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ContentfulConfig, SiteConfig};
use crate::content::{ContentStore, ContentfulClient, MemoryStore};
use crate::i18n::I18n;
use crate::pages::SiteComposer;

/// The main application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Static assets directory
    pub static_dir: PathBuf,
    /// Language files directory
    pub i18n_dir: PathBuf,
}

impl Folio {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            SiteConfig::load(&config_path)
                .with_context(|| format!("Failed to load {:?}", config_path))?
        } else {
            SiteConfig::default()
        };

        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let i18n_dir = base_dir.join(&config.i18n_dir);

        Ok(Self {
            config,
            base_dir,
            public_dir,
            static_dir,
            i18n_dir,
        })
    }

    /// Open the content store: a fixture file if given, Contentful otherwise.
    ///
    /// Contentful credentials are read here, so a missing variable fails
    /// before anything is served.
    pub fn open_store(&self, fixtures: Option<&Path>) -> Result<Arc<dyn ContentStore>> {
        let store: Arc<dyn ContentStore> = match fixtures {
            Some(path) => Arc::new(
                MemoryStore::load(path)
                    .with_context(|| format!("Failed to load fixtures {:?}", path))?,
            ),
            None => {
                let settings = ContentfulConfig::from_env()?;
                tracing::info!(
                    "Using Contentful space {} ({})",
                    settings.space_id,
                    settings.environment
                );
                Arc::new(ContentfulClient::new(&settings)?)
            }
        };
        Ok(store)
    }

    /// Translations: built-in catalogs plus the site's language files
    pub fn i18n(&self) -> Result<I18n> {
        let mut i18n = I18n::new(&self.config.language);
        i18n.load_languages(&self.i18n_dir)?;
        Ok(i18n)
    }

    /// Page composer over `store`
    pub fn composer(&self, store: Arc<dyn ContentStore>) -> Result<SiteComposer> {
        Ok(SiteComposer::new(self.config.clone(), store, self.i18n()?)?)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
