//! Page composition: content store + thumbnails + Markdown -> HTML pages
//!
//! `SiteComposer` owns the fetch and render steps shared by every page.
//! A `PageSource` decides when those steps run relative to delivery.

pub mod mount;
mod source;

use serde::Serialize;
use std::sync::Arc;
use tera::Context;

use crate::config::SiteConfig;
use crate::content::model::{BLOG, WORK};
use crate::content::{
    BlogFields, ContentStore, Entry, EntryQuery, MarkdownRenderer, ThumbnailResolver, WorkFields,
};
use crate::error::{Result, SiteError};
use crate::helpers::locale_date;
use crate::i18n::I18n;
use crate::templates::TemplateRenderer;

pub use mount::{MountEvent, MountPayload, MountState};
pub use source::{for_timing, BuildTimePages, PageSource, PostMountPages, RequestTimePages};

/// One card of the works listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkCard {
    pub name: String,
    pub image: String,
    pub link: Option<String>,
    pub description: Option<String>,
    pub libs: Vec<String>,
}

/// Result of the "list works" fetch
#[derive(Debug, Clone, PartialEq)]
pub enum WorksView {
    Populated {
        cards: Vec<WorkCard>,
        /// Thumbnails that fell back to the default image after a failed fetch
        failed_thumbnails: usize,
    },
    Empty,
}

impl WorksView {
    pub fn cards(&self) -> &[WorkCard] {
        match self {
            WorksView::Populated { cards, .. } => cards,
            WorksView::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards().is_empty()
    }
}

/// A blog post ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Rendered Markdown body
    pub body: String,
    pub updated_at: Option<String>,
}

/// Fetches content and renders the site's pages
pub struct SiteComposer {
    config: SiteConfig,
    store: Arc<dyn ContentStore>,
    resolver: ThumbnailResolver,
    markdown: MarkdownRenderer,
    templates: TemplateRenderer,
    i18n: I18n,
}

impl SiteComposer {
    pub fn new(config: SiteConfig, store: Arc<dyn ContentStore>, i18n: I18n) -> Result<Self> {
        Ok(Self {
            resolver: ThumbnailResolver::new(store.clone()),
            markdown: MarkdownRenderer::with_theme(config.markdown.clone()),
            templates: TemplateRenderer::new()?,
            config,
            store,
            i18n,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// List works newest first and resolve their thumbnails
    pub async fn works_view(&self) -> Result<WorksView> {
        let raw = self.store.entries(&EntryQuery::newest(WORK)).await?;
        let works = raw
            .iter()
            .map(|e| e.decode::<WorkFields>(WORK))
            .collect::<Result<Vec<_>>>()?;

        let resolution = match self.resolver.resolve(&works).await {
            Ok(resolution) => resolution,
            Err(SiteError::EmptyResult(_)) => {
                tracing::info!("No works to display");
                return Ok(WorksView::Empty);
            }
            Err(e) => return Err(e),
        };

        let cards = works
            .into_iter()
            .map(|work| {
                let image = resolution
                    .links
                    .image_for(work.fields.thumbnail.as_ref(), &self.config.default_thumbnail)
                    .to_string();
                WorkCard {
                    name: work.fields.name,
                    image,
                    link: work.fields.link,
                    description: work.fields.description,
                    libs: work.fields.libs,
                }
            })
            .collect();

        Ok(WorksView::Populated {
            cards,
            failed_thumbnails: resolution.failures.len(),
        })
    }

    /// Fetch one post and render its Markdown body
    pub async fn post_view(&self, id: &str) -> Result<PostView> {
        let raw = self.store.entry(id).await?;
        match raw.content_type() {
            Some(BLOG) | None => {}
            Some(other) => {
                tracing::debug!("Entry {} is a `{}`, not a post", id, other);
                return Err(SiteError::NotFound(id.to_string()));
            }
        }
        let post = raw.decode::<BlogFields>(BLOG)?;
        Ok(self.post_from_entry(post))
    }

    /// Ids of every post, newest first
    pub async fn list_post_ids(&self) -> Result<Vec<String>> {
        let raw = self.store.entries(&EntryQuery::newest(BLOG)).await?;
        Ok(raw.into_iter().map(|e| e.sys.id).collect())
    }

    fn post_from_entry(&self, post: Entry<BlogFields>) -> PostView {
        let updated_at = post
            .sys
            .updated_at
            .or(post.sys.created_at)
            .map(|at| locale_date(&at, &self.config.tz(), self.i18n.language()));

        PostView {
            body: self.markdown.render(&post.fields.markdown),
            id: post.sys.id,
            title: post.fields.title,
            description: post.fields.description,
            tags: post.fields.tags,
            updated_at,
        }
    }

    fn base_context(
        &self,
        title: Option<&str>,
        description: Option<&str>,
        keywords: &[String],
    ) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.config);
        context.insert("lang", self.i18n.language());
        context.insert("t", &self.i18n.catalog());
        context.insert("page_title", &title);
        context.insert("page_description", &description.unwrap_or(&self.config.description));
        context.insert("keywords", keywords);
        context
    }

    fn works_context(&self) -> Context {
        self.base_context(
            Some(self.i18n.get("works.title").as_str()),
            Some(self.i18n.get("works.description").as_str()),
            &[],
        )
    }

    /// Full works page; an empty view renders the empty-state message
    pub fn render_works(&self, view: &WorksView) -> Result<String> {
        let mut context = self.works_context();
        context.insert("works", view.cards());
        self.templates.render("works.html", &context)
    }

    /// Works grid fragment, swapped into the post-mount shell
    pub fn render_works_grid(&self, view: &WorksView) -> Result<String> {
        let mut context = self.works_context();
        context.insert("works", view.cards());
        self.templates.render("partials/works_grid.html", &context)
    }

    /// Works page shell in its initial empty state
    pub fn render_works_shell(&self) -> Result<String> {
        self.templates.render("works_mount.html", &self.works_context())
    }

    pub fn render_post(&self, post: &PostView) -> Result<String> {
        let mut context =
            self.base_context(Some(post.title.as_str()), post.description.as_deref(), &post.tags);
        context.insert("post", post);
        self.templates.render("post.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        let context = self.base_context(Some(self.i18n.get("site.not_found").as_str()), None, &[]);
        self.templates.render("not_found.html", &context)
    }

    pub fn render_error(&self) -> Result<String> {
        let context = self.base_context(Some(self.i18n.get("site.error").as_str()), None, &[]);
        self.templates.render("error.html", &context)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::content::memory::fixtures::{post, work};
    use crate::content::{Asset, MemoryStore};

    /// Two works (one with thumbnail `A`) and two posts
    pub fn sample_store() -> MemoryStore {
        MemoryStore::new()
            .with_entry(work("w-a", "Alpha", Some("A"), 9))
            .with_entry(work("w-b", "Beta", None, 1))
            .with_asset(Asset::new("A", "https://img/a.png"))
            .with_entry(post("p1", "First post", "# Hi\n\n```go\nfunc main() {}\n```\n", 2))
            .with_entry(post("p2", "Second post", "Use `cargo`.", 3))
    }

    pub fn composer(store: Arc<MemoryStore>) -> SiteComposer {
        SiteComposer::new(SiteConfig::default(), store, I18n::new("ja")).unwrap()
    }
}
