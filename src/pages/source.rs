//! Page sources: when content is fetched relative to page delivery

use async_trait::async_trait;
use std::sync::Arc;

use super::SiteComposer;
use crate::config::FetchTiming;
use crate::error::{Result, SiteError};
use crate::generator::SiteSnapshot;

/// Produces the HTML of the site's pages
#[async_trait]
pub trait PageSource: Send + Sync {
    fn timing(&self) -> FetchTiming;

    /// The works listing
    async fn works_page(&self) -> Result<String>;

    /// A post detail page
    async fn post_page(&self, id: &str) -> Result<String>;
}

/// Fetches from the store on every request, before responding
pub struct RequestTimePages {
    composer: Arc<SiteComposer>,
}

impl RequestTimePages {
    pub fn new(composer: Arc<SiteComposer>) -> Self {
        Self { composer }
    }
}

#[async_trait]
impl PageSource for RequestTimePages {
    fn timing(&self) -> FetchTiming {
        FetchTiming::Request
    }

    async fn works_page(&self) -> Result<String> {
        let view = self.composer.works_view().await?;
        self.composer.render_works(&view)
    }

    async fn post_page(&self, id: &str) -> Result<String> {
        let post = self.composer.post_view(id).await?;
        self.composer.render_post(&post)
    }
}

/// Serves a snapshot rendered once up front; never fetches per request
pub struct BuildTimePages {
    snapshot: SiteSnapshot,
}

impl BuildTimePages {
    pub fn new(snapshot: SiteSnapshot) -> Self {
        Self { snapshot }
    }

    /// Render the snapshot now
    pub async fn build(composer: &SiteComposer) -> Result<Self> {
        Ok(Self::new(SiteSnapshot::build(composer).await?))
    }
}

#[async_trait]
impl PageSource for BuildTimePages {
    fn timing(&self) -> FetchTiming {
        FetchTiming::Build
    }

    async fn works_page(&self) -> Result<String> {
        Ok(self.snapshot.works.clone())
    }

    async fn post_page(&self, id: &str) -> Result<String> {
        self.snapshot
            .posts
            .get(id)
            .cloned()
            .ok_or_else(|| SiteError::NotFound(id.to_string()))
    }
}

/// Delivers the works shell immediately; the page fetches `/api/works` itself.
/// Post pages are rendered at request time.
pub struct PostMountPages {
    composer: Arc<SiteComposer>,
}

impl PostMountPages {
    pub fn new(composer: Arc<SiteComposer>) -> Self {
        Self { composer }
    }
}

#[async_trait]
impl PageSource for PostMountPages {
    fn timing(&self) -> FetchTiming {
        FetchTiming::Mount
    }

    async fn works_page(&self) -> Result<String> {
        self.composer.render_works_shell()
    }

    async fn post_page(&self, id: &str) -> Result<String> {
        let post = self.composer.post_view(id).await?;
        self.composer.render_post(&post)
    }
}

/// Build the page source for `timing`
pub async fn for_timing(
    timing: FetchTiming,
    composer: Arc<SiteComposer>,
) -> Result<Arc<dyn PageSource>> {
    let source: Arc<dyn PageSource> = match timing {
        FetchTiming::Request => Arc::new(RequestTimePages::new(composer)),
        FetchTiming::Build => Arc::new(BuildTimePages::build(&composer).await?),
        FetchTiming::Mount => Arc::new(PostMountPages::new(composer)),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryStore;
    use crate::pages::testing::{composer, sample_store};

    #[tokio::test]
    async fn test_request_time_fetches_per_request() {
        let store = Arc::new(sample_store());
        let pages = RequestTimePages::new(Arc::new(composer(store.clone())));

        let html = pages.post_page("p1").await.unwrap();
        assert!(html.contains("First post"));
        pages.post_page("p1").await.unwrap();
        assert_eq!(store.entry_fetches(), 2);

        assert!(pages.post_page("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_request_time_empty_works() {
        let pages = RequestTimePages::new(Arc::new(composer(Arc::new(MemoryStore::new()))));
        let html = pages.works_page().await.unwrap();
        assert!(html.contains("現在、表示できるPortfolioがありません"));
    }

    #[tokio::test]
    async fn test_build_time_unknown_id_is_not_fetched() {
        let store = Arc::new(sample_store());
        let composer = composer(store.clone());
        let pages = BuildTimePages::build(&composer).await.unwrap();
        let fetched = store.entry_fetches();

        assert!(pages.post_page("p2").await.unwrap().contains("Second post"));
        let err = pages.post_page("not-enumerated").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.entry_fetches(), fetched);
    }

    #[tokio::test]
    async fn test_post_mount_shell_is_empty() {
        let store = Arc::new(sample_store());
        let pages = PostMountPages::new(Arc::new(composer(store.clone())));
        let html = pages.works_page().await.unwrap();
        assert!(html.contains(r#"data-state="empty""#));
        assert!(html.contains("/api/works"));
        assert!(!html.contains("https://img/a.png"));
        assert_eq!(store.asset_fetches(), 0);
    }

    #[tokio::test]
    async fn test_for_timing() {
        let composer = Arc::new(composer(Arc::new(sample_store())));
        for timing in [FetchTiming::Request, FetchTiming::Build, FetchTiming::Mount] {
            let source = for_timing(timing, composer.clone()).await.unwrap();
            assert_eq!(source.timing(), timing);
        }
    }
}
