//! HTTP server for the rendered site

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::FetchTiming;
use crate::error::SiteError;
use crate::pages::{mount, PageSource, SiteComposer};

/// Server state
pub struct ServerState {
    pages: Arc<dyn PageSource>,
    composer: Arc<SiteComposer>,
    static_dir: PathBuf,
}

impl ServerState {
    pub fn new(pages: Arc<dyn PageSource>, composer: Arc<SiteComposer>, static_dir: PathBuf) -> Self {
        Self {
            pages,
            composer,
            static_dir,
        }
    }
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/works") }))
        .route("/works", get(works_handler))
        .route("/posts/:id", get(post_handler))
        .route("/api/works", get(mounted_works_handler))
        .route("/api/auth", get(auth_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(state: ServerState, ip: &str, port: u16) -> Result<()> {
    let timing = state.pages.timing();
    let app = router(Arc::new(state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}/works", ip, port);
    tracing::info!("Serving pages with {:?} fetch timing", timing);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn works_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.pages.works_page().await {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_response(&state.composer, e),
    }
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    match state.pages.post_page(&id).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => error_response(&state.composer, e),
    }
}

/// Data request issued by the post-mount works page; other timings never
/// fetch on the client, so the route does not exist for them
async fn mounted_works_handler(State(state): State<Arc<ServerState>>) -> Response {
    if state.pages.timing() != FetchTiming::Mount {
        return error_response(&state.composer, SiteError::NotFound("/api/works".to_string()));
    }

    let payload = mount::load(&state.composer)
        .await
        .and_then(|final_state| mount::payload(&state.composer, &final_state));

    match payload {
        Ok(payload) => Json(payload).into_response(),
        Err(e) => {
            tracing::error!("Loading works failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "state": "error", "html": "" })),
            )
                .into_response()
        }
    }
}

/// Authentication probe; credentials are checked by the hosting layer
async fn auth_handler() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, r#"Basic realm="Secure Area""#)],
        Json(json!({ "message": "Basic Authentication Required" })),
    )
}

/// Serve static files; anything missing gets the not-found page
async fn fallback_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => {
            error_response(&state.composer, SiteError::NotFound("page".to_string()))
        }
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Map a page error onto the not-found or generic error page
fn error_response(composer: &SiteComposer, err: SiteError) -> Response {
    let (status, page) = if err.is_not_found() {
        tracing::debug!("{}", err);
        (StatusCode::NOT_FOUND, composer.render_not_found())
    } else {
        tracing::error!("Rendering failed: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, composer.render_error())
    };

    match page {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Rendering the {} page failed: {}", status, e);
            (status, status.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryStore;
    use crate::pages::testing::{composer, sample_store};
    use crate::pages::{BuildTimePages, PostMountPages, RequestTimePages};

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn state(pages: Arc<dyn PageSource>, composer: Arc<SiteComposer>) -> Arc<ServerState> {
        Arc::new(ServerState::new(pages, composer, PathBuf::from("does-not-exist")))
    }

    fn request_time(store: MemoryStore) -> Arc<ServerState> {
        let composer = Arc::new(composer(Arc::new(store)));
        state(Arc::new(RequestTimePages::new(composer.clone())), composer)
    }

    #[tokio::test]
    async fn test_auth_probe() {
        let response = auth_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            r#"Basic realm="Secure Area""#
        );
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({ "message": "Basic Authentication Required" }));
    }

    #[tokio::test]
    async fn test_works_page() {
        let response = works_handler(State(request_time(sample_store()))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains(r#"src="https://img/a.png""#));
        assert!(html.contains(r#"src="/images/portfolio_icon1.jpg""#));
    }

    #[tokio::test]
    async fn test_missing_post_is_404() {
        let response = post_handler(
            State(request_time(sample_store())),
            Path("missing".to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("404"));
    }

    #[tokio::test]
    async fn test_build_time_unknown_post_is_404() {
        let store = Arc::new(sample_store());
        let composer = Arc::new(composer(store.clone()));
        let pages = Arc::new(BuildTimePages::build(&composer).await.unwrap());
        let fetched = store.entry_fetches();

        let response = post_handler(State(state(pages, composer)), Path("zzz".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.entry_fetches(), fetched);
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        struct Broken;

        #[async_trait::async_trait]
        impl crate::content::ContentStore for Broken {
            async fn entries(
                &self,
                _query: &crate::content::EntryQuery,
            ) -> crate::error::Result<Vec<crate::content::RawEntry>> {
                Err(SiteError::Store("HTTP 401 Unauthorized".to_string()))
            }
            async fn entry(&self, _id: &str) -> crate::error::Result<crate::content::RawEntry> {
                Err(SiteError::Store("HTTP 401 Unauthorized".to_string()))
            }
            async fn asset(&self, _id: &str) -> crate::error::Result<crate::content::Asset> {
                Err(SiteError::Store("HTTP 401 Unauthorized".to_string()))
            }
        }

        let composer = Arc::new(
            SiteComposer::new(
                crate::config::SiteConfig::default(),
                Arc::new(Broken),
                crate::i18n::I18n::new("ja"),
            )
            .unwrap(),
        );
        let request_state = state(Arc::new(RequestTimePages::new(composer.clone())), composer.clone());

        let response = works_handler(State(request_state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("エラーが発生しました"));

        let mount_state = state(Arc::new(PostMountPages::new(composer.clone())), composer);
        let response = mounted_works_handler(State(mount_state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_works_api_only_under_mount_timing() {
        let store = Arc::new(sample_store());
        let composer = Arc::new(composer(store.clone()));
        let pages = Arc::new(BuildTimePages::build(&composer).await.unwrap());
        let fetched = store.asset_fetches();

        let response = mounted_works_handler(State(state(pages, composer.clone()))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.asset_fetches(), fetched);

        let response = mounted_works_handler(State(state(
            Arc::new(RequestTimePages::new(composer.clone())),
            composer,
        )))
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_mount_flow() {
        let store = Arc::new(sample_store());
        let composer = Arc::new(composer(store.clone()));
        let state = state(Arc::new(PostMountPages::new(composer.clone())), composer);

        let shell = body_string(works_handler(State(state.clone())).await).await;
        assert!(shell.contains(r#"data-state="empty""#));
        assert_eq!(store.asset_fetches(), 0);

        let response = mounted_works_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["state"], "populated");
        assert!(body["html"].as_str().unwrap().contains("https://img/a.png"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found_page() {
        let request = Request::builder()
            .uri("/nothing-here")
            .body(Body::empty())
            .unwrap();
        let response = fallback_handler(State(request_time(sample_store())), request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("ページが見つかりません"));
    }
}
