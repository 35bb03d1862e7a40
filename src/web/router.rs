//! Router configuration for the HTTP API.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::handlers::{
    add_comment, delete_comment, latest_news, list_comments, news_detail, recent_news, AppState,
};
use super::middleware::{create_cors_layer, request_id};

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let news_routes = Router::new()
        .route("/latest", get(latest_news))
        .route("/detailed", get(news_detail))
        .route("/:n", get(recent_news));

    let comment_routes = Router::new()
        .route("/add", post(add_comment))
        .route("/del", delete(delete_comment));

    Router::new()
        .nest("/news", news_routes)
        .route("/comments", get(list_comments))
        .nest("/comments", comment_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id))
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Serve the web application from `static_path`, falling back to its
/// `index.html`. Returns `None` when the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let dir = Path::new(static_path);
    if !dir.is_dir() {
        tracing::warn!("Static path {} not found, static files disabled", static_path);
        return None;
    }

    let serve_dir = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
    Some(Router::new().fallback_service(serve_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
        // Should not panic
    }

    #[test]
    fn test_static_router_missing_dir() {
        assert!(create_static_router("/definitely/not/here").is_none());
    }

    #[test]
    fn test_static_router_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(create_static_router(dir.path().to_str().unwrap()).is_some());
    }
}
