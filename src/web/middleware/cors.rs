//! CORS middleware configuration.

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use super::request_id::REQUEST_ID_HEADER;

/// Create a CORS layer from configuration.
///
/// An empty (or entirely unparsable) origin list allows any origin.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    let parsed_origins: Vec<HeaderValue> =
        origins.iter().filter_map(|o| o.parse().ok()).collect();

    if parsed_origins.is_empty() {
        return CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(Any)
            .allow_origin(Any)
            .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);
    }

    CorsLayer::new()
        .allow_methods(methods)
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_origin(parsed_origins)
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}
