//! Request id middleware.
//!
//! Every request gets an id, taken from the `request_id` query parameter or
//! the `x-request-id` header, or generated. The id is stored in the request
//! extensions, attached to the tracing span and echoed in the response.

use std::time::Instant;

use axum::{
    body::Body,
    http::{header::HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Response (and optional request) header carrying the id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Query parameter accepted as the request id.
const REQUEST_ID_PARAM: &str = "request_id";

/// Longest client-supplied id that is kept.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Id of the current request, available as an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

fn from_query(req: &Request<Body>) -> Option<String> {
    let query = req.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == REQUEST_ID_PARAM)
        .map(|(_, value)| value.into_owned())
}

fn from_header(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn is_acceptable(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Assign a request id, then log the request when it completes.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = from_query(&req)
        .or_else(|| from_header(&req))
        .filter(|id| is_acceptable(id))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = req.method().clone();
    let uri = req.uri().clone();
    req.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::info_span!("request", request_id = %id);
    let started = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| {
        tracing::info!(
            method = %method,
            uri = %uri,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
