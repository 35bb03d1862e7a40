//! Middleware for the HTTP layer.

pub mod cors;
pub mod request_id;

pub use cors::create_cors_layer;
pub use request_id::{request_id, RequestId, REQUEST_ID_HEADER};
