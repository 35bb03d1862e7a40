//! HTTP API module for newsgate.
//!
//! Serves the news read path (recent, paged listing, title search, detail)
//! and the comment endpoints as JSON over axum.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
