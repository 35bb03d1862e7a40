//! API handlers for the HTTP layer.

pub mod comments;
pub mod news;

pub use comments::*;
pub use news::*;

use std::sync::Arc;

use crate::comments::CommentService;
use crate::db::DbPool;
use crate::filter::ContentFilter;
use crate::news::QueryEngine;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub query: QueryEngine,
    pub comments: CommentService,
}

impl AppState {
    /// Create application state over one connection pool.
    pub fn new(pool: DbPool, filter: Arc<dyn ContentFilter>, comment_max_length: usize) -> Self {
        Self {
            query: QueryEngine::new(pool.clone()),
            comments: CommentService::new(pool, filter, comment_max_length),
        }
    }
}
