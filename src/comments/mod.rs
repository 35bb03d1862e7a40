//! Threaded comments on news items.

mod repository;
mod service;
mod types;

pub use repository::CommentRepository;
pub use service::CommentService;
pub use types::{Comment, NewComment};
