//! Response DTOs for the HTTP API.

use serde::Serialize;

use crate::comments::Comment;
use crate::news::{Item, Page, Pagination};

/// A page of news with its pagination descriptor.
#[derive(Debug, Serialize)]
pub struct NewsPageResponse {
    pub news: Vec<Item>,
    pub pagination: Pagination,
}

impl From<Page> for NewsPageResponse {
    fn from(page: Page) -> Self {
        Self {
            news: page.items,
            pagination: page.pagination,
        }
    }
}

/// One news item with its comments.
#[derive(Debug, Serialize)]
pub struct NewsDetailResponse {
    pub news: Item,
    pub comments: Vec<Comment>,
}

/// Acknowledgement of a deletion.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    #[serde(rename = "ID")]
    pub id: i64,
    pub deleted: bool,
}
