//! Request DTOs for the HTTP API.

use serde::Deserialize;
use validator::Validate;

/// Query string of `GET /news/latest`.
#[derive(Debug, Default, Deserialize)]
pub struct LatestQuery {
    /// 1-indexed page number, defaults to 1.
    #[serde(default)]
    pub page: Option<String>,
    /// Title substring to search for.
    #[serde(default)]
    pub s: Option<String>,
}

/// Query string of `GET /news/detailed`.
#[derive(Debug, Default, Deserialize)]
pub struct DetailedQuery {
    #[serde(default)]
    pub id: Option<String>,
}

/// Query string of `GET /comments`.
#[derive(Debug, Default, Deserialize)]
pub struct CommentsQuery {
    #[serde(default)]
    pub news_id: Option<String>,
}

/// Body of `POST /comments/add`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[serde(rename = "newsID")]
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub news_id: i64,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    #[serde(rename = "parentID", default)]
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub parent_id: Option<i64>,
}

/// Body of `DELETE /comments/del`.
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteCommentRequest {
    #[serde(rename = "ID")]
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub id: i64,
}
