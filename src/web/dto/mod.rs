//! Data transfer objects for the HTTP API.

mod request;
mod response;
mod validation;

pub use request::{
    AddCommentRequest, CommentsQuery, DeleteCommentRequest, DetailedQuery, LatestQuery,
};
pub use response::{DeletedResponse, NewsDetailResponse, NewsPageResponse};
pub use validation::{parse_id, parse_page, ValidatedJson};
