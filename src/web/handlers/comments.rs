//! Comment handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::comments::{Comment, NewComment};
use crate::web::dto::{
    parse_id, AddCommentRequest, CommentsQuery, DeleteCommentRequest, DeletedResponse,
    ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /comments?news_id=I - Comments of one item, oldest first.
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CommentsQuery>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let news_id = parse_id("news_id", query.news_id.as_deref())?;
    Ok(Json(state.comments.list(news_id).await?))
}

/// POST /comments/add - Create a comment after the content filter accepts it.
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<AddCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let mut comment = NewComment::new(req.news_id, req.content);
    comment.parent_id = req.parent_id;

    let created = state.comments.add(comment).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /comments/del - Delete a comment and its replies.
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<DeleteCommentRequest>,
) -> Result<Json<DeletedResponse>, ApiError> {
    state.comments.delete(req.id).await?;
    Ok(Json(DeletedResponse {
        id: req.id,
        deleted: true,
    }))
}
