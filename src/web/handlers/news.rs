//! News handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::news::query::page_offset;
use crate::news::{Item, PAGE_SIZE};
use crate::web::dto::{
    parse_id, parse_page, DetailedQuery, LatestQuery, NewsDetailResponse, NewsPageResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /news/:n - The n most recent items.
pub async fn recent_news(
    State(state): State<Arc<AppState>>,
    Path(n): Path<String>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let n: i64 = n
        .parse()
        .map_err(|_| ApiError::bad_request(format!("invalid count: {}", n)))?;

    Ok(Json(state.query.recent(n).await?))
}

/// GET /news/latest?page=P&s=S - One page of the listing, or of a title search.
pub async fn latest_news(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<NewsPageResponse>, ApiError> {
    let page = parse_page(query.page.as_deref())?;

    let result = match query.s.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(needle) => {
            let offset = page_offset(page)?;
            state.query.search(needle, PAGE_SIZE, offset).await?
        }
        None => state.query.listing(page).await?,
    };

    Ok(Json(result.into()))
}

/// GET /news/detailed?id=I - One item with its comments.
pub async fn news_detail(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DetailedQuery>,
) -> Result<Json<NewsDetailResponse>, ApiError> {
    let id = parse_id("id", query.id.as_deref())?;

    let news = state.query.get(id).await?;
    let comments = state.comments.list(id).await?;

    Ok(Json(NewsDetailResponse { news, comments }))
}
