//! Comment service.
//!
//! Validates submissions and runs them through the content filter before
//! they reach the store.

use std::sync::Arc;

use tracing::info;

use super::repository::CommentRepository;
use super::types::{Comment, NewComment};
use crate::db::DbPool;
use crate::filter::ContentFilter;
use crate::news::NewsRepository;
use crate::{NewsError, Result};

/// Comment business logic.
#[derive(Clone)]
pub struct CommentService {
    pool: DbPool,
    filter: Arc<dyn ContentFilter>,
    max_length: usize,
}

impl CommentService {
    pub fn new(pool: DbPool, filter: Arc<dyn ContentFilter>, max_length: usize) -> Self {
        Self {
            pool,
            filter,
            max_length,
        }
    }

    /// Comments of a news item, oldest first.
    pub async fn list(&self, news_id: i64) -> Result<Vec<Comment>> {
        if news_id < 1 {
            return Err(NewsError::invalid(format!("invalid news id: {news_id}")));
        }
        CommentRepository::new(&self.pool).list_by_news(news_id).await
    }

    /// Validate, filter and store a comment.
    ///
    /// A filter that cannot answer fails the request with
    /// [`NewsError::Filter`]; refused text is [`NewsError::Rejected`].
    pub async fn add(&self, mut comment: NewComment) -> Result<Comment> {
        comment.content = comment.content.trim().to_string();
        self.validate(&comment)?;

        if NewsRepository::new(&self.pool)
            .get_by_id(comment.news_id)
            .await?
            .is_none()
        {
            return Err(NewsError::NotFound("news item".to_string()));
        }

        let repo = CommentRepository::new(&self.pool);
        if let Some(parent_id) = comment.parent_id {
            match repo.get_by_id(parent_id).await? {
                Some(parent) if parent.news_id == comment.news_id => {}
                Some(_) => {
                    return Err(NewsError::Validation(
                        "parent comment belongs to another news item".to_string(),
                    ))
                }
                None => return Err(NewsError::NotFound("parent comment".to_string())),
            }
        }

        if !self.filter.is_allowed(&comment.content).await? {
            return Err(NewsError::Rejected(
                "comment contains forbidden words".to_string(),
            ));
        }

        let created = repo.create(&comment).await?;
        info!("Comment {} added to news {}", created.id, created.news_id);
        Ok(created)
    }

    /// Delete a comment together with its replies.
    pub async fn delete(&self, id: i64) -> Result<()> {
        if id < 1 {
            return Err(NewsError::invalid(format!("invalid comment id: {id}")));
        }
        if !CommentRepository::new(&self.pool).delete(id).await? {
            return Err(NewsError::NotFound("comment".to_string()));
        }
        info!("Comment {} deleted", id);
        Ok(())
    }

    fn validate(&self, comment: &NewComment) -> Result<()> {
        if comment.news_id < 1 {
            return Err(NewsError::invalid(format!(
                "invalid news id: {}",
                comment.news_id
            )));
        }
        if comment.content.is_empty() {
            return Err(NewsError::Validation("comment is empty".to_string()));
        }
        if comment.content.chars().count() > self.max_length {
            return Err(NewsError::Validation(format!(
                "comment exceeds {} characters",
                self.max_length
            )));
        }
        if comment
            .content
            .chars()
            .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
        {
            return Err(NewsError::Validation(
                "comment contains control characters".to_string(),
            ));
        }
        Ok(())
    }
}
