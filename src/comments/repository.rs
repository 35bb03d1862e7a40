//! Comment repository.

use chrono::Utc;

use super::types::{Comment, NewComment};
use crate::db::DbPool;
use crate::{NewsError, Result};

/// Row type for a comment from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    news_id: i64,
    parent_id: Option<i64>,
    content: String,
    pub_time: i64,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            news_id: row.news_id,
            parent_id: row.parent_id,
            content: row.content,
            pub_time: row.pub_time,
        }
    }
}

/// Repository for comment CRUD operations.
pub struct CommentRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a comment timestamped now.
    pub async fn create(&self, comment: &NewComment) -> Result<Comment> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (news_id, parent_id, content, pub_time)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(comment.news_id)
        .bind(comment.parent_id)
        .bind(&comment.content)
        .bind(Utc::now().timestamp())
        .fetch_one(self.pool)
        .await
        .map_err(|e| NewsError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| NewsError::NotFound("comment".to_string()))
    }

    /// Get a comment by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            "SELECT id, news_id, parent_id, content, pub_time FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| NewsError::Database(e.to_string()))?;

        Ok(row.map(Comment::from))
    }

    /// List the comments of an item, oldest first.
    pub async fn list_by_news(&self, news_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, news_id, parent_id, content, pub_time
             FROM comments
             WHERE news_id = $1
             ORDER BY pub_time ASC, id ASC",
        )
        .bind(news_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| NewsError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    /// Delete a comment and its replies. Returns false if it did not exist.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| NewsError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
