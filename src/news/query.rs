//! Read path over the stored items.

use tracing::debug;

use super::repository::NewsRepository;
use super::types::{Item, Pagination, DEFAULT_RECENT_COUNT, PAGE_SIZE};
use crate::db::DbPool;
use crate::{NewsError, Result};

/// A page of items with its pagination descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    pub pagination: Pagination,
}

/// Query engine for recent items, page listings and title search.
///
/// Holds no state besides the pool; every call is independent.
#[derive(Clone)]
pub struct QueryEngine {
    pool: DbPool,
}

impl QueryEngine {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> NewsRepository<'_> {
        NewsRepository::new(&self.pool)
    }

    /// The `n` most recent items. `n <= 0` means the default of 10.
    pub async fn recent(&self, n: i64) -> Result<Vec<Item>> {
        let n = if n <= 0 { DEFAULT_RECENT_COUNT } else { n };
        self.repo().list(n, 0).await
    }

    /// One page of the full listing. Pages are numbered from 1.
    pub async fn list_page(&self, page: i64) -> Result<Vec<Item>> {
        let offset = page_offset(page)?;
        self.repo().list(PAGE_SIZE, offset).await
    }

    /// One page of the full listing with a pagination descriptor.
    pub async fn listing(&self, page: i64) -> Result<Page> {
        let offset = page_offset(page)?;
        let repo = self.repo();
        let items = repo.list(PAGE_SIZE, offset).await?;
        let total = repo.count().await?;

        Ok(Page {
            items,
            pagination: Pagination::compute(total, PAGE_SIZE, offset)?,
        })
    }

    /// Items whose title contains `needle` (case-insensitive), newest first.
    pub async fn search(&self, needle: &str, limit: i64, offset: i64) -> Result<Page> {
        // Validate before touching the store
        Pagination::compute(0, limit, offset)?;

        let repo = self.repo();
        let items = repo.search(needle, limit, offset).await?;
        let total = repo.search_count(needle).await?;
        debug!("Search {:?}: {} match(es)", needle, total);

        Ok(Page {
            items,
            pagination: Pagination::compute(total, limit, offset)?,
        })
    }

    /// One item by id.
    pub async fn get(&self, id: i64) -> Result<Item> {
        if id < 1 {
            return Err(NewsError::invalid(format!("invalid news id: {id}")));
        }
        self.repo()
            .get_by_id(id)
            .await?
            .ok_or_else(|| NewsError::NotFound("news item".to_string()))
    }
}

/// Row offset of a 1-indexed page.
pub fn page_offset(page: i64) -> Result<i64> {
    if page < 1 {
        return Err(NewsError::invalid(format!("page must be >= 1, got {page}")));
    }
    page.checked_sub(1)
        .and_then(|p| p.checked_mul(PAGE_SIZE))
        .ok_or_else(|| NewsError::invalid(format!("page out of range: {page}")))
}
