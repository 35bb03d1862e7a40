//! News item repository.
//!
//! Every read is ordered by publication time descending, ties broken by id
//! descending, so consecutive pages never overlap for a fixed dataset.

use super::types::{Item, NewItem};
use crate::db::DbPool;
use crate::{NewsError, Result};

const SELECT_COLUMNS: &str = "SELECT id, title, content, pub_time, link FROM news";

const ORDER: &str = "ORDER BY pub_time DESC, id DESC";

#[cfg(feature = "sqlite")]
const TITLE_MATCH: &str = "LOWER(title) LIKE LOWER($1) ESCAPE '\\'";

#[cfg(feature = "postgres")]
const TITLE_MATCH: &str = "title ILIKE $1 ESCAPE '\\'";

/// Row type for a news item from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct NewsRow {
    id: i64,
    title: String,
    content: String,
    pub_time: i64,
    link: String,
}

impl From<NewsRow> for Item {
    fn from(row: NewsRow) -> Self {
        Item {
            id: row.id,
            title: row.title,
            content: row.content,
            pub_time: row.pub_time,
            link: row.link,
        }
    }
}

/// Repository for news items.
pub struct NewsRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> NewsRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert an item unconditionally and return its id.
    pub async fn insert(&self, item: &NewItem) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO news (title, content, pub_time, link) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&item.title)
        .bind(&item.content)
        .bind(item.pub_time)
        .bind(&item.link)
        .fetch_one(self.pool)
        .await
        .map_err(|e| NewsError::Database(e.to_string()))?;

        Ok(id)
    }

    /// Insert an item unless its link is already stored.
    ///
    /// Requires the unique link index. Returns `None` for a duplicate.
    #[cfg(feature = "sqlite")]
    pub async fn insert_or_ignore(&self, item: &NewItem) -> Result<Option<i64>> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO news (title, content, pub_time, link) VALUES ($1, $2, $3, $4)",
        )
        .bind(&item.title)
        .bind(&item.content)
        .bind(item.pub_time)
        .bind(&item.link)
        .execute(self.pool)
        .await
        .map_err(|e| NewsError::Database(e.to_string()))?;

        if result.rows_affected() > 0 {
            Ok(Some(result.last_insert_rowid()))
        } else {
            Ok(None)
        }
    }

    /// Insert an item unless its link is already stored.
    ///
    /// Requires the unique link index. Returns `None` for a duplicate.
    #[cfg(feature = "postgres")]
    pub async fn insert_or_ignore(&self, item: &NewItem) -> Result<Option<i64>> {
        let result: Option<(i64,)> = sqlx::query_as(
            "INSERT INTO news (title, content, pub_time, link) VALUES ($1, $2, $3, $4)
             ON CONFLICT (link) DO NOTHING
             RETURNING id",
        )
        .bind(&item.title)
        .bind(&item.content)
        .bind(item.pub_time)
        .bind(&item.link)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| NewsError::Database(e.to_string()))?;

        Ok(result.map(|(id,)| id))
    }

    /// Get an item by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Item>> {
        let row = sqlx::query_as::<_, NewsRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| NewsError::Database(e.to_string()))?;

        Ok(row.map(Item::from))
    }

    /// List items newest first.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Item>> {
        let rows = sqlx::query_as::<_, NewsRow>(&format!(
            "{SELECT_COLUMNS} {ORDER} LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| NewsError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Count all stored items.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM news")
            .fetch_one(self.pool)
            .await
            .map_err(|e| NewsError::Database(e.to_string()))?;

        Ok(count.0)
    }

    /// List items whose title contains `needle`, ignoring case.
    pub async fn search(&self, needle: &str, limit: i64, offset: i64) -> Result<Vec<Item>> {
        let rows = sqlx::query_as::<_, NewsRow>(&format!(
            "{SELECT_COLUMNS} WHERE {TITLE_MATCH} {ORDER} LIMIT $2 OFFSET $3"
        ))
        .bind(like_pattern(needle))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| NewsError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Count items whose title contains `needle`, ignoring case.
    pub async fn search_count(&self, needle: &str) -> Result<i64> {
        let count: (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM news WHERE {TITLE_MATCH}"))
                .bind(like_pattern(needle))
                .fetch_one(self.pool)
                .await
                .map_err(|e| NewsError::Database(e.to_string()))?;

        Ok(count.0)
    }
}

/// Build a `LIKE` pattern matching `needle` anywhere, with its
/// metacharacters taken literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn item(title: &str, pub_time: i64) -> NewItem {
        NewItem::new(title, format!("https://example.com/{}", pub_time)).with_pub_time(pub_time)
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = setup_db().await;
        let repo = NewsRepository::new(db.pool());

        let id = repo
            .insert(&item("Hello", 100).with_content("Body"))
            .await
            .unwrap();
        assert!(id > 0);

        let stored = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Hello");
        assert_eq!(stored.content, "Body");
        assert_eq!(stored.pub_time, 100);
        assert_eq!(stored.link, "https://example.com/100");

        assert!(repo.get_by_id(id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_accepts_duplicate_links() {
        let db = setup_db().await;
        let repo = NewsRepository::new(db.pool());

        let first = repo.insert(&item("A", 1)).await.unwrap();
        let second = repo.insert(&item("A", 1)).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_or_ignore_with_unique_links() {
        let db = setup_db().await;
        db.enforce_unique_links().await.unwrap();
        let repo = NewsRepository::new(db.pool());

        assert!(repo.insert_or_ignore(&item("A", 1)).await.unwrap().is_some());
        assert!(repo.insert_or_ignore(&item("A", 1)).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let db = setup_db().await;
        let repo = NewsRepository::new(db.pool());

        for t in [30, 10, 20] {
            repo.insert(&item(&format!("t{t}"), t)).await.unwrap();
        }

        let items = repo.list(10, 0).await.unwrap();
        let times: Vec<i64> = items.iter().map(|i| i.pub_time).collect();
        assert_eq!(times, vec![30, 20, 10]);

        let page = repo.list(1, 1).await.unwrap();
        assert_eq!(page[0].pub_time, 20);
    }

    #[tokio::test]
    async fn test_ties_broken_by_id() {
        let db = setup_db().await;
        let repo = NewsRepository::new(db.pool());

        let a = repo.insert(&item("a", 5)).await.unwrap();
        let b = repo.insert(&item("b", 5)).await.unwrap();

        let items = repo.list(10, 0).await.unwrap();
        assert_eq!(items[0].id, b);
        assert_eq!(items[1].id, a);
    }

    #[tokio::test]
    async fn test_search_case_insensitive() {
        let db = setup_db().await;
        let repo = NewsRepository::new(db.pool());

        repo.insert(&item("Rust 2.0 released", 3)).await.unwrap();
        repo.insert(&item("Go generics", 2)).await.unwrap();
        repo.insert(&item("Why I love RUST", 1)).await.unwrap();

        let found = repo.search("rust", 10, 0).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].title, "Rust 2.0 released");
        assert_eq!(found[1].title, "Why I love RUST");
        assert_eq!(repo.search_count("rust").await.unwrap(), 2);

        assert!(repo.search("python", 10, 0).await.unwrap().is_empty());
        assert_eq!(repo.search_count("python").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = setup_db().await;
        let repo = NewsRepository::new(db.pool());

        repo.insert(&item("100% uptime", 2)).await.unwrap();
        repo.insert(&item("1000 users", 1)).await.unwrap();

        let found = repo.search("100%", 10, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "100% uptime");

        assert_eq!(repo.search_count("_").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_matches_titles_only() {
        let db = setup_db().await;
        let repo = NewsRepository::new(db.pool());

        repo.insert(&item("Weather", 1).with_content("rust on the car"))
            .await
            .unwrap();

        assert!(repo.search("rust", 10, 0).await.unwrap().is_empty());
    }
}
