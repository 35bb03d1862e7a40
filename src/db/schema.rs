//! Database schema and migrations for newsgate.
//!
//! Migrations are applied in order when the database is opened. The
//! `schema_version` table tracks which of them have run.

/// Bookkeeping table for applied migrations.
#[cfg(feature = "sqlite")]
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
)
"#;

/// Bookkeeping table for applied migrations.
#[cfg(feature = "postgres")]
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     BIGINT PRIMARY KEY,
    applied_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Database migrations.
#[cfg(feature = "sqlite")]
pub const MIGRATIONS: &[&str] = &[
    // v1: ingested news items
    r#"
CREATE TABLE news (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL DEFAULT '',
    pub_time    INTEGER NOT NULL DEFAULT 0,   -- seconds since epoch
    link        TEXT NOT NULL                 -- not unique, see unique_links
);

CREATE INDEX idx_news_pub_time ON news(pub_time);
CREATE INDEX idx_news_link ON news(link);
"#,
    // v2: threaded comments
    r#"
CREATE TABLE comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    news_id     INTEGER NOT NULL REFERENCES news(id) ON DELETE CASCADE,
    parent_id   INTEGER REFERENCES comments(id) ON DELETE CASCADE,
    content     TEXT NOT NULL,
    pub_time    INTEGER NOT NULL
);

CREATE INDEX idx_comments_news_id ON comments(news_id);
CREATE INDEX idx_comments_parent_id ON comments(parent_id);
"#,
];

/// Database migrations.
#[cfg(feature = "postgres")]
pub const MIGRATIONS: &[&str] = &[
    // v1: ingested news items
    r#"
CREATE TABLE news (
    id          BIGSERIAL PRIMARY KEY,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL DEFAULT '',
    pub_time    BIGINT NOT NULL DEFAULT 0,
    link        TEXT NOT NULL
);

CREATE INDEX idx_news_pub_time ON news(pub_time);
CREATE INDEX idx_news_link ON news(link);
"#,
    // v2: threaded comments
    r#"
CREATE TABLE comments (
    id          BIGSERIAL PRIMARY KEY,
    news_id     BIGINT NOT NULL REFERENCES news(id) ON DELETE CASCADE,
    parent_id   BIGINT REFERENCES comments(id) ON DELETE CASCADE,
    content     TEXT NOT NULL,
    pub_time    BIGINT NOT NULL
);

CREATE INDEX idx_comments_news_id ON comments(news_id);
CREATE INDEX idx_comments_parent_id ON comments(parent_id);
"#,
];

/// Optional constraint turning the origin link into a natural key.
pub const UNIQUE_LINK_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_news_link_unique ON news(link)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_not_empty() {
        assert!(!MIGRATIONS.is_empty());
    }

    #[test]
    fn test_first_migration_contains_news_table() {
        let first = MIGRATIONS[0];
        assert!(first.contains("CREATE TABLE news"));
        assert!(first.contains("pub_time"));
        assert!(first.contains("link"));
        assert!(!first.contains("UNIQUE"));
    }

    #[test]
    fn test_comments_migration() {
        let comments = MIGRATIONS[1];
        assert!(comments.contains("CREATE TABLE comments"));
        assert!(comments.contains("news_id"));
        assert!(comments.contains("parent_id"));
    }
}
