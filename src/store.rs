// src/store.rs
// SQLite-backed article store. Every operation acquires a connection from
// the pool and releases it on return; nothing holds a connection across
// calls.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;

use crate::article::{Article, ArticleSummary, Category};

/// The `news` table. Ids are store-assigned; `link` carries a genuine
/// uniqueness constraint, the dedup lookup in the writer is only the
/// fast path.
const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS news (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        category TEXT NOT NULL,
        headline TEXT NOT NULL,
        authors TEXT NOT NULL DEFAULT '',
        link TEXT NOT NULL UNIQUE,
        image_url TEXT NOT NULL DEFAULT '',
        short_description TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL,
        last_accessed TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_news_category ON news(category);
"#;

const ARTICLE_COLUMNS: &str =
    "id, category, headline, authors, link, image_url, short_description, date, last_accessed";

#[derive(Debug, Clone)]
pub struct NewsStore {
    pool: SqlitePool,
}

impl NewsStore {
    /// Open (creating if missing) the store at `path`. WAL mode keeps
    /// recommendation reads live while an ingestion batch commits.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .with_context(|| format!("invalid database path {}", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("opening news store at {}", path.display()))?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// In-memory store for tests. A single pooled connection, so every
    /// caller sees the same database.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("building in-memory connect options")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("opening in-memory news store")?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .context("initializing news schema")?;
        Ok(())
    }

    /// The ingestion writer batches inserts in its own transaction.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn fetch_by_id(&self, id: i64) -> Result<Option<Article>> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM news WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetching article by id")
    }

    pub async fn find_id_by_link(&self, link: &str) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM news WHERE link = ?")
            .bind(link)
            .fetch_optional(&self.pool)
            .await
            .context("looking up article by link")
    }

    /// All articles in store (id) order, minus the optionally excluded one.
    /// This is the corpus read of the recommendation path.
    pub async fn fetch_all_except(&self, exclude: Option<i64>) -> Result<Vec<Article>> {
        match exclude {
            Some(id) => sqlx::query_as::<_, Article>(&format!(
                "SELECT {ARTICLE_COLUMNS} FROM news WHERE id != ? ORDER BY id"
            ))
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .context("fetching corpus articles"),
            None => sqlx::query_as::<_, Article>(&format!(
                "SELECT {ARTICLE_COLUMNS} FROM news ORDER BY id"
            ))
            .fetch_all(&self.pool)
            .await
            .context("fetching corpus articles"),
        }
    }

    /// Default feed: most recently accessed first, newest id breaking ties.
    pub async fn list_recent(&self, category: Option<Category>) -> Result<Vec<ArticleSummary>> {
        match category {
            Some(c) => sqlx::query_as::<_, ArticleSummary>(
                "SELECT id, headline, short_description, image_url FROM news \
                 WHERE category = ? ORDER BY last_accessed DESC, id DESC",
            )
            .bind(c.as_str())
            .fetch_all(&self.pool)
            .await
            .context("listing articles by category"),
            None => sqlx::query_as::<_, ArticleSummary>(
                "SELECT id, headline, short_description, image_url FROM news \
                 ORDER BY last_accessed DESC, id DESC",
            )
            .fetch_all(&self.pool)
            .await
            .context("listing recent articles"),
        }
    }

    /// Record a detail read. Returns false when the id does not exist.
    pub async fn touch(&self, id: i64) -> Result<bool> {
        let res = sqlx::query("UPDATE news SET last_accessed = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("updating last_accessed")?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM news")
            .fetch_one(&self.pool)
            .await
            .context("counting articles")
    }
}
