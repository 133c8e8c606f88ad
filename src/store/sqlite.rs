//! SQLite-backed document store.
//!
//! Documents live in a single table keyed by internal anchor:
//! ```text
//! documents(id TEXT PRIMARY KEY, body TEXT NOT NULL)
//! ```
//! `body` holds the JSON object exactly as it was submitted.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use super::{validate_key, Document, DocumentStore, StoreError};

/// Opens (creating if needed) the database at `path` and runs migrations.
pub async fn init_db(path: &Path) -> Result<SqlitePool, StoreError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(sqlx::Error::from)?;

    Ok(pool)
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    body: String,
}

/// Document store persisted in SQLite.
///
/// Each operation checks a connection out of the pool for its own duration;
/// the connection goes back to the pool when the operation returns.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the database at `path` and wraps it in a store.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::new(init_db(path).await?))
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find_one(&self, key: &str) -> Result<Option<Document>, StoreError> {
        validate_key(key)?;
        let mut conn = self.pool.acquire().await?;

        let row: Option<DocumentRow> = sqlx::query_as("SELECT body FROM documents WHERE id = ?")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.body)?)),
            None => Ok(None),
        }
    }

    async fn insert_one(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        validate_key(key)?;
        let body = serde_json::to_string(document)?;
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query("INSERT INTO documents (id, body) VALUES (?, ?)")
            .bind(key)
            .bind(&body)
            .execute(&mut *conn)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Conflict(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn replace_one(&self, key: &str, document: &Document) -> Result<u64, StoreError> {
        validate_key(key)?;
        let body = serde_json::to_string(document)?;
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query("UPDATE documents SET body = ? WHERE id = ?")
            .bind(&body)
            .bind(key)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_one(&self, key: &str) -> Result<u64, StoreError> {
        validate_key(key)?;
        let mut conn = self.pool.acquire().await?;

        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(key)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let rows: Vec<(String,)> = sqlx::query_as("SELECT id FROM documents ORDER BY id")
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
