//! Key-document storage behind the data entry service.
//!
//! The service only needs exact-match access by primary key plus a full key
//! listing, so engines implement the small [`DocumentStore`] trait:
//!
//! - [`SqliteStore`]: persistent storage in a SQLite database (sqlx pool).
//! - [`MemoryStore`]: ordered in-memory map, used by tests and `--memory` runs.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{init_db, SqliteStore};

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// A stored resolver record: a JSON object carrying an `_id` field.
pub type Document = Map<String, Value>;

/// Errors reported by a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The key cannot be used as a primary key by this store.
    #[error("invalid key {0:?}: {1}")]
    MalformedKey(String, &'static str),

    /// A document with this key already exists.
    #[error("a document with key {0} already exists")]
    Conflict(String),

    /// Driver or connectivity failure.
    #[error("{0}")]
    Backend(#[from] sqlx::Error),

    /// A stored body could not be encoded or decoded.
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Exact-match key-document storage.
///
/// Every method is a single atomic operation on one key; implementations do
/// not hold state between calls beyond the documents themselves.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Looks up a document by primary key.
    async fn find_one(&self, key: &str) -> Result<Option<Document>, StoreError>;

    /// Inserts a new document.
    ///
    /// Returns [`StoreError::Conflict`] if the key is already taken.
    async fn insert_one(&self, key: &str, document: &Document) -> Result<(), StoreError>;

    /// Replaces the document stored under `key`. Returns the matched count.
    async fn replace_one(&self, key: &str, document: &Document) -> Result<u64, StoreError>;

    /// Deletes the document stored under `key`. Returns the deleted count.
    async fn delete_one(&self, key: &str) -> Result<u64, StoreError>;

    /// Lists every primary key in ascending order.
    async fn list_keys(&self) -> Result<Vec<String>, StoreError>;
}

/// Store handle shared across request handlers.
pub type SharedStore = Arc<dyn DocumentStore>;

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn find_one(&self, key: &str) -> Result<Option<Document>, StoreError> {
        (**self).find_one(key).await
    }

    async fn insert_one(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        (**self).insert_one(key, document).await
    }

    async fn replace_one(&self, key: &str, document: &Document) -> Result<u64, StoreError> {
        (**self).replace_one(key, document).await
    }

    async fn delete_one(&self, key: &str) -> Result<u64, StoreError> {
        (**self).delete_one(key).await
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).list_keys().await
    }
}

/// Checks that a key is usable as a primary key.
///
/// Rejects empty keys and keys containing control characters.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::MalformedKey(key.to_string(), "key is empty"));
    }
    if key.chars().any(char::is_control) {
        return Err(StoreError::MalformedKey(
            key.to_string(),
            "key contains control characters",
        ));
    }
    Ok(())
}
