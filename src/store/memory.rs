//! In-memory document store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{validate_key, Document, DocumentStore, StoreError};

/// Document store backed by an ordered in-memory map.
///
/// Contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<String, Document>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Returns true if the store holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, key: &str) -> Result<Option<Document>, StoreError> {
        validate_key(key)?;
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn insert_one(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut documents = self.documents.write().await;
        if documents.contains_key(key) {
            return Err(StoreError::Conflict(key.to_string()));
        }
        documents.insert(key.to_string(), document.clone());
        Ok(())
    }

    async fn replace_one(&self, key: &str, document: &Document) -> Result<u64, StoreError> {
        validate_key(key)?;
        let mut documents = self.documents.write().await;
        match documents.get_mut(key) {
            Some(existing) => {
                *existing = document.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, key: &str) -> Result<u64, StoreError> {
        validate_key(key)?;
        let removed = self.documents.write().await.remove(key);
        Ok(u64::from(removed.is_some()))
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.documents.read().await.keys().cloned().collect())
    }
}
