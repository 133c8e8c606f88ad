//! Document access layer.
//!
//! Create, read, update and delete resolver documents, plus a listing of all
//! stored keys. Every operation returns an [`Envelope`]; failures never
//! escape as errors.
//!
//! Identifier handling differs per operation:
//!
//! - `create` stores the document under the internal form of its `_id`.
//! - `read` and `delete` accept an anchor in either form and normalize it.
//! - `update` matches on `_id` exactly as given. Callers must send the
//!   internal key (e.g. `01_05392000229648`) in `_id` to hit a stored record.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::anchor::{to_external, to_internal};
use crate::envelope::Envelope;
use crate::error::DataEntryError;
use crate::store::{Document, DocumentStore};

/// Field holding a document's primary identifier.
pub const ID_FIELD: &str = "_id";

/// CRUD operations over an injected [`DocumentStore`].
#[derive(Debug)]
pub struct DocumentService<S> {
    store: S,
}

impl<S: DocumentStore> DocumentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Inserts a new document.
    ///
    /// 201 on success, 400 without a usable `_id`, 409 if the key is taken.
    pub async fn create(&self, document: Document) -> Envelope {
        finish("create", self.try_create(document).await)
    }

    /// Fetches the document for an anchor.
    ///
    /// 200 with the document, or 404 naming the external anchor.
    pub async fn read(&self, anchor: &str) -> Envelope {
        finish("read", self.try_read(anchor).await)
    }

    /// Lists every stored key in internal form.
    ///
    /// An empty store is reported as 404 rather than an empty list.
    pub async fn read_index(&self) -> Envelope {
        finish("read_index", self.try_read_index().await)
    }

    /// Replaces a stored document wholesale, matching on `_id` verbatim.
    pub async fn update(&self, document: Document) -> Envelope {
        finish("update", self.try_update(document).await)
    }

    /// Deletes the document for an anchor.
    pub async fn delete(&self, anchor: &str) -> Envelope {
        finish("delete", self.try_delete(anchor).await)
    }

    async fn try_create(&self, document: Document) -> Result<Envelope, DataEntryError> {
        let id = document_id(&document)?;
        let key = to_internal(id);

        if self.store.find_one(&key).await?.is_some() {
            return Err(DataEntryError::Conflict(format!(
                "document with id {} already exists",
                id
            )));
        }

        self.store.insert_one(&key, &document).await?;

        info!("Created document {}", key);
        Ok(Envelope::created(format!(
            "document with id {} created successfully",
            key
        )))
    }

    async fn try_read(&self, anchor: &str) -> Result<Envelope, DataEntryError> {
        let key = to_internal(anchor);

        match self.store.find_one(&key).await? {
            Some(document) => Ok(Envelope::ok(Value::Object(document))),
            None => Err(DataEntryError::NotFound(format!(
                "no document found for anchor: {}",
                to_external(anchor)
            ))),
        }
    }

    async fn try_read_index(&self) -> Result<Envelope, DataEntryError> {
        let keys = self.store.list_keys().await?;

        if keys.is_empty() {
            return Err(DataEntryError::NotFound("no document ids found".to_string()));
        }

        Ok(Envelope::ok(keys))
    }

    async fn try_update(&self, document: Document) -> Result<Envelope, DataEntryError> {
        let id = document_id(&document)?;

        let matched = self.store.replace_one(id, &document).await?;
        if matched == 0 {
            return Err(DataEntryError::NotFound(format!(
                "no document found with id: {}",
                id
            )));
        }

        info!("Updated document {}", id);
        Ok(Envelope::ok(format!(
            "document with anchor {} updated successfully",
            id
        )))
    }

    async fn try_delete(&self, anchor: &str) -> Result<Envelope, DataEntryError> {
        let key = to_internal(anchor);

        let deleted = self.store.delete_one(&key).await?;
        if deleted == 0 {
            return Err(DataEntryError::NotFound(format!(
                "no document found with id: {}",
                key
            )));
        }

        info!("Deleted document {}", key);
        Ok(Envelope::ok(format!(
            "document with anchor {} deleted successfully",
            key
        )))
    }
}

/// Extracts the `_id` string from a document.
fn document_id(document: &Document) -> Result<&str, DataEntryError> {
    match document.get(ID_FIELD) {
        Some(Value::String(id)) => Ok(id),
        Some(other) => Err(DataEntryError::Validation(format!(
            "'{}' must be a string, got {}",
            ID_FIELD, other
        ))),
        None => Err(DataEntryError::Validation(format!(
            "missing identifier '{}' in document",
            ID_FIELD
        ))),
    }
}

/// Folds an operation result into an envelope, logging failures.
fn finish(operation: &str, result: Result<Envelope, DataEntryError>) -> Envelope {
    match result {
        Ok(envelope) => envelope,
        Err(e @ DataEntryError::Store(_)) => {
            warn!("{} failed: {}", operation, e);
            e.into()
        }
        Err(e) => {
            debug!("{} rejected: {}", operation, e);
            e.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn service() -> DocumentService<MemoryStore> {
        DocumentService::new(MemoryStore::new())
    }

    fn sample() -> Document {
        doc(json!({
            "_id": "/01/05392000229648",
            "item_description": "Dal Giardino Risotto Rice with Mushrooms",
            "responses": [
                {"linktype": "gs1:pip", "link": "https://dalgiardino.com/mushroom-risotto/"}
            ]
        }))
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let service = service();

        let created = service.create(sample()).await;
        assert_eq!(created.status, 201);
        assert_eq!(
            created.data,
            Some(json!(
                "document with id 01_05392000229648 created successfully"
            ))
        );

        // Transport joins the two path segments as <code>_<value>
        let read = service.read("01_05392000229648").await;
        assert_eq!(read.status, 200);
        assert_eq!(read.data, Some(Value::Object(sample())));

        // External form resolves to the same record
        let read = service.read("/01/05392000229648").await;
        assert_eq!(read.status, 200);
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let service = service();

        assert_eq!(service.create(sample()).await.status, 201);

        let second = service.create(sample()).await;
        assert_eq!(second.status, 409);
        assert!(second.error.unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn test_create_external_and_internal_ids_collide() {
        let service = service();

        assert_eq!(service.create(sample()).await.status, 201);

        let same_key = doc(json!({"_id": "01_05392000229648"}));
        assert_eq!(service.create(same_key).await.status, 409);
    }

    #[tokio::test]
    async fn test_create_missing_id() {
        let service = service();

        let result = service.create(doc(json!({"name": "no id"}))).await;
        assert_eq!(result.status, 400);
        assert_eq!(
            result.error.as_deref(),
            Some("missing identifier '_id' in document")
        );
        assert!(result.data.is_none());
        assert!(service.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_create_non_string_id() {
        let service = service();

        let result = service.create(doc(json!({"_id": 1234}))).await;
        assert_eq!(result.status, 400);
    }

    #[tokio::test]
    async fn test_create_empty_id() {
        let service = service();

        let result = service.create(doc(json!({"_id": "/"}))).await;
        assert_eq!(result.status, 400);
        assert!(result.error.unwrap().contains("invalid id format"));
    }

    #[tokio::test]
    async fn test_read_missing_echoes_external_form() {
        let service = service();

        let result = service.read("01_09506000134352").await;
        assert_eq!(result.status, 404);
        assert_eq!(
            result.error.as_deref(),
            Some("no document found for anchor: /01/09506000134352")
        );
    }

    #[tokio::test]
    async fn test_read_empty_anchor() {
        let service = service();

        let result = service.read("").await;
        assert_eq!(result.status, 400);
    }

    #[tokio::test]
    async fn test_read_index() {
        let service = service();

        let empty = service.read_index().await;
        assert_eq!(empty.status, 404);
        assert_eq!(empty.error.as_deref(), Some("no document ids found"));

        service.create(sample()).await;

        let index = service.read_index().await;
        assert_eq!(index.status, 200);
        assert_eq!(index.data, Some(json!(["01_05392000229648"])));
    }

    #[tokio::test]
    async fn test_update_missing() {
        let service = service();

        let result = service
            .update(doc(json!({"_id": "01_05392000229648", "a": 1})))
            .await;
        assert_eq!(result.status, 404);
        assert_eq!(
            result.error.as_deref(),
            Some("no document found with id: 01_05392000229648")
        );
    }

    #[tokio::test]
    async fn test_update_replaces_whole_document() {
        let service = service();
        service.create(sample()).await;

        let replacement = doc(json!({
            "_id": "01_05392000229648",
            "item_description": "Replaced"
        }));
        let result = service.update(replacement.clone()).await;
        assert_eq!(result.status, 200);

        let read = service.read("01_05392000229648").await;
        let stored = read.data.unwrap();
        assert_eq!(stored, Value::Object(replacement));
        assert!(stored.get("responses").is_none());
    }

    #[tokio::test]
    async fn test_update_does_not_normalize_id() {
        let service = service();
        service.create(sample()).await;

        // External form does not match the stored internal key
        let result = service.update(sample()).await;
        assert_eq!(result.status, 404);
        assert!(result.error.unwrap().contains("/01/05392000229648"));
    }

    #[tokio::test]
    async fn test_update_missing_id() {
        let service = service();

        let result = service.update(doc(json!({"a": 1}))).await;
        assert_eq!(result.status, 400);
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();

        let missing = service.delete("01_05392000229648").await;
        assert_eq!(missing.status, 404);
        assert_eq!(
            missing.error.as_deref(),
            Some("no document found with id: 01_05392000229648")
        );

        service.create(sample()).await;

        assert_eq!(service.read("01_05392000229648").await.status, 200);
        assert_eq!(service.delete("/01/05392000229648").await.status, 200);
        assert_eq!(service.read("01_05392000229648").await.status, 404);
        assert_eq!(service.read_index().await.status, 404);
    }

    #[tokio::test]
    async fn test_sqlite_backed_flow() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = crate::store::SqliteStore::open(&temp_dir.path().join("resolver.db"))
            .await
            .unwrap();
        let service = DocumentService::new(store);

        assert_eq!(service.read_index().await.status, 404);
        assert_eq!(service.create(sample()).await.status, 201);
        assert_eq!(service.create(sample()).await.status, 409);

        let read = service.read("01_05392000229648").await;
        assert_eq!(read.status, 200);
        assert_eq!(read.data, Some(Value::Object(sample())));

        assert_eq!(
            service.read_index().await.data,
            Some(json!(["01_05392000229648"]))
        );
        assert_eq!(service.delete("01_05392000229648").await.status, 200);
        assert_eq!(service.read("01_05392000229648").await.status, 404);
    }

    /// Reports every key as absent, so inserts race into the store's own check.
    struct RacingStore(MemoryStore);

    #[async_trait]
    impl DocumentStore for RacingStore {
        async fn find_one(&self, _key: &str) -> Result<Option<Document>, StoreError> {
            Ok(None)
        }
        async fn insert_one(&self, key: &str, document: &Document) -> Result<(), StoreError> {
            self.0.insert_one(key, document).await
        }
        async fn replace_one(&self, key: &str, document: &Document) -> Result<u64, StoreError> {
            self.0.replace_one(key, document).await
        }
        async fn delete_one(&self, key: &str) -> Result<u64, StoreError> {
            self.0.delete_one(key).await
        }
        async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
            self.0.list_keys().await
        }
    }

    #[tokio::test]
    async fn test_insert_conflict_after_existence_check_is_409() {
        let service = DocumentService::new(RacingStore(MemoryStore::new()));

        assert_eq!(service.create(sample()).await.status, 201);

        let raced = service.create(sample()).await;
        assert_eq!(raced.status, 409);
        assert!(raced.error.unwrap().starts_with("duplicate key error"));
    }

    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn find_one(&self, _key: &str) -> Result<Option<Document>, StoreError> {
            Err(StoreError::Backend(sqlx::Error::PoolClosed))
        }
        async fn insert_one(&self, _key: &str, _document: &Document) -> Result<(), StoreError> {
            Err(StoreError::Backend(sqlx::Error::PoolClosed))
        }
        async fn replace_one(&self, _key: &str, _document: &Document) -> Result<u64, StoreError> {
            Err(StoreError::Backend(sqlx::Error::PoolClosed))
        }
        async fn delete_one(&self, _key: &str) -> Result<u64, StoreError> {
            Err(StoreError::Backend(sqlx::Error::PoolClosed))
        }
        async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Backend(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn test_store_failures_become_500() {
        let service = DocumentService::new(FailingStore);

        for envelope in [
            service.create(sample()).await,
            service.read("01_1").await,
            service.read_index().await,
            service
                .update(doc(json!({"_id": "01_1"})))
                .await,
            service.delete("01_1").await,
        ] {
            assert_eq!(envelope.status, 500);
            assert!(envelope.error.unwrap().starts_with("database error"));
        }
    }
}
