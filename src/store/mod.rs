//! Document store - Abstract JSON document database
//!
//! The core never talks to a concrete database. Everything goes through the
//! [`DocumentStore`] trait, which models a JSON document database with
//! per-document atomic writes and a post-commit change feed:
//! - [`MemoryStore`]: DashMap-backed, used by tests and when no database is configured
//! - [`MySqlStore`]: single `documents` table on MySQL through sqlx

pub mod feed;
pub mod memory;
pub mod mysql;

pub use feed::{ChangeFeed, ChangeStream};
pub use memory::MemoryStore;
pub use mysql::MySqlStore;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored record: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Collection names used by the application
pub mod collections {
    pub const USERS: &str = "users";
    pub const RESTAURANTS: &str = "restaurants";
    pub const FAVORITES: &str = "favorites";
    pub const INVITES: &str = "invites";
    pub const NOTIFICATIONS: &str = "notifications";
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("document {collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    #[error("precondition failed on {collection}/{id}")]
    PreconditionFailed { collection: String, id: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn already_exists(collection: &str, id: &str) -> Self {
        Self::AlreadyExists {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn precondition_failed(collection: &str, id: &str) -> Self {
        Self::PreconditionFailed {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Field equals the value. A missing field compares as `null`.
    Eq,
    /// Field is an array holding the value.
    ArrayContains,
}

/// Single-field filter used by queries and by conditional updates.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn array_contains(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op: FilterOp::ArrayContains,
            value: value.into(),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        let current = doc.get(&self.field).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::Eq => current == &self.value,
            FilterOp::ArrayContains => current
                .as_array()
                .is_some_and(|items| items.contains(&self.value)),
        }
    }
}

/// One entry of an all-or-nothing [`DocumentStore::batch_update`].
#[derive(Debug, Clone)]
pub struct DocumentWrite {
    pub collection: String,
    pub id: String,
    pub partial: Document,
}

/// Before/after pair published on the change feed once a write is committed.
/// `before` is `None` for creations, `after` is `None` for deletions.
/// `seq` is assigned by the feed on publish and is unique per commit.
#[derive(Debug, Clone)]
pub struct DocumentChange {
    pub collection: String,
    pub id: String,
    pub before: Option<Document>,
    pub after: Option<Document>,
    pub seq: u64,
}

impl DocumentChange {
    pub fn new(
        collection: impl Into<String>,
        id: impl Into<String>,
        before: Option<Document>,
        after: Option<Document>,
    ) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            before,
            after,
            seq: 0,
        }
    }
}

/// Abstract document database used by every repository.
///
/// Each method is atomic on a single document, `batch_update` is atomic across
/// the documents it names. The store does not enforce authorization.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Writes `data`. With `merge` the top-level fields are merged into the
    /// existing record (if any), otherwise the record is replaced.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Inserts a new record, failing with `AlreadyExists` if the id is taken.
    async fn create_document(&self, collection: &str, id: &str, data: Document) -> Result<(), StoreError>;

    /// Merges `partial` into an existing record and returns the new record.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        partial: Document,
    ) -> Result<Document, StoreError> {
        self.update_document_if(collection, id, &[], partial).await
    }

    /// Compare-and-update: applies `partial` only if every precondition still
    /// matches the stored record, otherwise fails with `PreconditionFailed`.
    async fn update_document_if(
        &self,
        collection: &str,
        id: &str,
        preconditions: &[FieldFilter],
        partial: Document,
    ) -> Result<Document, StoreError>;

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn query_documents(
        &self,
        collection: &str,
        filter: &FieldFilter,
    ) -> Result<Vec<(String, Document)>, StoreError>;

    async fn batch_update(&self, writes: Vec<DocumentWrite>) -> Result<(), StoreError>;

    /// Stream of committed changes on `collection`.
    fn subscribe(&self, collection: &str) -> ChangeStream;
}

/// Serializes an entity into a [`Document`].
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// Deserializes a [`Document`] into an entity.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Top-level merge shared by the store implementations.
pub(crate) fn merge_into(target: &mut Document, partial: Document) {
    for (field, value) in partial {
        target.insert(field, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_eq_filter_treats_missing_field_as_null() {
        let d = doc(json!({ "status": "Pending" }));
        assert!(FieldFilter::eq("status", "Pending").matches(&d));
        assert!(FieldFilter::eq("recipientId", Value::Null).matches(&d));
        assert!(!FieldFilter::eq("status", "Accepted").matches(&d));
    }

    #[test]
    fn test_array_contains_filter() {
        let d = doc(json!({ "tags": ["a", "b"], "name": "x" }));
        assert!(FieldFilter::array_contains("tags", "b").matches(&d));
        assert!(!FieldFilter::array_contains("tags", "c").matches(&d));
        assert!(!FieldFilter::array_contains("name", "x").matches(&d));
    }

    #[test]
    fn test_to_document_rejects_non_objects() {
        assert!(matches!(
            to_document(&vec![1, 2, 3]),
            Err(StoreError::InvalidDocument(_))
        ));
    }
}
