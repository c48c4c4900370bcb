//! MemoryStore - In-process implementation of the document store

use super::{
    ChangeFeed, ChangeStream, Document, DocumentChange, DocumentStore, DocumentWrite, FieldFilter,
    StoreError, merge_into,
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, instrument};

type DocKey = (String, String);

/// Documents live in a single DashMap keyed by `(collection, id)`.
///
/// Single-document writes lock one DashMap entry and hold the batch gate in
/// shared mode; `batch_update` takes the gate exclusively so no other write
/// can interleave with it.
pub struct MemoryStore {
    documents: DashMap<DocKey, Document>,
    batch_gate: RwLock<()>,
    feed: ChangeFeed,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            batch_gate: RwLock::new(()),
            feed: ChangeFeed::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn key(collection: &str, id: &str) -> DocKey {
        (collection.to_string(), id.to_string())
    }

    fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.batch_gate.read().unwrap_or_else(|e| e.into_inner())
    }

    fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.batch_gate.write().unwrap_or_else(|e| e.into_inner())
    }

    fn apply_update(
        &self,
        collection: &str,
        id: &str,
        preconditions: &[FieldFilter],
        partial: Document,
    ) -> Result<DocumentChange, StoreError> {
        let mut entry = self
            .documents
            .get_mut(&Self::key(collection, id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        if !preconditions.iter().all(|p| p.matches(entry.value())) {
            return Err(StoreError::precondition_failed(collection, id));
        }

        let before = entry.value().clone();
        merge_into(entry.value_mut(), partial);
        let after = entry.value().clone();

        Ok(DocumentChange::new(collection, id, Some(before), Some(after)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .documents
            .get(&Self::key(collection, id))
            .map(|entry| entry.value().clone()))
    }

    #[instrument(skip(self, data))]
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
        merge: bool,
    ) -> Result<(), StoreError> {
        let change = {
            let _gate = self.shared();
            let (before, after) = match self.documents.entry(Self::key(collection, id)) {
                Entry::Occupied(mut slot) => {
                    let before = slot.get().clone();
                    if merge {
                        merge_into(slot.get_mut(), data);
                    } else {
                        slot.insert(data);
                    }
                    (Some(before), slot.get().clone())
                }
                Entry::Vacant(slot) => {
                    slot.insert(data.clone());
                    (None, data)
                }
            };
            DocumentChange::new(collection, id, before, Some(after))
        };
        self.feed.publish(change);
        Ok(())
    }

    #[instrument(skip(self, data))]
    async fn create_document(&self, collection: &str, id: &str, data: Document) -> Result<(), StoreError> {
        {
            let _gate = self.shared();
            match self.documents.entry(Self::key(collection, id)) {
                Entry::Occupied(_) => {
                    return Err(StoreError::already_exists(collection, id));
                }
                Entry::Vacant(slot) => {
                    slot.insert(data.clone());
                }
            }
        }
        debug!("Document created");
        self.feed.publish(DocumentChange::new(collection, id, None, Some(data)));
        Ok(())
    }

    #[instrument(skip(self, preconditions, partial))]
    async fn update_document_if(
        &self,
        collection: &str,
        id: &str,
        preconditions: &[FieldFilter],
        partial: Document,
    ) -> Result<Document, StoreError> {
        let change = {
            let _gate = self.shared();
            self.apply_update(collection, id, preconditions, partial)?
        };
        let after = change.after.clone().unwrap_or_default();
        self.feed.publish(change);
        Ok(after)
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let removed = {
            let _gate = self.shared();
            self.documents.remove(&Self::key(collection, id))
        };
        if let Some((_, before)) = removed {
            self.feed.publish(DocumentChange::new(collection, id, Some(before), None));
        }
        Ok(())
    }

    async fn query_documents(
        &self,
        collection: &str,
        filter: &FieldFilter,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        Ok(self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == collection && filter.matches(entry.value()))
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect())
    }

    #[instrument(skip(self, writes), fields(count = writes.len()))]
    async fn batch_update(&self, writes: Vec<DocumentWrite>) -> Result<(), StoreError> {
        let changes = {
            let _gate = self.exclusive();

            // Validate everything first so a missing document leaves the store untouched
            if let Some(missing) = writes
                .iter()
                .find(|w| !self.documents.contains_key(&Self::key(&w.collection, &w.id)))
            {
                return Err(StoreError::not_found(&missing.collection, &missing.id));
            }

            let mut changes = Vec::with_capacity(writes.len());
            for write in writes {
                changes.push(self.apply_update(&write.collection, &write.id, &[], write.partial)?);
            }
            changes
        };

        for change in changes {
            self.feed.publish(change);
        }
        Ok(())
    }

    fn subscribe(&self, collection: &str) -> ChangeStream {
        self.feed.subscribe(collection)
    }
}
