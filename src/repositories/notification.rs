//! NotificationRepository - Append-only `notifications` collection

use super::Create;
use crate::entities::InviteNotification;
use crate::store::{
    Document, DocumentStore, DocumentWrite, FieldFilter, StoreError, collections, from_document,
    to_document,
};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct NotificationRepository {
    store: Arc<dyn DocumentStore>,
}

impl NotificationRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> NotificationRepository {
        Self { store }
    }

    /// Notifications addressed to `user_id`, newest first
    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<InviteNotification>, StoreError> {
        let docs = self
            .store
            .query_documents(collections::NOTIFICATIONS, &FieldFilter::eq("userId", user_id))
            .await?;

        let mut notifications = docs
            .into_iter()
            .map(|(_, doc)| from_document::<InviteNotification>(doc))
            .collect::<Result<Vec<_>, _>>()?;
        notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(notifications)
    }

    /// Marks every id as read in a single all-or-nothing batch.
    /// Ids that do not belong to `user_id` are reported as missing.
    pub async fn mark_read(&self, user_id: &str, ids: &[String]) -> Result<(), StoreError> {
        let mut writes = Vec::with_capacity(ids.len());
        for id in ids {
            let owned = self
                .store
                .get_document(collections::NOTIFICATIONS, id)
                .await?
                .is_some_and(|doc| doc.get("userId").and_then(Value::as_str) == Some(user_id));
            if !owned {
                return Err(StoreError::not_found(collections::NOTIFICATIONS, id));
            }

            let mut partial = Document::new();
            partial.insert("read".to_string(), Value::Bool(true));
            writes.push(DocumentWrite {
                collection: collections::NOTIFICATIONS.to_string(),
                id: id.clone(),
                partial,
            });
        }

        if writes.is_empty() {
            return Ok(());
        }
        self.store.batch_update(writes).await
    }
}

impl Create<InviteNotification, InviteNotification> for NotificationRepository {
    async fn create(&self, data: &InviteNotification) -> Result<InviteNotification, StoreError> {
        self.store
            .create_document(collections::NOTIFICATIONS, &data.id, to_document(data)?)
            .await?;
        Ok(data.clone())
    }
}
