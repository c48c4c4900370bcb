//! InviteRepository - Invites in the `invites` collection
//!
//! Writes go through [`InviteSnapshot`]: the record is read together with the
//! raw values of its mutable fields, and [`InviteRepository::commit`] only
//! applies the new record if none of those fields changed in between.

use super::{Create, Read};
use crate::entities::invite::fields;
use crate::entities::{Invite, InviteId};
use crate::store::{
    DocumentStore, FieldFilter, StoreError, collections, from_document, to_document,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Fields a concurrent writer may change. Everything else is fixed at creation.
const GUARDED_FIELDS: [&str; 6] = [
    fields::STATUS,
    fields::RECIPIENT_ID,
    fields::SUGGESTED_RESTAURANTS,
    "senderAccepted",
    "recipientAccepted",
    "lastModifiedBy",
];

/// An invite as read at one instant, plus the preconditions to commit on top of it
#[derive(Debug, Clone)]
pub struct InviteSnapshot {
    pub invite: Invite,
    guards: Vec<FieldFilter>,
}

#[derive(Clone)]
pub struct InviteRepository {
    store: Arc<dyn DocumentStore>,
}

impl InviteRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> InviteRepository {
        Self { store }
    }

    pub async fn snapshot(&self, id: &str) -> Result<Option<InviteSnapshot>, StoreError> {
        let Some(doc) = self.store.get_document(collections::INVITES, id).await? else {
            return Ok(None);
        };

        let guards = GUARDED_FIELDS
            .iter()
            .map(|field| FieldFilter::eq(field, doc.get(*field).cloned().unwrap_or(Value::Null)))
            .collect();

        Ok(Some(InviteSnapshot {
            invite: from_document(doc)?,
            guards,
        }))
    }

    /// Writes `next` over the snapshot's record.
    /// Fails with `PreconditionFailed` if another write landed since the snapshot.
    #[instrument(skip(self, snapshot, next), fields(invite_id = %snapshot.invite.id))]
    pub async fn commit(&self, snapshot: &InviteSnapshot, next: &Invite) -> Result<Invite, StoreError> {
        let stored = self
            .store
            .update_document_if(
                collections::INVITES,
                &snapshot.invite.id,
                &snapshot.guards,
                to_document(next)?,
            )
            .await?;
        from_document(stored)
    }

    /// Invites created by `user_id`, soonest event first
    pub async fn find_by_sender(&self, user_id: &str) -> Result<Vec<Invite>, StoreError> {
        self.find_by(FieldFilter::eq(fields::SENDER_ID, user_id)).await
    }

    /// Invites `user_id` has responded to, soonest event first
    pub async fn find_by_recipient(&self, user_id: &str) -> Result<Vec<Invite>, StoreError> {
        self.find_by(FieldFilter::eq(fields::RECIPIENT_ID, user_id)).await
    }

    async fn find_by(&self, filter: FieldFilter) -> Result<Vec<Invite>, StoreError> {
        let docs = self
            .store
            .query_documents(collections::INVITES, &filter)
            .await?;

        let mut invites = docs
            .into_iter()
            .map(|(_, doc)| from_document::<Invite>(doc))
            .collect::<Result<Vec<_>, _>>()?;
        invites.sort_by(|a, b| a.event_date.cmp(&b.event_date).then_with(|| a.id.cmp(&b.id)));
        Ok(invites)
    }
}

impl Create<Invite, Invite> for InviteRepository {
    async fn create(&self, data: &Invite) -> Result<Invite, StoreError> {
        self.store
            .create_document(collections::INVITES, &data.id, to_document(data)?)
            .await?;
        Ok(data.clone())
    }
}

impl Read<Invite, InviteId> for InviteRepository {
    async fn read(&self, id: &InviteId) -> Result<Option<Invite>, StoreError> {
        self.store
            .get_document(collections::INVITES, id)
            .await?
            .map(from_document)
            .transpose()
    }
}
