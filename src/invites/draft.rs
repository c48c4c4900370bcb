//! SuggestionDraft - Local reordering of an invite's suggestions
//!
//! A draft stages a new order without touching the store. Promoting a
//! restaurant swaps it with the current top entry. Nothing is shared until
//! the draft is saved through [`super::InviteLifecycle::save_draft`].

use super::InviteError;
use crate::entities::{Invite, InviteId, RestaurantId, UserId};

#[derive(Debug, Clone)]
pub struct SuggestionDraft {
    invite_id: InviteId,
    actor: UserId,
    persisted: Vec<RestaurantId>,
    staged: Vec<RestaurantId>,
}

impl SuggestionDraft {
    pub fn new(invite: &Invite, actor: &str) -> Self {
        Self {
            invite_id: invite.id.clone(),
            actor: actor.to_string(),
            persisted: invite.suggested_restaurants.clone(),
            staged: invite.suggested_restaurants.clone(),
        }
    }

    pub fn invite_id(&self) -> &InviteId {
        &self.invite_id
    }

    pub fn actor(&self) -> &UserId {
        &self.actor
    }

    pub fn staged(&self) -> &[RestaurantId] {
        &self.staged
    }

    pub fn is_dirty(&self) -> bool {
        self.staged != self.persisted
    }

    /// Swaps `restaurant_id` with the current first entry.
    /// Promoting the entry that is already first changes nothing.
    pub fn reorder(&mut self, restaurant_id: &str) -> Result<&[RestaurantId], InviteError> {
        let position = self
            .staged
            .iter()
            .position(|id| id == restaurant_id)
            .ok_or_else(|| {
                InviteError::invalid(format!("{} is not among the suggestions", restaurant_id))
            })?;
        self.staged.swap(0, position);
        Ok(&self.staged)
    }

    /// Drops the staged order
    pub fn cancel_pending(&mut self) {
        self.staged = self.persisted.clone();
    }

    pub(crate) fn into_order(self) -> Vec<RestaurantId> {
        self.staged
    }
}
