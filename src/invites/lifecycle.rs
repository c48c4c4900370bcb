//! InviteLifecycle - Every write to an invite goes through here
//!
//! Each operation reads a snapshot of the invite, computes the next record,
//! validates it against the record invariants and commits it only if no other
//! write landed in between. A lost race is retried on the fresh record.

use super::draft::SuggestionDraft;
use super::invariants::{check_new, check_transition, is_permutation};
use super::suggestion::SuggestionEngine;
use super::InviteError;
use crate::entities::{
    DietaryOption, EventType, Invite, InviteStatus, Party, RestaurantId, UserId,
};
use crate::repositories::{Create, FavoriteRepository, InviteRepository};
use crate::store::{DocumentStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Attempts of one operation before a lost race is reported as a conflict
const MAX_WRITE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct NewInvite {
    pub sender_id: UserId,
    pub event_date: DateTime<Utc>,
    pub event_type: EventType,
    pub sender_dietary_restrictions: Vec<DietaryOption>,
    pub initial_suggestion: Option<RestaurantId>,
}

/// Partial update of the mutable invite fields.
/// Changing the order resets acceptance to the acting party only.
#[derive(Debug, Clone, Default)]
pub struct InvitePatch {
    pub suggested_restaurants: Option<Vec<RestaurantId>>,
    pub sender_accepted: Option<bool>,
    pub recipient_accepted: Option<bool>,
}

pub struct InviteLifecycle {
    invites: InviteRepository,
    favorites: FavoriteRepository,
    engine: SuggestionEngine,
}

impl InviteLifecycle {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_engine(store, SuggestionEngine::new())
    }

    pub fn with_engine(store: Arc<dyn DocumentStore>, engine: SuggestionEngine) -> Self {
        Self {
            invites: InviteRepository::new(store.clone()),
            favorites: FavoriteRepository::new(store),
            engine,
        }
    }

    #[instrument(skip(self, request), fields(sender_id = %request.sender_id))]
    pub async fn create(&self, request: NewInvite) -> Result<Invite, InviteError> {
        let now = Utc::now();
        let sender_favorites = self.favorites_snapshot(&request.sender_id).await;

        let invite = Invite {
            id: Invite::make_id(&request.sender_id, now),
            sender_id: request.sender_id.clone(),
            recipient_id: None,
            event_date: request.event_date,
            event_type: request.event_type,
            status: InviteStatus::Pending,
            sender_favorites,
            recipient_favorites: Vec::new(),
            suggested_restaurants: Vec::new(),
            sender_accepted: request.initial_suggestion.is_some(),
            initial_suggestion: request.initial_suggestion,
            recipient_accepted: false,
            sender_dietary_restrictions: request.sender_dietary_restrictions,
            recipient_dietary_restrictions: Vec::new(),
            last_modified_by: request.sender_id,
            created_at: now,
        };
        check_new(&invite, now)?;

        let created = self.invites.create(&invite).await?;
        info!(invite_id = %created.id, "Invite created");
        Ok(created)
    }

    pub async fn get(&self, invite_id: &str) -> Result<Invite, InviteError> {
        self.invites
            .snapshot(invite_id)
            .await?
            .map(|s| s.invite)
            .ok_or_else(|| InviteError::NotFound(invite_id.to_string()))
    }

    pub async fn hosted(&self, user_id: &str) -> Result<Vec<Invite>, InviteError> {
        Ok(self.invites.find_by_sender(user_id).await?)
    }

    pub async fn received(&self, user_id: &str) -> Result<Vec<Invite>, InviteError> {
        Ok(self.invites.find_by_recipient(user_id).await?)
    }

    /// Records the recipient's RSVP, binding them on first response.
    /// Suggestions are computed when the invite enters `Accepted` and kept
    /// on later responses.
    #[instrument(skip(self, dietary_restrictions))]
    pub async fn respond(
        &self,
        invite_id: &str,
        recipient_id: &str,
        status: InviteStatus,
        dietary_restrictions: Vec<DietaryOption>,
    ) -> Result<Invite, InviteError> {
        if !status.is_rsvp() {
            return Err(InviteError::invalid("an RSVP must accept or decline"));
        }
        let recipient_favorites = self.favorites_snapshot(recipient_id).await;

        let updated = self
            .mutate(invite_id, recipient_id, |current| {
                if current.sender_id == recipient_id {
                    return Err(InviteError::invalid("the sender cannot respond to their own invite"));
                }
                if current
                    .recipient_id
                    .as_deref()
                    .is_some_and(|bound| bound != recipient_id)
                {
                    return Err(InviteError::forbidden("the invite already has a recipient"));
                }

                let mut next = current.clone();
                next.recipient_id = Some(recipient_id.to_string());
                next.status = status;
                next.recipient_favorites = recipient_favorites.clone();
                next.recipient_dietary_restrictions = dietary_restrictions.clone();

                if current.status != InviteStatus::Accepted && status == InviteStatus::Accepted {
                    next.suggested_restaurants = self.engine.suggest(
                        &current.sender_favorites,
                        &recipient_favorites,
                        current.initial_suggestion.as_deref(),
                    );
                    next.sender_accepted = current.initial_suggestion.is_some();
                    next.recipient_accepted = false;
                    debug!(count = next.suggested_restaurants.len(), "Suggestions computed");
                }
                Ok(next)
            })
            .await?;

        info!(status = ?updated.status, "RSVP recorded");
        Ok(updated)
    }

    /// Generic update used by the reorder and accept operations
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        invite_id: &str,
        patch: InvitePatch,
        actor: &str,
    ) -> Result<Invite, InviteError> {
        self.mutate(invite_id, actor, |current| apply_patch(current, &patch, actor))
            .await
    }

    /// Stages a promotion of `restaurant_id` to the top. Nothing is written.
    pub async fn reorder(
        &self,
        invite_id: &str,
        restaurant_id: &str,
        actor: &str,
    ) -> Result<SuggestionDraft, InviteError> {
        let invite = self.get(invite_id).await?;
        if invite.party_of(actor).is_none() {
            return Err(InviteError::forbidden("not a party to this invite"));
        }
        if invite.status != InviteStatus::Accepted {
            return Err(InviteError::invalid("the invite has not been accepted"));
        }

        let mut draft = SuggestionDraft::new(&invite, actor);
        draft.reorder(restaurant_id)?;
        Ok(draft)
    }

    /// Writes `new_order` and records the actor's acceptance of its first entry
    pub async fn save(
        &self,
        invite_id: &str,
        new_order: Vec<RestaurantId>,
        actor: &str,
    ) -> Result<Invite, InviteError> {
        let invite = self.get(invite_id).await?;
        let party = invite
            .party_of(actor)
            .ok_or_else(|| InviteError::forbidden("not a party to this invite"))?;

        let mut patch = InvitePatch {
            suggested_restaurants: Some(new_order),
            ..InvitePatch::default()
        };
        match party {
            Party::Sender => patch.sender_accepted = Some(true),
            Party::Recipient => patch.recipient_accepted = Some(true),
        }

        let saved = self.update(invite_id, patch, actor).await?;
        info!(invite_id, actor, "Suggestion order saved");
        Ok(saved)
    }

    pub async fn save_draft(&self, draft: SuggestionDraft) -> Result<Invite, InviteError> {
        let invite_id = draft.invite_id().clone();
        let actor = draft.actor().clone();
        self.save(&invite_id, draft.into_order(), &actor).await
    }

    /// Confirms the current top suggestion for the actor only
    pub async fn accept_current(&self, invite_id: &str, actor: &str) -> Result<Invite, InviteError> {
        let invite = self.get(invite_id).await?;
        let patch = match invite.party_of(actor) {
            Some(Party::Sender) => InvitePatch {
                sender_accepted: Some(true),
                ..InvitePatch::default()
            },
            Some(Party::Recipient) => InvitePatch {
                recipient_accepted: Some(true),
                ..InvitePatch::default()
            },
            None => return Err(InviteError::forbidden("not a party to this invite")),
        };

        let accepted = self.update(invite_id, patch, actor).await?;
        if accepted.is_finalized() {
            info!(invite_id, "Both parties accepted the top suggestion");
        }
        Ok(accepted)
    }

    async fn mutate<F>(&self, invite_id: &str, actor: &str, mut apply: F) -> Result<Invite, InviteError>
    where
        F: FnMut(&Invite) -> Result<Invite, InviteError>,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let snapshot = self
                .invites
                .snapshot(invite_id)
                .await?
                .ok_or_else(|| InviteError::NotFound(invite_id.to_string()))?;

            let mut next = apply(&snapshot.invite)?;
            next.last_modified_by = actor.to_string();
            check_transition(&snapshot.invite, &next, actor)?;

            match self.invites.commit(&snapshot, &next).await {
                Ok(saved) => return Ok(saved),
                Err(StoreError::PreconditionFailed { .. }) => {
                    warn!(invite_id, attempt, "Invite changed concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(InviteError::Conflict(format!(
            "invite {} kept changing, try again",
            invite_id
        )))
    }

    async fn favorites_snapshot(&self, user_id: &str) -> Vec<RestaurantId> {
        match self.favorites.favorite_ids(user_id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(user_id = %user_id, "Could not load favorites, using none: {}", e);
                Vec::new()
            }
        }
    }
}

fn apply_patch(current: &Invite, patch: &InvitePatch, actor: &str) -> Result<Invite, InviteError> {
    let party = current
        .party_of(actor)
        .ok_or_else(|| InviteError::forbidden("not a party to this invite"))?;
    let mut next = current.clone();

    if let Some(order) = &patch.suggested_restaurants {
        if current.status != InviteStatus::Accepted {
            return Err(InviteError::invalid(
                "suggestions can only change once the invite is accepted",
            ));
        }
        if !is_permutation(&current.suggested_restaurants, order) {
            return Err(InviteError::invalid(
                "a new order must contain exactly the current suggestions",
            ));
        }
        if *order != current.suggested_restaurants {
            next.suggested_restaurants = order.clone();
            next.sender_accepted = party == Party::Sender;
            next.recipient_accepted = party == Party::Recipient;
        }
    }

    let (own, other) = match party {
        Party::Sender => (patch.sender_accepted, patch.recipient_accepted),
        Party::Recipient => (patch.recipient_accepted, patch.sender_accepted),
    };
    let current_other = match party {
        Party::Sender => next.recipient_accepted,
        Party::Recipient => next.sender_accepted,
    };
    if other.is_some_and(|flag| flag != current_other) {
        return Err(InviteError::forbidden(
            "cannot change the other party's acceptance",
        ));
    }

    if let Some(flag) = own {
        if flag
            && (next.status != InviteStatus::Accepted || next.suggested_restaurants.is_empty())
        {
            return Err(InviteError::invalid(
                "there is no suggestion to accept on this invite",
            ));
        }
        match party {
            Party::Sender => next.sender_accepted = flag,
            Party::Recipient => next.recipient_accepted = flag,
        }
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Restaurant;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn ids(values: &[&str]) -> Vec<RestaurantId> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn sorted(mut values: Vec<RestaurantId>) -> Vec<RestaurantId> {
        values.sort();
        values
    }

    fn restaurant(id: &str) -> Restaurant {
        Restaurant {
            id: id.to_string(),
            name: id.to_string(),
            lat: 0.0,
            lng: 0.0,
            address: String::new(),
            price_level: None,
            rating: None,
            user_ratings_total: None,
            types: vec![],
            url: None,
            international_phone_number: None,
            opening_hours: None,
            website: None,
            refreshed_at: Utc::now(),
        }
    }

    struct Fixture {
        store: Arc<dyn DocumentStore>,
        lifecycle: InviteLifecycle,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let favorites = FavoriteRepository::new(store.clone());
        for id in ["A", "B", "C"] {
            favorites.save("alice", &restaurant(id)).await.unwrap();
        }
        for id in ["B", "C", "D"] {
            favorites.save("bob", &restaurant(id)).await.unwrap();
        }

        Fixture {
            lifecycle: InviteLifecycle::with_engine(store.clone(), SuggestionEngine::seeded(11)),
            store,
        }
    }

    fn new_invite(initial: Option<&str>) -> NewInvite {
        NewInvite {
            sender_id: "alice".into(),
            event_date: Utc::now() + Duration::days(3),
            event_type: EventType::Dinner,
            sender_dietary_restrictions: vec![DietaryOption::Vegetarian],
            initial_suggestion: initial.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_create_snapshots_sender_favorites() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();

        assert_eq!(invite.status, InviteStatus::Pending);
        assert_eq!(sorted(invite.sender_favorites.clone()), ids(&["A", "B", "C"]));
        assert!(invite.recipient_id.is_none());
        assert!(invite.suggested_restaurants.is_empty());
        assert!(!invite.sender_accepted);
        assert_eq!(invite.last_modified_by, "alice");
    }

    #[tokio::test]
    async fn test_create_rejects_past_event() {
        let fx = fixture().await;
        let mut request = new_invite(None);
        request.event_date = Utc::now() - Duration::hours(1);

        let err = fx.lifecycle.create(request).await.unwrap_err();
        assert!(matches!(err, InviteError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_accept_computes_mutual_first() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();

        let accepted = fx
            .lifecycle
            .respond(&invite.id, "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap();

        assert_eq!(accepted.recipient_id.as_deref(), Some("bob"));
        assert_eq!(accepted.status, InviteStatus::Accepted);
        assert_eq!(accepted.suggested_restaurants.len(), 4);
        assert_eq!(sorted(accepted.suggested_restaurants[..2].to_vec()), ids(&["B", "C"]));
        assert_eq!(sorted(accepted.suggested_restaurants[2..].to_vec()), ids(&["A", "D"]));
        assert!(!accepted.sender_accepted);
        assert!(!accepted.recipient_accepted);
        assert_eq!(accepted.last_modified_by, "bob");
    }

    #[tokio::test]
    async fn test_pinned_suggestion_counts_as_sender_acceptance() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(Some("A"))).await.unwrap();
        assert!(invite.sender_accepted);

        let accepted = fx
            .lifecycle
            .respond(&invite.id, "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap();

        assert_eq!(accepted.suggested_restaurants[0], "A");
        assert_eq!(sorted(accepted.suggested_restaurants[1..3].to_vec()), ids(&["B", "C"]));
        assert_eq!(accepted.suggested_restaurants[3], "D");
        assert!(accepted.sender_accepted);
        assert!(!accepted.recipient_accepted);
    }

    #[tokio::test]
    async fn test_sender_cannot_respond() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();
        let err = fx
            .lifecycle
            .respond(&invite.id, "alice", InviteStatus::Accepted, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_pending_is_not_an_rsvp() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();
        let err = fx
            .lifecycle
            .respond(&invite.id, "bob", InviteStatus::Pending, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_recipient_is_bound_by_first_response() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();
        fx.lifecycle
            .respond(&invite.id, "bob", InviteStatus::Declined, vec![])
            .await
            .unwrap();

        let err = fx
            .lifecycle
            .respond(&invite.id, "carol", InviteStatus::Accepted, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_respond_to_missing_invite() {
        let fx = fixture().await;
        let err = fx
            .lifecycle
            .respond("nope", "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_repeated_accept_keeps_suggestions_and_decline_keeps_them_too() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();

        let first = fx
            .lifecycle
            .respond(&invite.id, "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap();
        let again = fx
            .lifecycle
            .respond(&invite.id, "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap();
        assert_eq!(first.suggested_restaurants, again.suggested_restaurants);

        let declined = fx
            .lifecycle
            .respond(&invite.id, "bob", InviteStatus::Declined, vec![])
            .await
            .unwrap();
        assert_eq!(declined.status, InviteStatus::Declined);
        assert_eq!(declined.suggested_restaurants, first.suggested_restaurants);
    }

    #[tokio::test]
    async fn test_reorder_then_accept_finalizes() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();
        let accepted = fx
            .lifecycle
            .respond(&invite.id, "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap();

        let last = accepted.suggested_restaurants[3].clone();
        let draft = fx.lifecycle.reorder(&invite.id, &last, "alice").await.unwrap();
        assert_eq!(draft.staged()[0], last);

        // a draft is local until saved
        let unchanged = fx.lifecycle.get(&invite.id).await.unwrap();
        assert_eq!(unchanged.suggested_restaurants, accepted.suggested_restaurants);

        let saved = fx.lifecycle.save_draft(draft).await.unwrap();
        assert_eq!(saved.suggested_restaurants[0], last);
        assert!(saved.sender_accepted);
        assert!(!saved.recipient_accepted);
        assert_eq!(saved.last_modified_by, "alice");

        let confirmed = fx.lifecycle.accept_current(&invite.id, "bob").await.unwrap();
        assert!(confirmed.is_finalized());
        assert_eq!(confirmed.suggested_restaurants, saved.suggested_restaurants);
    }

    #[tokio::test]
    async fn test_new_order_resets_counterparty_acceptance() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();
        let accepted = fx
            .lifecycle
            .respond(&invite.id, "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap();
        fx.lifecycle.accept_current(&invite.id, "alice").await.unwrap();

        let mut order = accepted.suggested_restaurants.clone();
        order.swap(0, 1);
        let saved = fx.lifecycle.save(&invite.id, order, "bob").await.unwrap();

        assert!(saved.recipient_accepted);
        assert!(!saved.sender_accepted);
    }

    #[tokio::test]
    async fn test_new_order_after_mutual_acceptance_keeps_only_actor() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();
        fx.lifecycle
            .respond(&invite.id, "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap();
        fx.lifecycle.accept_current(&invite.id, "alice").await.unwrap();
        let both = fx.lifecycle.accept_current(&invite.id, "bob").await.unwrap();
        assert!(both.sender_accepted && both.recipient_accepted);

        let mut order = both.suggested_restaurants.clone();
        order.reverse();
        let saved = fx.lifecycle.save(&invite.id, order.clone(), "alice").await.unwrap();

        assert!(saved.sender_accepted);
        assert!(!saved.recipient_accepted);
        let stored = fx.lifecycle.get(&invite.id).await.unwrap();
        assert_eq!(stored.suggested_restaurants, order);
        assert!(stored.sender_accepted && !stored.recipient_accepted);
    }

    #[tokio::test]
    async fn test_save_rejects_foreign_restaurants() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();
        fx.lifecycle
            .respond(&invite.id, "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap();

        let err = fx
            .lifecycle
            .save(&invite.id, ids(&["A", "B", "C", "Z"]), "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_outsiders_cannot_update() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();
        fx.lifecycle
            .respond(&invite.id, "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap();

        let err = fx
            .lifecycle
            .accept_current(&invite.id, "carol")
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::Forbidden(_)));

        let err = fx
            .lifecycle
            .update(
                &invite.id,
                InvitePatch {
                    recipient_accepted: Some(true),
                    ..InvitePatch::default()
                },
                "alice",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_accept_before_rsvp_is_rejected() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();
        let err = fx
            .lifecycle
            .accept_current(&invite.id, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, InviteError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_stale_snapshot_cannot_commit() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();
        let repo = InviteRepository::new(fx.store.clone());

        let stale = repo.snapshot(&invite.id).await.unwrap().unwrap();
        fx.lifecycle
            .respond(&invite.id, "bob", InviteStatus::Accepted, vec![])
            .await
            .unwrap();

        let err = repo.commit(&stale, &stale.invite).await.unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_first_responses_bind_one_recipient() {
        let fx = fixture().await;
        let invite = fx.lifecycle.create(new_invite(None)).await.unwrap();

        let (bob, carol) = tokio::join!(
            fx.lifecycle
                .respond(&invite.id, "bob", InviteStatus::Accepted, vec![]),
            fx.lifecycle
                .respond(&invite.id, "carol", InviteStatus::Accepted, vec![]),
        );

        assert_eq!(
            [bob.is_ok(), carol.is_ok()].iter().filter(|ok| **ok).count(),
            1
        );
        let stored = fx.lifecycle.get(&invite.id).await.unwrap();
        let winner = if bob.is_ok() { "bob" } else { "carol" };
        assert_eq!(stored.recipient_id.as_deref(), Some(winner));
    }
}
