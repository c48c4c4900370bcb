//! Invite record invariants
//!
//! Every record the lifecycle writes is checked here first, so a rejected
//! operation never reaches the store.

use super::InviteError;
use crate::entities::{Invite, InviteStatus, RestaurantId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Same ids with the same multiplicity, in any order
pub fn is_permutation(a: &[RestaurantId], b: &[RestaurantId]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for id in a {
        *counts.entry(id.as_str()).or_default() += 1;
    }
    for id in b {
        *counts.entry(id.as_str()).or_default() -= 1;
    }
    counts.values().all(|c| *c == 0)
}

/// Checks a freshly built invite before it is first stored
pub fn check_new(invite: &Invite, now: DateTime<Utc>) -> Result<(), InviteError> {
    if invite.sender_id.is_empty() {
        return Err(InviteError::invalid("sender is required"));
    }
    if invite.event_date <= now {
        return Err(InviteError::invalid("event date must be in the future"));
    }
    if invite.status != InviteStatus::Pending {
        return Err(InviteError::invalid("a new invite must be pending"));
    }
    if invite.recipient_id.is_some() {
        return Err(InviteError::invalid("a new invite has no recipient yet"));
    }
    if !invite.suggested_restaurants.is_empty() {
        return Err(InviteError::invalid("a new invite has no suggestions yet"));
    }
    if invite.initial_suggestion.as_deref().is_some_and(str::is_empty) {
        return Err(InviteError::invalid("initial suggestion must not be empty"));
    }
    if invite.sender_accepted != invite.initial_suggestion.is_some() || invite.recipient_accepted {
        return Err(InviteError::invalid(
            "only a pinned suggestion counts as the sender's acceptance",
        ));
    }
    if invite.last_modified_by != invite.sender_id {
        return Err(InviteError::invalid("a new invite is last modified by its sender"));
    }
    Ok(())
}

/// Checks that `after` is a legal successor of `before` when written by `actor`
pub fn check_transition(before: &Invite, after: &Invite, actor: &str) -> Result<(), InviteError> {
    // Fields fixed at creation
    if after.id != before.id
        || after.sender_id != before.sender_id
        || after.event_date != before.event_date
        || after.event_type != before.event_type
        || after.sender_favorites != before.sender_favorites
        || after.sender_dietary_restrictions != before.sender_dietary_restrictions
        || after.initial_suggestion != before.initial_suggestion
        || after.created_at != before.created_at
    {
        return Err(InviteError::invalid("immutable invite fields cannot change"));
    }

    if after.last_modified_by != actor {
        return Err(InviteError::invalid("last modifier must be the acting user"));
    }

    if before.recipient_id.is_some() && after.recipient_id != before.recipient_id {
        return Err(InviteError::forbidden("the invite already has a recipient"));
    }

    if after.status != before.status && !before.status.can_transition_to(after.status) {
        return Err(InviteError::invalid(format!(
            "invalid status transition {:?} -> {:?}",
            before.status, after.status
        )));
    }

    let entering_accepted =
        before.status != InviteStatus::Accepted && after.status == InviteStatus::Accepted;

    if after.suggested_restaurants != before.suggested_restaurants {
        if entering_accepted {
            if after.sender_accepted != after.initial_suggestion.is_some() || after.recipient_accepted {
                return Err(InviteError::invalid(
                    "fresh suggestions start without the recipient's acceptance",
                ));
            }
            return Ok(());
        }

        if before.status != InviteStatus::Accepted || after.status != InviteStatus::Accepted {
            return Err(InviteError::invalid(
                "suggestions can only change while the invite is accepted",
            ));
        }
        if !is_permutation(&before.suggested_restaurants, &after.suggested_restaurants) {
            return Err(InviteError::invalid(
                "a new order must contain exactly the current suggestions",
            ));
        }

        // A new top suggestion only carries the acting party's acceptance
        let actor_is_sender = before.sender_id == actor;
        if after.sender_accepted != actor_is_sender || after.recipient_accepted == actor_is_sender {
            return Err(InviteError::invalid(
                "changing the suggestions resets the counterparty's acceptance",
            ));
        }
        return Ok(());
    }

    if entering_accepted {
        return Ok(());
    }

    // Same suggestions: nobody can confirm on the other party's behalf
    let actor_is_sender = before.sender_id == actor;
    let counterparty_flag_raised = if actor_is_sender {
        !before.recipient_accepted && after.recipient_accepted
    } else {
        !before.sender_accepted && after.sender_accepted
    };
    if counterparty_flag_raised {
        return Err(InviteError::forbidden(
            "cannot accept on behalf of the other party",
        ));
    }

    let flags_changed = after.sender_accepted != before.sender_accepted
        || after.recipient_accepted != before.recipient_accepted;
    if flags_changed && (after.status != InviteStatus::Accepted || after.suggested_restaurants.is_empty()) {
        return Err(InviteError::invalid(
            "there is no suggestion to accept on this invite",
        ));
    }

    Ok(())
}
