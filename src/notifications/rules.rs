//! Notification rules - Which notices an invite change produces
//!
//! Pure evaluation over the before/after pair of one committed write. More
//! than one rule may fire. The suggestion update and the acceptance notices
//! never fire together: acceptance only counts when the list did not change.

use crate::entities::{Invite, InviteNotificationType, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNotification {
    pub user_id: UserId,
    pub notification_type: InviteNotificationType,
}

impl PendingNotification {
    fn new(user_id: &UserId, notification_type: InviteNotificationType) -> Self {
        Self {
            user_id: user_id.clone(),
            notification_type,
        }
    }
}

pub fn evaluate(before: &Invite, after: &Invite) -> Vec<PendingNotification> {
    let mut pending = Vec::new();

    if before.status != after.status {
        pending.push(PendingNotification::new(
            &after.sender_id,
            InviteNotificationType::RsvpChanged,
        ));
    }

    let suggestions_changed = before.suggested_restaurants != after.suggested_restaurants;

    if suggestions_changed {
        // the party that did not write this change
        if let Some(target) = after.counterpart_of(&after.last_modified_by) {
            pending.push(PendingNotification::new(
                target,
                InviteNotificationType::RestaurantSuggestionUpdate,
            ));
        }
    } else {
        if !before.sender_accepted && after.sender_accepted {
            if let Some(recipient) = &after.recipient_id {
                pending.push(PendingNotification::new(
                    recipient,
                    InviteNotificationType::SuggestedRestaurantAcceptedBySender,
                ));
            }
        }
        if !before.recipient_accepted && after.recipient_accepted {
            pending.push(PendingNotification::new(
                &after.sender_id,
                InviteNotificationType::SuggestedRestaurantAcceptedByRecipient,
            ));
        }
    }

    pending
}
