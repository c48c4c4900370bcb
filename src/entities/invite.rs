//! Invite entity - One proposed event between a sender and a recipient

use super::enums::{DietaryOption, EventType, InviteStatus};
use super::{InviteId, RestaurantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field names as stored in the `invites` collection
pub mod fields {
    pub const RECIPIENT_ID: &str = "recipientId";
    pub const SENDER_ID: &str = "senderId";
    pub const STATUS: &str = "status";
    pub const SUGGESTED_RESTAURANTS: &str = "suggestedRestaurants";
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: InviteId,
    pub sender_id: UserId,
    // bound by the first RSVP
    #[serde(default)]
    pub recipient_id: Option<UserId>,
    pub event_date: DateTime<Utc>,
    pub event_type: EventType,
    pub status: InviteStatus,
    #[serde(default)]
    pub sender_favorites: Vec<RestaurantId>,
    #[serde(default)]
    pub recipient_favorites: Vec<RestaurantId>,
    #[serde(default)]
    pub suggested_restaurants: Vec<RestaurantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_suggestion: Option<RestaurantId>,
    pub sender_accepted: bool,
    pub recipient_accepted: bool,
    #[serde(default)]
    pub sender_dietary_restrictions: Vec<DietaryOption>,
    #[serde(default)]
    pub recipient_dietary_restrictions: Vec<DietaryOption>,
    pub last_modified_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// Which side of an invite a user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Sender,
    Recipient,
}

impl Invite {
    /// Invite ids are `{sender}_{creation millis}`, unique per sender and instant.
    pub fn make_id(sender_id: &str, created_at: DateTime<Utc>) -> InviteId {
        format!("{}_{}", sender_id, created_at.timestamp_millis())
    }

    pub fn party_of(&self, user_id: &str) -> Option<Party> {
        if self.sender_id == user_id {
            Some(Party::Sender)
        } else if self.recipient_id.as_deref() == Some(user_id) {
            Some(Party::Recipient)
        } else {
            None
        }
    }

    /// The other party, if bound
    pub fn counterpart_of(&self, user_id: &str) -> Option<&UserId> {
        match self.party_of(user_id)? {
            Party::Sender => self.recipient_id.as_ref(),
            Party::Recipient => Some(&self.sender_id),
        }
    }

    pub fn top_suggestion(&self) -> Option<&RestaurantId> {
        self.suggested_restaurants.first()
    }

    /// Both parties confirmed the current top suggestion
    pub fn is_finalized(&self) -> bool {
        self.sender_accepted && self.recipient_accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> Invite {
        let created_at = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
        Invite {
            id: Invite::make_id("alice", created_at),
            sender_id: "alice".into(),
            recipient_id: Some("bob".into()),
            event_date: Utc.with_ymd_and_hms(2024, 9, 10, 19, 0, 0).unwrap(),
            event_type: EventType::Dinner,
            status: InviteStatus::Accepted,
            sender_favorites: vec!["r1".into()],
            recipient_favorites: vec![],
            suggested_restaurants: vec!["r1".into()],
            initial_suggestion: None,
            sender_accepted: true,
            recipient_accepted: false,
            sender_dietary_restrictions: vec![DietaryOption::Vegan],
            recipient_dietary_restrictions: vec![],
            last_modified_by: "bob".into(),
            created_at,
        }
    }

    #[test]
    fn test_id_combines_sender_and_creation_instant() {
        let invite = sample();
        assert_eq!(invite.id, format!("alice_{}", invite.created_at.timestamp_millis()));
    }

    #[test]
    fn test_parties() {
        let invite = sample();
        assert_eq!(invite.party_of("alice"), Some(Party::Sender));
        assert_eq!(invite.party_of("bob"), Some(Party::Recipient));
        assert_eq!(invite.party_of("carol"), None);
        assert_eq!(invite.counterpart_of("alice").map(String::as_str), Some("bob"));
        assert_eq!(invite.counterpart_of("bob").map(String::as_str), Some("alice"));
        assert!(invite.counterpart_of("carol").is_none());
    }

    #[test]
    fn test_camel_case_document_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["senderId"], json!("alice"));
        assert_eq!(value["suggestedRestaurants"], json!(["r1"]));
        assert_eq!(value["senderDietaryRestrictions"], json!(["Vegan"]));
        assert!(value.get("initialSuggestion").is_none());
    }
}
