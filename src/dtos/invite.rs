//! Invite DTOs - Data Transfer Objects per inviti

use crate::entities::{
    DietaryOption, EventType, Invite, InviteId, InviteStatus, RestaurantId, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InviteDTO {
    pub id: InviteId,
    pub sender_id: UserId,
    pub recipient_id: Option<UserId>,
    pub event_date: DateTime<Utc>,
    pub event_type: EventType,
    pub status: InviteStatus,
    pub suggested_restaurants: Vec<RestaurantId>,
    pub initial_suggestion: Option<RestaurantId>,
    pub sender_accepted: bool,
    pub recipient_accepted: bool,
    pub sender_dietary_restrictions: Vec<DietaryOption>,
    pub recipient_dietary_restrictions: Vec<DietaryOption>,
    pub last_modified_by: UserId,
    pub created_at: DateTime<Utc>,
    /// Both parties accepted the first suggestion
    pub finalized: bool,
}

impl From<Invite> for InviteDTO {
    fn from(value: Invite) -> Self {
        // favorites snapshots stay server side
        Self {
            finalized: value.is_finalized(),
            id: value.id,
            sender_id: value.sender_id,
            recipient_id: value.recipient_id,
            event_date: value.event_date,
            event_type: value.event_type,
            status: value.status,
            suggested_restaurants: value.suggested_restaurants,
            initial_suggestion: value.initial_suggestion,
            sender_accepted: value.sender_accepted,
            recipient_accepted: value.recipient_accepted,
            sender_dietary_restrictions: value.sender_dietary_restrictions,
            recipient_dietary_restrictions: value.recipient_dietary_restrictions,
            last_modified_by: value.last_modified_by,
            created_at: value.created_at,
        }
    }
}

/// DTO per creare un nuovo invito (il mittente è l'utente autenticato)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateInviteDTO {
    pub event_date: DateTime<Utc>,
    pub event_type: EventType,
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryOption>,
    #[validate(length(min = 1, max = 255, message = "Initial suggestion must not be empty"))]
    pub initial_suggestion: Option<RestaurantId>,
}

/// DTO per rispondere a un invito
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RsvpDTO {
    pub status: InviteStatus,
    #[serde(default)]
    pub dietary_restrictions: Vec<DietaryOption>,
}

/// Full new order of the suggestions, saved as the caller's choice
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct SaveOrderDTO {
    #[validate(length(min = 1, message = "The order must contain the suggestions"))]
    pub suggested_restaurants: Vec<RestaurantId>,
}

/// Staged order returned by the promote endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReorderDTO {
    pub invite_id: InviteId,
    pub staged: Vec<RestaurantId>,
    pub dirty: bool,
    /// Whether the staged order was also saved
    pub saved: bool,
}
