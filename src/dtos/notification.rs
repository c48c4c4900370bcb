//! Notification DTOs - Data Transfer Objects per notifiche

use crate::entities::{EventType, InviteId, InviteNotification, InviteNotificationType, InviteStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NotificationDTO {
    pub id: String,
    pub invite_id: InviteId,
    #[serde(rename = "type")]
    pub notification_type: InviteNotificationType,
    pub invite_date: DateTime<Utc>,
    pub invite_type: EventType,
    pub invite_status: InviteStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl From<InviteNotification> for NotificationDTO {
    fn from(value: InviteNotification) -> Self {
        Self {
            id: value.id,
            invite_id: value.invite_id,
            notification_type: value.notification_type,
            invite_date: value.invite_date,
            invite_type: value.invite_type,
            invite_status: value.invite_status,
            message: value.message,
            timestamp: value.timestamp,
            read: value.read,
        }
    }
}

/// DTO per segnare come lette delle notifiche
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct MarkReadDTO {
    #[validate(length(min = 1, max = 500, message = "Between 1 and 500 ids per request"))]
    pub ids: Vec<String>,
}
