//! InviteNotification entity - Append-only notice derived from an invite change

use super::enums::{EventType, InviteNotificationType, InviteStatus};
use super::{InviteId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InviteNotification {
    pub id: String,
    pub invite_id: InviteId,
    // recipient of the notification
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub notification_type: InviteNotificationType,
    pub invite_date: DateTime<Utc>,
    pub invite_type: EventType,
    pub invite_status: InviteStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}
