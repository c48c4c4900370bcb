//! WebSocket Event DTOs - Data Transfer Objects per eventi WebSocket

use crate::dtos::NotificationDTO;
use serde::{Deserialize, Serialize};

/// Enum per gestire gli eventi WebSocket in modo type-safe
/// Tagged union per eventi WebSocket
/// Serde serializza questo come:
/// { "type": "Notification", "data": { ... } }
/// oppure
/// { "type": "Error", "data": { "code": 400, "message": "..." } }
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data")]
pub enum WsEventDTO {
    Notification(NotificationDTO),
    Error { code: u16, message: String },
}

/// Events a client may send on its socket
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data")]
pub enum WsClientEventDTO {
    MarkRead { ids: Vec<String> },
}
