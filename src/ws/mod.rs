//! WebSocket Module - Gestione WebSocket per comunicazione real-time
//!
//! Push channel of the notifications. Include:
//! - Gestione upgrade HTTP -> WebSocket
//! - Gestione connessioni (split sender/receiver)
//! - Registro degli utenti online

pub mod connection;
pub mod usermap;

// Re-exports pubblici
pub use connection::handle_socket;
pub use usermap::{InternalSignal, UserMap};

use crate::{AppState, entities::UserProfile};
use axum::{
    Extension,
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

/// Max interval between two client frames before the connection is dropped
pub const TIMEOUT_DURATION_SECONDS: u64 = 300;
/// Minimum spacing between two processed client frames
pub const RATE_LIMITER_MILLIS: u64 = 50;

/// Entry point per gestire richieste di upgrade WebSocket
/// Operazioni:
/// 1. Estrarre user_id dall'autenticazione JWT
/// 2. Eseguire upgrade HTTP -> WebSocket
/// 3. Passare la connessione ad handle_socket
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>, // ottenuto dall'autenticazione JWT
) -> Response {
    let user_id = current_user.id;

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}
