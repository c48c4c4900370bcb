//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod auth;
pub mod favorite;
pub mod invite;
pub mod notification;
pub mod user;

// Re-exports per facilitare l'import
pub use auth::{login_user, register_user};
pub use favorite::{get_restaurant, list_favorites, remove_favorite, save_favorite};
pub use invite::{
    accept_suggestion, create_invite, get_invite, list_hosted_invites, list_received_invites,
    promote_suggestion, respond_to_invite, save_suggestion_order,
};
pub use notification::{list_notifications, mark_notifications_read};
pub use user::{get_me, get_user_by_id, update_me};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
