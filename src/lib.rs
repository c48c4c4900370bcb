//! Party Of 2 - Invite negotiation and restaurant suggestions for two people
//!
//! Espone i moduli principali per il binario e per i test.

pub mod core;
pub mod dtos;
pub mod entities;
pub mod invites;
pub mod notifications;
pub mod places;
pub mod repositories;
pub mod services;
pub mod store;
pub mod ws;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{any, get, post, put},
};
use std::sync::Arc;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use ws::ws_handler;

    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .merge(configure_protected_routes(state.clone()))
        .route(
            "/ws",
            any(ws_handler).layer(middleware::from_fn_with_state(
                state.clone(),
                core::authentication_middleware,
            )),
        )
        .with_state(state)
}

/// Configura le routes di autenticazione (login, register)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
}

/// Routes che richiedono un token valido
fn configure_protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .nest("/users", configure_user_routes())
        .nest("/favorites", configure_favorite_routes())
        .nest("/restaurants", configure_restaurant_routes())
        .nest("/invites", configure_invite_routes())
        .nest("/notifications", configure_notification_routes())
        .layer(middleware::from_fn_with_state(
            state,
            core::authentication_middleware,
        ))
}

/// Configura le routes per la gestione degli utenti
fn configure_user_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/me", get(get_me).patch(update_me))
        .route("/{user_id}", get(get_user_by_id))
}

/// Configura le routes per i ristoranti preferiti
fn configure_favorite_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/", get(list_favorites).post(save_favorite))
        .route("/{restaurant_id}", axum::routing::delete(remove_favorite))
}

fn configure_restaurant_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new().route("/{restaurant_id}", get(get_restaurant))
}

/// Configura le routes per gli inviti
fn configure_invite_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/", post(create_invite))
        .route("/hosted", get(list_hosted_invites))
        .route("/received", get(list_received_invites))
        .route("/{invite_id}", get(get_invite))
        .route("/{invite_id}/rsvp", post(respond_to_invite))
        .route("/{invite_id}/suggestions", put(save_suggestion_order))
        .route("/{invite_id}/suggestions/accept", post(accept_suggestion))
        .route(
            "/{invite_id}/suggestions/{restaurant_id}/promote",
            post(promote_suggestion),
        )
}

/// Configura le routes per le notifiche
fn configure_notification_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/", get(list_notifications))
        .route("/read", post(mark_notifications_read))
}
