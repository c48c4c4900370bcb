#![allow(dead_code)]

use axum_test::TestServer;
use partyof2::core::AppState;
use partyof2::dtos::{CreateUserDTO, RestaurantDTO};
use partyof2::entities::UserProfile;
use partyof2::invites::SuggestionEngine;
use partyof2::notifications::NotificationDispatcher;
use partyof2::repositories::Create;
use partyof2::store::MemoryStore;
use std::sync::Arc;

pub const JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

/// Crea un AppState per i test su uno store in memoria
///
/// # Returns
/// Arc<AppState> configurato con il JWT secret di test e un motore di
/// suggerimenti con seed fisso
pub fn create_test_state() -> Arc<AppState> {
    Arc::new(AppState::with_engine(
        Arc::new(MemoryStore::new()),
        JWT_SECRET.to_string(),
        SuggestionEngine::seeded(7),
    ))
}

/// Crea un TestServer per i test
///
/// # Arguments
/// * `state` - AppState da utilizzare per il server
///
/// # Returns
/// TestServer configurato e pronto per eseguire richieste
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = partyof2::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Come `create_test_server`, con il dispatcher delle notifiche in ascolto
pub fn create_test_server_with_dispatcher(state: Arc<AppState>) -> TestServer {
    NotificationDispatcher::new(state.clone(), 128).spawn();
    create_test_server(state)
}

/// Genera un JWT token per testing
///
/// # Arguments
/// * `user_id` - ID dell'utente per cui generare il token
/// * `email` - Email dell'utente
/// * `jwt_secret` - Secret key per firmare il token
///
/// # Returns
/// Token JWT valido per 24 ore
pub fn create_test_jwt(user_id: &str, email: &str, jwt_secret: &str) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Claims {
        id: String,
        email: String,
        exp: usize,
        iat: usize,
    }

    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(24))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        id: user_id.to_string(),
        email: email.to_string(),
        exp: expiration,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("Failed to create JWT token")
}

/// Registra un utente direttamente nello store e ritorna profilo e token
pub async fn create_user(state: &AppState, email: &str) -> (UserProfile, String) {
    let user = state
        .user
        .create(&CreateUserDTO {
            email: email.to_string(),
            display_name: email.split('@').next().unwrap_or(email).to_string(),
            // login is never exercised for these users, skip the bcrypt cost
            password: "not-a-bcrypt-hash".to_string(),
        })
        .await
        .expect("Failed to create test user");
    let token = create_test_jwt(&user.id, &user.email, JWT_SECRET);
    (user, token)
}

/// Aggiunge un ristorante ai preferiti di un utente
pub async fn add_favorite(state: &AppState, user_id: &str, restaurant_id: &str) {
    state
        .favorite
        .save(user_id, &restaurant(restaurant_id).into_restaurant(chrono::Utc::now()))
        .await
        .expect("Failed to save favorite");
}

/// Body valido per `POST /favorites`
pub fn restaurant(id: &str) -> RestaurantDTO {
    RestaurantDTO {
        id: id.to_string(),
        name: format!("Ristorante {}", id),
        lat: 45.07,
        lng: 7.68,
        address: "Via Roma 1, Torino".to_string(),
        price_level: Some(2),
        rating: Some(4.4),
        user_ratings_total: Some(120),
        types: vec!["restaurant".to_string()],
        url: None,
        international_phone_number: None,
        opening_hours: None,
        website: None,
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
