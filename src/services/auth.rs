//! Auth services - Gestione autenticazione e registrazione utenti

use crate::core::auth::TOKEN_LIFETIME_HOURS;
use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{CreateUserDTO, LoginDTO, UserDTO};
use crate::entities::UserProfile;
use crate::repositories::Create;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>, // JSON body
) -> Result<impl IntoResponse, AppError> {
    debug!("Login attempt");
    // 1. Cercare l'utente tramite email
    // 2. Se l'utente non esiste o la password non corrisponde, ritornare UNAUTHORIZED
    // 3. Generare un token JWT con id, email e il segreto
    // 4. Costruire un cookie HttpOnly, Secure, SameSite=Lax con il token
    // 5. Ritornare StatusCode::OK con Set-Cookie e Authorization (Bearer token)

    let user = match state.user.find_by_email(&body.email).await? {
        Some(user) => user,
        None => {
            warn!("Login for unknown email");
            return Err(AppError::unauthorized("Email or password are not correct."));
        }
    };

    if !user.verify_password(&body.password) {
        warn!("Wrong password");
        return Err(AppError::unauthorized("Email or password are not correct."));
    }

    let token = encode_jwt(user.email, user.id, &state.jwt_secret)?;

    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        token,
        TOKEN_LIFETIME_HOURS * 60 * 60
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        "Set-Cookie",
        HeaderValue::from_str(&cookie_value)
            .map_err(|_| AppError::internal_server_error("Failed to build session cookie"))?,
    );
    headers.insert(
        "Authorization",
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::internal_server_error("Failed to build auth header"))?,
    );

    info!("User logged in");
    Ok((StatusCode::OK, headers))
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserDTO>, // JSON body
) -> Result<(StatusCode, Json<UserDTO>), AppError> {
    debug!("Registration attempt");
    // 1. Validare il DTO con validator (email, nome visualizzato, lunghezza password)
    // 2. Controllare che l'email non sia già registrata, altrimenti CONFLICT
    // 3. Generare l'hash della password
    // 4. Salvare il nuovo profilo e ritornarlo come UserDTO
    body.validate()?;

    if state.user.find_by_email(&body.email).await?.is_some() {
        warn!("Email already registered");
        return Err(AppError::conflict("Email already registered"));
    }

    let password_hash = UserProfile::hash_password(&body.password)
        .map_err(|_| AppError::internal_server_error("Failed to hash password"))?;

    let new_user = CreateUserDTO {
        password: password_hash,
        ..body
    };

    let created_user = state.user.create(&new_user).await?;
    info!(user_id = %created_user.id, "User registered");

    Ok((StatusCode::CREATED, Json(UserDTO::from(created_user))))
}
