//! User services - Gestione profilo utente

use crate::core::{AppError, AppState};
use crate::dtos::{UpdateProfileDTO, UserDTO};
use crate::entities::{UserId, UserProfile};
use crate::repositories::{Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(current_user), fields(user_id = %current_user.id))]
pub async fn get_me(
    Extension(current_user): Extension<UserProfile>, // ottenuto dall'autenticazione tramite token jwt
) -> Json<UserDTO> {
    Json(UserDTO::from(current_user))
}

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_user_by_id(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>, // parametro dalla URL /users/{user_id}
) -> Result<Json<UserDTO>, AppError> {
    debug!("Fetching user by ID");
    match state.user.read(&user_id).await? {
        Some(user) => Ok(Json(UserDTO::from(user))),
        None => {
            warn!("User not found");
            Err(AppError::not_found("User not found"))
        }
    }
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
    Json(body): Json<UpdateProfileDTO>,
) -> Result<Json<UserDTO>, AppError> {
    debug!("Updating profile");
    // 1. Validare i campi presenti
    // 2. Scrivere solo i campi presenti (merge sul documento)
    // 3. Ritornare il profilo aggiornato
    body.validate()?;

    let updated = state.user.update(&current_user.id, &body).await?;
    info!("Profile updated");
    Ok(Json(UserDTO::from(updated)))
}
