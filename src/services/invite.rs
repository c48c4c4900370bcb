//! Invite services - Creazione, RSVP e scelta del ristorante

use crate::core::{AppError, AppState};
use crate::dtos::{CreateInviteDTO, InviteDTO, ReorderDTO, RsvpDTO, SaveOrderDTO};
use crate::entities::{InviteId, RestaurantId, UserProfile};
use crate::invites::NewInvite;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use axum_macros::debug_handler;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

#[derive(Deserialize, Debug, Default)]
pub struct PromoteQuery {
    /// Save the staged order right away as the caller's choice
    #[serde(default)]
    pub save: bool,
}

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn create_invite(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
    Json(body): Json<CreateInviteDTO>,
) -> Result<(StatusCode, Json<InviteDTO>), AppError> {
    debug!("Creating invite");
    // 1. Validare il DTO
    // 2. Le restrizioni alimentari di default sono quelle del profilo
    // 3. Creare l'invito tramite il lifecycle (snapshot dei preferiti del mittente)
    body.validate()?;

    let dietary_restrictions = if body.dietary_restrictions.is_empty() {
        current_user.dietary_restrictions.clone()
    } else {
        body.dietary_restrictions
    };

    let invite = state
        .invites
        .create(NewInvite {
            sender_id: current_user.id,
            event_date: body.event_date,
            event_type: body.event_type,
            sender_dietary_restrictions: dietary_restrictions,
            initial_suggestion: body.initial_suggestion,
        })
        .await?;

    info!(invite_id = %invite.id, "Invite created");
    Ok((StatusCode::CREATED, Json(InviteDTO::from(invite))))
}

#[instrument(skip(state, _current_user))]
pub async fn get_invite(
    State(state): State<Arc<AppState>>,
    Extension(_current_user): Extension<UserProfile>,
    Path(invite_id): Path<InviteId>,
) -> Result<Json<InviteDTO>, AppError> {
    // Any authenticated user holding the link can open the invite
    let invite = state.invites.get(&invite_id).await?;
    Ok(Json(InviteDTO::from(invite)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn list_hosted_invites(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
) -> Result<Json<Vec<InviteDTO>>, AppError> {
    let invites = state.invites.hosted(&current_user.id).await?;
    debug!("Found {} hosted invites", invites.len());
    Ok(Json(invites.into_iter().map(InviteDTO::from).collect()))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn list_received_invites(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
) -> Result<Json<Vec<InviteDTO>>, AppError> {
    let invites = state.invites.received(&current_user.id).await?;
    debug!("Found {} received invites", invites.len());
    Ok(Json(invites.into_iter().map(InviteDTO::from).collect()))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id, status = ?body.status))]
pub async fn respond_to_invite(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
    Path(invite_id): Path<InviteId>,
    Json(body): Json<RsvpDTO>,
) -> Result<Json<InviteDTO>, AppError> {
    debug!("Responding to invite");
    // 1. Le restrizioni alimentari di default sono quelle del profilo
    // 2. Registrare la risposta (lega il destinatario e calcola i suggerimenti)
    let dietary_restrictions = if body.dietary_restrictions.is_empty() {
        current_user.dietary_restrictions.clone()
    } else {
        body.dietary_restrictions
    };

    let invite = state
        .invites
        .respond(&invite_id, &current_user.id, body.status, dietary_restrictions)
        .await?;

    info!("RSVP recorded");
    Ok(Json(InviteDTO::from(invite)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn save_suggestion_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
    Path(invite_id): Path<InviteId>,
    Json(body): Json<SaveOrderDTO>,
) -> Result<Json<InviteDTO>, AppError> {
    debug!("Saving suggestion order");
    body.validate()?;

    let invite = state
        .invites
        .save(&invite_id, body.suggested_restaurants, &current_user.id)
        .await?;
    Ok(Json(InviteDTO::from(invite)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn promote_suggestion(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
    Path((invite_id, restaurant_id)): Path<(InviteId, RestaurantId)>,
    Query(query): Query<PromoteQuery>,
) -> Result<Json<ReorderDTO>, AppError> {
    debug!("Promoting suggestion");
    // 1. Costruire l'ordine locale con il ristorante scelto in cima
    // 2. Se richiesto, salvarlo subito come scelta del chiamante
    let draft = state
        .invites
        .reorder(&invite_id, &restaurant_id, &current_user.id)
        .await?;

    let staged = draft.staged().to_vec();
    let dirty = draft.is_dirty();

    if query.save {
        state.invites.save_draft(draft).await?;
        info!("Promoted suggestion saved");
    }

    Ok(Json(ReorderDTO {
        invite_id,
        staged,
        dirty,
        saved: query.save,
    }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn accept_suggestion(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
    Path(invite_id): Path<InviteId>,
) -> Result<Json<InviteDTO>, AppError> {
    debug!("Accepting current suggestion");
    let invite = state
        .invites
        .accept_current(&invite_id, &current_user.id)
        .await?;
    Ok(Json(InviteDTO::from(invite)))
}
