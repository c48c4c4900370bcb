//! Notification services - Lettura e conferma delle notifiche

use crate::core::{AppError, AppState};
use crate::dtos::{MarkReadDTO, NotificationDTO};
use crate::entities::UserProfile;
use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
) -> Result<Json<Vec<NotificationDTO>>, AppError> {
    let notifications = state.notification.find_by_user(&current_user.id).await?;
    debug!("Found {} notifications", notifications.len());
    Ok(Json(
        notifications.into_iter().map(NotificationDTO::from).collect(),
    ))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id))]
pub async fn mark_notifications_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
    Json(body): Json<MarkReadDTO>,
) -> Result<StatusCode, AppError> {
    body.validate()?;
    // all-or-nothing: an unknown or foreign id leaves every notification untouched
    state
        .notification
        .mark_read(&current_user.id, &body.ids)
        .await?;
    info!("Marked {} notifications as read", body.ids.len());
    Ok(StatusCode::NO_CONTENT)
}
