//! Favorite services - Ristoranti preferiti e catalogo

use crate::core::{AppError, AppState};
use crate::dtos::{FavoriteDTO, RestaurantDTO};
use crate::entities::{RestaurantId, UserProfile};
use crate::places::refresh_stale_favorites;
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
) -> Result<Json<Vec<FavoriteDTO>>, AppError> {
    debug!("Listing favorites");
    // 1. Recuperare i preferiti dell'utente (più recenti prima)
    // 2. Arricchire ciascuno con il record del catalogo
    // 3. Se configurato, aggiornare in background i record troppo vecchi
    let favorites = state.favorite.list(&current_user.id).await?;

    let mut result = Vec::with_capacity(favorites.len());
    for favorite in &favorites {
        let restaurant = state.favorite.restaurant(&favorite.restaurant_id).await?;
        if restaurant.is_none() {
            warn!(restaurant_id = %favorite.restaurant_id, "Favorite without catalog record");
        }
        result.push(FavoriteDTO::new(favorite.clone(), restaurant));
    }

    if let Some(provider) = state.places.clone() {
        let state = state.clone();
        tokio::spawn(async move {
            refresh_stale_favorites(
                &state.favorite,
                provider.as_ref(),
                &favorites,
                state.favorite_refresh_age,
            )
            .await;
        });
    }

    info!("Returned {} favorites", result.len());
    Ok(Json(result))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.id, restaurant_id = %body.id))]
pub async fn save_favorite(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
    Json(body): Json<RestaurantDTO>,
) -> Result<(StatusCode, Json<FavoriteDTO>), AppError> {
    debug!("Saving favorite");
    // 1. Validare i dati del ristorante
    // 2. Salvare il preferito, il catalogo viene scritto solo se assente o scaduto
    body.validate()?;

    let restaurant = body.into_restaurant(Utc::now());
    let (favorite, stored) = state.favorite.save(&current_user.id, &restaurant).await?;

    info!("Favorite saved");
    Ok((
        StatusCode::CREATED,
        Json(FavoriteDTO::new(favorite, Some(stored))),
    ))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<UserProfile>,
    Path(restaurant_id): Path<RestaurantId>,
) -> Result<StatusCode, AppError> {
    debug!("Removing favorite");
    state
        .favorite
        .remove(&current_user.id, &restaurant_id)
        .await?;
    info!("Favorite removed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<RestaurantId>,
) -> Result<Json<RestaurantDTO>, AppError> {
    match state.favorite.restaurant(&restaurant_id).await? {
        Some(restaurant) => Ok(Json(RestaurantDTO::from(restaurant))),
        None => Err(AppError::not_found("Restaurant not found")),
    }
}
