//! Places module - Restaurant details from an external place provider
//!
//! Favorites only store a place id plus the catalog snapshot taken when they
//! were saved. [`refresh_stale_favorites`] refetches catalog records older
//! than the configured age through a [`PlaceDetailsProvider`].

pub mod google;

pub use google::GooglePlacesClient;

use crate::entities::{Favorite, Restaurant, RestaurantId};
use crate::repositories::FavoriteRepository;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("places request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("places provider answered {0}")]
    Status(String),

    #[error("place {0} has no details")]
    MissingResult(RestaurantId),
}

#[async_trait]
pub trait PlaceDetailsProvider: Send + Sync {
    /// Current details of the place, with `refreshed_at` set to now
    async fn place_details(&self, place_id: &str) -> Result<Restaurant, PlacesError>;
}

/// Refetches the catalog record of every favorite whose data is older than
/// `max_age`. Failures are logged per favorite and never abort the pass.
///
/// Returns the number of catalog records refreshed.
#[instrument(skip(favorites, provider, entries), fields(count = entries.len()))]
pub async fn refresh_stale_favorites(
    favorites: &FavoriteRepository,
    provider: &dyn PlaceDetailsProvider,
    entries: &[Favorite],
    max_age: Duration,
) -> usize {
    let now = Utc::now();
    let mut refreshed = 0;

    for favorite in entries {
        let catalog_entry = match favorites.restaurant(&favorite.restaurant_id).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(restaurant_id = %favorite.restaurant_id, "Catalog read failed: {}", e);
                continue;
            }
        };
        if !favorite.needs_refresh(catalog_entry.as_ref(), max_age, now) {
            continue;
        }

        debug!(restaurant_id = %favorite.restaurant_id, "Refreshing stale restaurant");
        match provider.place_details(&favorite.restaurant_id).await {
            Ok(restaurant) => match favorites.catalog().upsert(&restaurant).await {
                Ok(()) => refreshed += 1,
                Err(e) => warn!(restaurant_id = %restaurant.id, "Catalog write failed: {}", e),
            },
            Err(e) => warn!(restaurant_id = %favorite.restaurant_id, "Place lookup failed: {}", e),
        }
    }

    if refreshed > 0 {
        info!(refreshed, "Stale favorites refreshed");
    }
    refreshed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PlaceDetailsProvider for CountingProvider {
        async fn place_details(&self, place_id: &str) -> Result<Restaurant, PlacesError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if place_id == "gone" {
                return Err(PlacesError::MissingResult(place_id.to_string()));
            }
            Ok(restaurant(place_id, Utc::now(), "Fresh name"))
        }
    }

    fn restaurant(id: &str, refreshed_at: chrono::DateTime<Utc>, name: &str) -> Restaurant {
        Restaurant {
            id: id.to_string(),
            name: name.to_string(),
            lat: 0.0,
            lng: 0.0,
            address: String::new(),
            price_level: None,
            rating: None,
            user_ratings_total: None,
            types: vec![],
            url: None,
            international_phone_number: None,
            opening_hours: None,
            website: None,
            refreshed_at,
        }
    }

    #[tokio::test]
    async fn test_only_stale_entries_are_refetched() {
        let repo = FavoriteRepository::new(Arc::new(MemoryStore::new()));
        let old = Utc::now() - Duration::days(45);
        repo.save("u1", &restaurant("fresh", Utc::now(), "Fresh")).await.unwrap();
        repo.save("u1", &restaurant("stale", old, "Old name")).await.unwrap();
        repo.save("u1", &restaurant("gone", old, "Closed")).await.unwrap();

        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let entries = repo.list("u1").await.unwrap();
        let refreshed =
            refresh_stale_favorites(&repo, &provider, &entries, Duration::days(30)).await;

        assert_eq!(refreshed, 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        let stale = repo.restaurant(&"stale".to_string()).await.unwrap().unwrap();
        assert_eq!(stale.name, "Fresh name");
    }
}
