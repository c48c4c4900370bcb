//! FavoriteRepository - Per-user favorites in the `favorites` collection
//!
//! A favorite only references a catalog record by id. Saving a favorite also
//! writes the restaurant into the shared catalog, unless a fresh record is
//! already there.

use super::{Read, RestaurantRepository};
use crate::core::state::DEFAULT_FAVORITE_REFRESH_DAYS;
use crate::entities::{Favorite, Restaurant, RestaurantId};
use crate::store::{
    DocumentStore, FieldFilter, StoreError, collections, from_document, to_document,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct FavoriteRepository {
    store: Arc<dyn DocumentStore>,
    catalog: RestaurantRepository,
    catalog_max_age: Duration,
}

impl FavoriteRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> FavoriteRepository {
        Self {
            catalog: RestaurantRepository::new(store.clone()),
            store,
            catalog_max_age: Duration::days(DEFAULT_FAVORITE_REFRESH_DAYS),
        }
    }

    /// Age after which a saved favorite may replace the catalog record
    pub fn with_catalog_max_age(mut self, max_age: Duration) -> Self {
        self.catalog_max_age = max_age;
        self
    }

    pub fn catalog(&self) -> &RestaurantRepository {
        &self.catalog
    }

    /// Records the favorite and returns it with the catalog record it points to.
    /// Saving an existing favorite keeps its original `addedAt`.
    #[instrument(skip(self, restaurant), fields(restaurant_id = %restaurant.id))]
    pub async fn save(
        &self,
        user_id: &str,
        restaurant: &Restaurant,
    ) -> Result<(Favorite, Restaurant), StoreError> {
        let stored = self
            .catalog
            .upsert_if_stale(restaurant, self.catalog_max_age)
            .await?;

        let favorite = Favorite {
            user_id: user_id.to_string(),
            restaurant_id: restaurant.id.clone(),
            added_at: Utc::now(),
        };
        let doc_id = Favorite::document_id(user_id, &restaurant.id);

        match self
            .store
            .create_document(collections::FAVORITES, &doc_id, to_document(&favorite)?)
            .await
        {
            Ok(()) => Ok((favorite, stored)),
            Err(StoreError::AlreadyExists { .. }) => {
                debug!("Favorite already saved");
                let existing = self
                    .read(user_id, &restaurant.id)
                    .await?
                    .ok_or_else(|| StoreError::not_found(collections::FAVORITES, &doc_id))?;
                Ok((existing, stored))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn read(&self, user_id: &str, restaurant_id: &str) -> Result<Option<Favorite>, StoreError> {
        self.store
            .get_document(
                collections::FAVORITES,
                &Favorite::document_id(user_id, restaurant_id),
            )
            .await?
            .map(from_document)
            .transpose()
    }

    /// Fails with `NotFound` when the user never saved this restaurant
    pub async fn remove(&self, user_id: &str, restaurant_id: &str) -> Result<(), StoreError> {
        let doc_id = Favorite::document_id(user_id, restaurant_id);
        if self.read(user_id, restaurant_id).await?.is_none() {
            return Err(StoreError::not_found(collections::FAVORITES, &doc_id));
        }
        self.store
            .delete_document(collections::FAVORITES, &doc_id)
            .await
    }

    /// Newest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<Favorite>, StoreError> {
        let docs = self
            .store
            .query_documents(collections::FAVORITES, &FieldFilter::eq("userId", user_id))
            .await?;

        let mut favorites = docs
            .into_iter()
            .map(|(_, doc)| from_document::<Favorite>(doc))
            .collect::<Result<Vec<_>, _>>()?;
        favorites.sort_by(|a, b| {
            b.added_at
                .cmp(&a.added_at)
                .then_with(|| a.restaurant_id.cmp(&b.restaurant_id))
        });
        Ok(favorites)
    }

    /// Restaurant ids of the user's favorites, in [`Self::list`] order
    pub async fn favorite_ids(&self, user_id: &str) -> Result<Vec<RestaurantId>, StoreError> {
        Ok(self
            .list(user_id)
            .await?
            .into_iter()
            .map(|f| f.restaurant_id)
            .collect())
    }

    pub async fn restaurant(&self, restaurant_id: &RestaurantId) -> Result<Option<Restaurant>, StoreError> {
        self.catalog.read(restaurant_id).await
    }
}
