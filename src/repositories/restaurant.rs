//! RestaurantRepository - Shared catalog in the `restaurants` collection

use super::Read;
use crate::entities::{Restaurant, RestaurantId};
use crate::store::{DocumentStore, StoreError, collections, from_document, to_document};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct RestaurantRepository {
    store: Arc<dyn DocumentStore>,
}

impl RestaurantRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> RestaurantRepository {
        Self { store }
    }

    /// Replaces the catalog record with the given data
    pub async fn upsert(&self, restaurant: &Restaurant) -> Result<(), StoreError> {
        self.store
            .set_document(
                collections::RESTAURANTS,
                &restaurant.id,
                to_document(restaurant)?,
                false,
            )
            .await
    }

    /// Writes the client-supplied record only when the catalog has none or the
    /// stored one is older than `max_age`. Returns the record now in the catalog.
    pub async fn upsert_if_stale(
        &self,
        restaurant: &Restaurant,
        max_age: Duration,
    ) -> Result<Restaurant, StoreError> {
        if let Some(stored) = self.read(&restaurant.id).await? {
            if !stored.is_stale(max_age, Utc::now()) {
                debug!(restaurant_id = %stored.id, "Catalog record still fresh, keeping it");
                return Ok(stored);
            }
        }
        self.upsert(restaurant).await?;
        Ok(restaurant.clone())
    }
}

impl Read<Restaurant, RestaurantId> for RestaurantRepository {
    async fn read(&self, id: &RestaurantId) -> Result<Option<Restaurant>, StoreError> {
        self.store
            .get_document(collections::RESTAURANTS, id)
            .await?
            .map(from_document)
            .transpose()
    }
}
