//! Restaurant entities - Shared catalog records and per-user favorites

use super::{RestaurantId, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub weekday_text: Vec<String>,
}

/// Catalog record, keyed by the provider-assigned place id.
/// Favorites only reference it by id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub international_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub refreshed_at: DateTime<Utc>,
}

impl Restaurant {
    pub fn is_stale(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now - self.refreshed_at > max_age
    }
}

/// (user, restaurant, addedAt) relation. Immutable once created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub added_at: DateTime<Utc>,
}

impl Favorite {
    pub fn document_id(user_id: &str, restaurant_id: &str) -> String {
        format!("{}_{}", user_id, restaurant_id)
    }

    /// True when the catalog data behind this favorite should be refetched.
    /// Falls back to the favorite's own age when the catalog record is missing.
    pub fn needs_refresh(
        &self,
        catalog_entry: Option<&Restaurant>,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        let last_seen = catalog_entry
            .map(|r| r.refreshed_at)
            .unwrap_or(self.added_at);
        now - last_seen > max_age
    }
}
