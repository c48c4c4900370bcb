//! Restaurant DTOs - Data Transfer Objects per ristoranti e preferiti

use crate::entities::{Favorite, OpeningHours, Restaurant, RestaurantId};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// Provider place ids: url-safe token characters only
    static ref PLACE_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,255}$").unwrap();
}

/// Restaurant as exchanged with the client. Also the body of `POST /favorites`.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct RestaurantDTO {
    #[validate(regex(path = *PLACE_ID_REGEX, message = "Invalid place id"))]
    pub id: RestaurantId,
    #[validate(length(min = 1, max = 256, message = "Name must be between 1 and 256 characters"))]
    pub name: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub lng: f64,
    #[serde(default)]
    pub address: String,
    #[validate(range(max = 4, message = "Price level goes from 0 to 4"))]
    pub price_level: Option<u8>,
    #[validate(range(min = 0.0, max = 5.0, message = "Rating goes from 0 to 5"))]
    pub rating: Option<f32>,
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    pub url: Option<String>,
    pub international_phone_number: Option<String>,
    pub opening_hours: Option<Vec<String>>,
    pub website: Option<String>,
}

impl From<Restaurant> for RestaurantDTO {
    fn from(value: Restaurant) -> Self {
        Self {
            id: value.id,
            name: value.name,
            lat: value.lat,
            lng: value.lng,
            address: value.address,
            price_level: value.price_level,
            rating: value.rating,
            user_ratings_total: value.user_ratings_total,
            types: value.types,
            url: value.url,
            international_phone_number: value.international_phone_number,
            opening_hours: value.opening_hours.map(|h| h.weekday_text),
            website: value.website,
        }
    }
}

impl RestaurantDTO {
    /// Catalog record for this restaurant, stamped as fresh at `now`
    pub fn into_restaurant(self, now: DateTime<Utc>) -> Restaurant {
        Restaurant {
            id: self.id,
            name: self.name,
            lat: self.lat,
            lng: self.lng,
            address: self.address,
            price_level: self.price_level,
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            types: self.types,
            url: self.url,
            international_phone_number: self.international_phone_number,
            opening_hours: self
                .opening_hours
                .map(|weekday_text| OpeningHours { weekday_text }),
            website: self.website,
            refreshed_at: now,
        }
    }
}

/// Favorite with its catalog data, when the catalog still has it
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FavoriteDTO {
    pub restaurant_id: RestaurantId,
    pub added_at: DateTime<Utc>,
    pub restaurant: Option<RestaurantDTO>,
}

impl FavoriteDTO {
    pub fn new(favorite: Favorite, restaurant: Option<Restaurant>) -> Self {
        Self {
            restaurant_id: favorite.restaurant_id,
            added_at: favorite.added_at,
            restaurant: restaurant.map(RestaurantDTO::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(id: &str) -> RestaurantDTO {
        RestaurantDTO {
            id: id.to_string(),
            name: "Trattoria".into(),
            lat: 45.0,
            lng: 7.6,
            address: String::new(),
            price_level: Some(2),
            rating: Some(4.5),
            user_ratings_total: None,
            types: vec![],
            url: None,
            international_phone_number: None,
            opening_hours: None,
            website: None,
        }
    }

    #[test]
    fn test_place_id_validation() {
        assert!(dto("ChIJN1t_tDeuEmsRUsoyG83frY4").validate().is_ok());
        assert!(dto("../etc/passwd").validate().is_err());
        assert!(dto("").validate().is_err());
    }

    #[test]
    fn test_coordinates_validation() {
        let mut invalid = dto("place-1");
        invalid.lat = 120.0;
        assert!(invalid.validate().is_err());
    }
}
