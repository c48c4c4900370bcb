//! Google Places details client

use super::{PlaceDetailsProvider, PlacesError};
use crate::entities::{OpeningHours, Restaurant};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const DETAILS_FIELDS: &str = "place_id,name,geometry/location,formatted_address,price_level,rating,\
user_ratings_total,types,url,international_phone_number,opening_hours/weekday_text,website";

#[derive(Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<PlaceResult>,
}

#[derive(Deserialize)]
struct PlaceResult {
    place_id: Option<String>,
    name: String,
    geometry: Geometry,
    #[serde(default)]
    formatted_address: String,
    price_level: Option<u8>,
    rating: Option<f32>,
    user_ratings_total: Option<u32>,
    #[serde(default)]
    types: Vec<String>,
    url: Option<String>,
    international_phone_number: Option<String>,
    opening_hours: Option<PlaceOpeningHours>,
    website: Option<String>,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct PlaceOpeningHours {
    #[serde(default)]
    weekday_text: Vec<String>,
}

pub struct GooglePlacesClient {
    http: reqwest::Client,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

impl PlaceResult {
    fn into_restaurant(self, requested_id: &str) -> Restaurant {
        Restaurant {
            id: self.place_id.unwrap_or_else(|| requested_id.to_string()),
            name: self.name,
            lat: self.geometry.location.lat,
            lng: self.geometry.location.lng,
            address: self.formatted_address,
            price_level: self.price_level,
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            types: self.types,
            url: self.url,
            international_phone_number: self.international_phone_number,
            opening_hours: self.opening_hours.map(|h| OpeningHours {
                weekday_text: h.weekday_text,
            }),
            website: self.website,
            refreshed_at: Utc::now(),
        }
    }
}

#[async_trait]
impl PlaceDetailsProvider for GooglePlacesClient {
    #[instrument(skip(self))]
    async fn place_details(&self, place_id: &str) -> Result<Restaurant, PlacesError> {
        let response: DetailsResponse = self
            .http
            .get(DETAILS_URL)
            .query(&[
                ("place_id", place_id),
                ("fields", DETAILS_FIELDS),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.status != "OK" {
            return Err(PlacesError::Status(response.status));
        }
        response
            .result
            .map(|result| result.into_restaurant(place_id))
            .ok_or_else(|| PlacesError::MissingResult(place_id.to_string()))
    }
}
