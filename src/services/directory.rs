use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Coordinate, RawListing, RoomMember};

/// Errors that can occur when querying the restaurant directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Directory returned status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Directory query task failed: {0}")]
    TaskError(String),
}

/// Restaurant-directory client
///
/// Fans out one broad text query, one text query per distinct member
/// cuisine, and one proximity query when an anchor exists. Listings come
/// back untrusted and possibly duplicated; the caller normalizes them.
pub struct DirectoryClient {
    client: Client,
    base_url: String,
    api_key: String,
    page_limit: usize,
    max_cuisine_queries: usize,
    search_radius_meters: f64,
}

const FIELD_MASK: &str = "places.id,places.displayName,places.priceLevel,places.rating,\
places.userRatingCount,places.types,places.formattedAddress,places.location,\
places.regularOpeningHours.openNow";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    places: Vec<DirectoryPlace>,
}

#[derive(Debug, Deserialize)]
struct DirectoryPlace {
    id: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<DisplayName>,
    #[serde(rename = "priceLevel")]
    price_level: Option<String>,
    rating: Option<f64>,
    #[serde(rename = "userRatingCount")]
    user_rating_count: Option<u32>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(rename = "formattedAddress")]
    formatted_address: Option<String>,
    location: Option<DirectoryLocation>,
    #[serde(rename = "regularOpeningHours")]
    regular_opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Deserialize)]
struct DisplayName {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectoryLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    #[serde(rename = "openNow")]
    open_now: Option<bool>,
}

fn price_level_from_wire(value: Option<&str>) -> Option<u8> {
    match value {
        Some("PRICE_LEVEL_FREE") => Some(0),
        Some("PRICE_LEVEL_INEXPENSIVE") => Some(1),
        Some("PRICE_LEVEL_MODERATE") => Some(2),
        Some("PRICE_LEVEL_EXPENSIVE") => Some(3),
        Some("PRICE_LEVEL_VERY_EXPENSIVE") => Some(4),
        _ => None,
    }
}

fn to_listing(place: DirectoryPlace) -> RawListing {
    RawListing {
        place_id: place.id,
        name: place.display_name.and_then(|name| name.text),
        price_level: price_level_from_wire(place.price_level.as_deref()),
        rating: place.rating,
        user_ratings_total: place.user_rating_count,
        types: place.types,
        address: place.formatted_address,
        lat: place.location.as_ref().and_then(|location| location.latitude),
        lng: place.location.as_ref().and_then(|location| location.longitude),
        is_open_now: place.regular_opening_hours.and_then(|hours| hours.open_now),
    }
}

impl DirectoryClient {
    pub fn new(
        base_url: String,
        api_key: String,
        timeout: Duration,
        page_limit: usize,
        max_cuisine_queries: usize,
        search_radius_meters: f64,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
            page_limit,
            max_cuisine_queries,
            search_radius_meters,
        }
    }

    /// Fetch the raw candidate pool for one resolution run
    ///
    /// All queries are spawned concurrently and joined before returning; a
    /// failing query fails the acquisition as a whole but never cancels its
    /// siblings mid-flight.
    pub async fn fetch_candidates(
        &self,
        area_label: &str,
        anchor: Option<Coordinate>,
        members: &[RoomMember],
    ) -> Result<Vec<RawListing>, DirectoryError> {
        let mut bodies: Vec<Value> = Vec::new();

        for query in self.build_text_queries(area_label, members) {
            bodies.push(self.text_search_body(&query, anchor));
        }
        if let Some(anchor) = anchor {
            bodies.push(self.nearby_search_body(anchor));
        }

        let query_count = bodies.len();

        let mut handles = Vec::with_capacity(query_count);
        for body in bodies {
            let client = self.client.clone();
            let api_key = self.api_key.clone();
            let path = if body.get("textQuery").is_some() {
                "searchText"
            } else {
                "searchNearby"
            };
            let url = format!("{}/places:{}", self.base_url.trim_end_matches('/'), path);

            handles.push(tokio::spawn(async move {
                search_request(&client, &url, &api_key, body).await
            }));
        }

        let mut listings = Vec::new();
        let mut first_error: Option<DirectoryError> = None;

        for handle in handles {
            match handle.await {
                Ok(Ok(mut page)) => listings.append(&mut page),
                Ok(Err(error)) => {
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
                Err(join_error) => {
                    if first_error.is_none() {
                        first_error = Some(DirectoryError::TaskError(join_error.to_string()));
                    }
                }
            }
        }

        if let Some(error) = first_error {
            return Err(error);
        }

        tracing::debug!(
            "Directory returned {} raw listings from {} queries",
            listings.len(),
            query_count
        );

        Ok(listings)
    }

    /// One broad query plus one per distinct member cuisine, capped
    fn build_text_queries(&self, area_label: &str, members: &[RoomMember]) -> Vec<String> {
        let mut queries = vec![format!("restaurants in {}", area_label)];

        let cuisines: BTreeSet<String> = members
            .iter()
            .flat_map(|member| member.preferences.cuisine_preferences.iter())
            .map(|cuisine| cuisine.trim().to_string())
            .filter(|cuisine| !cuisine.is_empty())
            .collect();

        queries.extend(
            cuisines
                .into_iter()
                .take(self.max_cuisine_queries)
                .map(|cuisine| format!("{} restaurants in {}", cuisine, area_label)),
        );

        queries
    }

    fn text_search_body(&self, query: &str, anchor: Option<Coordinate>) -> Value {
        let mut body = serde_json::json!({
            "textQuery": query,
            "pageSize": self.page_limit,
        });

        if let Some(anchor) = anchor {
            body["locationBias"] = serde_json::json!({
                "circle": {
                    "center": { "latitude": anchor.lat, "longitude": anchor.lng },
                    "radius": self.search_radius_meters,
                }
            });
        }

        body
    }

    fn nearby_search_body(&self, anchor: Coordinate) -> Value {
        serde_json::json!({
            "includedTypes": ["restaurant"],
            "maxResultCount": self.page_limit,
            "locationRestriction": {
                "circle": {
                    "center": { "latitude": anchor.lat, "longitude": anchor.lng },
                    "radius": self.search_radius_meters,
                }
            }
        })
    }
}

async fn search_request(
    client: &Client,
    url: &str,
    api_key: &str,
    body: Value,
) -> Result<Vec<RawListing>, DirectoryError> {
    let response = client
        .post(url)
        .header("X-Goog-Api-Key", api_key)
        .header("X-Goog-FieldMask", FIELD_MASK)
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read body".to_string());
        return Err(DirectoryError::ApiError { status, body });
    }

    let payload: SearchResponse = response.json().await?;

    Ok(payload.places.into_iter().map(to_listing).collect())
}
