//! Place search against a Nominatim-compatible `/search` endpoint, used both
//! for autocomplete suggestions and for submission-time geocoding.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use tunedrop_core::collaborators::{Geocoder, LocationAutocomplete, LocationSuggestion};
use tunedrop_core::error::CoreError;
use tunedrop_core::location::validate_coordinates;
use tunedrop_core::types::Coordinates;

use crate::client::RestClient;
use crate::error::RemoteError;

/// Suggestions returned per autocomplete query.
pub const SUGGESTION_LIMIT: usize = 5;

/// Shortest query sent to the search API.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Deserialize)]
struct Place {
    display_name: String,
    lat: String,
    lon: String,
}

impl Place {
    fn into_suggestion(self) -> Option<LocationSuggestion> {
        let lat = self.lat.parse().ok()?;
        let lng = self.lon.parse().ok()?;
        validate_coordinates("location", Coordinates { lat, lng })
            .is_empty()
            .then_some(LocationSuggestion {
                name: self.display_name,
                lat,
                lng,
            })
    }
}

pub struct RestGeocoder {
    rest: RestClient,
}

impl RestGeocoder {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    async fn search(&self, text: &str, limit: usize) -> Result<Vec<LocationSuggestion>, RemoteError> {
        let limit = limit.to_string();
        let response = self
            .rest
            .request(Method::GET, "search")
            .query(&[("q", text), ("format", "json"), ("limit", limit.as_str())])
            .send()
            .await?;
        let places: Vec<Place> = RestClient::parse_response(response).await?;
        Ok(places.into_iter().filter_map(Place::into_suggestion).collect())
    }
}

fn to_core(err: RemoteError) -> CoreError {
    CoreError::Internal(format!("Location search failed: {err}"))
}

#[async_trait]
impl LocationAutocomplete for RestGeocoder {
    async fn suggest(&self, text: &str) -> Result<Vec<LocationSuggestion>, CoreError> {
        let text = text.trim();
        if text.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }
        self.search(text, SUGGESTION_LIMIT).await.map_err(to_core)
    }
}

#[async_trait]
impl Geocoder for RestGeocoder {
    async fn geocode(&self, text: &str) -> Result<Option<Coordinates>, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let best = self.search(text, 1).await.map_err(to_core)?;
        Ok(best.into_iter().next().map(|s| Coordinates {
            lat: s.lat,
            lng: s.lng,
        }))
    }
}
