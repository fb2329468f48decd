use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{GeoMatch, GeocodeError, Geocoder};

const USER_AGENT: &str = concat!("stand-ops/", env!("CARGO_PKG_VERSION"), " (stand map)");
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a Nominatim-style search endpoint.
///
/// Pacing is not handled here; the batch processor owns the courtesy limit,
/// so a bare `lookup` call should only be used for one-off queries.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| GeocodeError::Transport(source.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

/// Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

impl SearchHit {
    fn into_match(self) -> Result<GeoMatch, GeocodeError> {
        let latitude = self
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodeError::Malformed(format!("latitude '{}'", self.lat)))?;
        let longitude = self
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodeError::Malformed(format!("longitude '{}'", self.lon)))?;
        Ok(GeoMatch {
            latitude,
            longitude,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, query: &str) -> Result<Vec<GeoMatch>, GeocodeError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[("format", "json"), ("limit", "3"), ("q", query)])
            .send()
            .await
            .map_err(|source| GeocodeError::Transport(source.to_string()))?
            .error_for_status()
            .map_err(|source| GeocodeError::Transport(source.to_string()))?;

        let hits: Vec<SearchHit> = response
            .json()
            .await
            .map_err(|source| GeocodeError::Malformed(source.to_string()))?;

        hits.into_iter().map(SearchHit::into_match).collect()
    }
}
