//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim search API, restricted to a country and
//! bounding box. Nominatim requires an identifying User-Agent.

use crate::config::GeocodingConfig;
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, GeoLocation};
use serde::Deserialize;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    endpoint: String,
    country_codes: String,
    viewbox: String,
    bounded: bool,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimBackend {
    /// Create a backend from the geocoding section of the config
    pub fn from_config(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Geo(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            country_codes: config.country_codes.clone(),
            viewbox: config.viewbox.clone(),
            bounded: config.bounded,
        })
    }

    /// Build the search URL for one query
    fn search_url(&self, query: &str) -> String {
        let mut url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.endpoint,
            urlencoding::encode(query)
        );
        if !self.country_codes.is_empty() {
            url.push_str(&format!(
                "&countrycodes={}",
                urlencoding::encode(&self.country_codes)
            ));
        }
        if !self.viewbox.is_empty() {
            url.push_str(&format!("&viewbox={}", urlencoding::encode(&self.viewbox)));
            if self.bounded {
                url.push_str("&bounded=1");
            }
        }
        url
    }

    /// Parse lat/lng strings to f64
    fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
        let parse = |value: &str, what: &str| -> Result<f64> {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::Geo(format!("Invalid {}: {}", what, value)))
        };
        Ok((parse(lat, "latitude")?, parse(lng, "longitude")?))
    }
}

impl GeoBackend for NominatimBackend {
    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let response = self
            .client
            .get(self.search_url(query))
            .send()
            .await
            .map_err(|e| Error::Network(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse Nominatim response: {}", e)))?;

        if let Some(result) = results.into_iter().next() {
            let (lat, lng) = Self::parse_coords(&result.lat, &result.lon)?;
            Ok(Some(GeoLocation {
                lat,
                lng,
                display_name: result.display_name,
            }))
        } else {
            Ok(None)
        }
    }
}
