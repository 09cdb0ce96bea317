//! Geocoding module
//!
//! Turns free-text Vietnamese addresses into coordinates:
//! - `normalize`: shorthand and abbreviation rewriting
//! - `candidates`: the ordered query fallback ladder
//! - `resolver`: first-hit lookup against a [`GeoBackend`]
//! - `nominatim`: the OpenStreetMap backend

pub mod candidates;
pub mod nominatim;
pub mod normalize;
pub mod resolver;

use crate::config::GeocodingConfig;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are finite and within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || self.lat < -90.0 || self.lat > 90.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || self.lng < -180.0 || self.lng > 180.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lng: f64,
    /// Display name reported by the geocoder
    pub display_name: String,
}

impl GeoLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Geocode a query string to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    fn geocode(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Option<GeoLocation>>> + Send;
}

/// Build the default geocoding backend from config
pub fn get_geocoder(config: &GeocodingConfig) -> Result<nominatim::NominatimBackend> {
    nominatim::NominatimBackend::from_config(config)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates() {
        assert!(Coordinates::new(10.7769, 106.7009).validate().is_ok());
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -181.0).validate().is_err());
        assert!(Coordinates::new(f64::NAN, 106.0).validate().is_err());
    }

    #[test]
    fn test_geo_location_coordinates() {
        let loc = GeoLocation {
            lat: 10.7626,
            lng: 106.6602,
            display_name: "Quận 10".to_string(),
        };
        assert_eq!(loc.coordinates(), Coordinates::new(10.7626, 106.6602));
    }
}
