//! User preferences for one session

use crate::error::{Error, Result};
use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};

/// Smallest accepted search distance
pub const MIN_DISTANCE_KM: u8 = 1;

/// Largest accepted search distance
pub const MAX_DISTANCE_KM: u8 = 20;

/// Budget band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRange {
    Budget,
    #[default]
    Mid,
    Premium,
}

impl PriceRange {
    /// Vietnamese label shown in the form and sent to the AI
    pub fn label(&self) -> &'static str {
        match self {
            Self::Budget => "Bình dân",
            Self::Mid => "Tầm trung",
            Self::Premium => "Cao cấp",
        }
    }
}

impl std::fmt::Display for PriceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Preferences sent along with every recommendation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub location: String,
    pub food_types: String,
    pub price_range: PriceRange,
    pub distance_km: u8,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            location: "Quận 1, TP.HCM".to_string(),
            food_types: "Cà phê, không gian yên tĩnh".to_string(),
            price_range: PriceRange::Mid,
            distance_km: 5,
            coordinates: None,
        }
    }
}

impl UserSettings {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DISTANCE_KM..=MAX_DISTANCE_KM).contains(&self.distance_km) {
            return Err(Error::InvalidSettings(format!(
                "distance_km must be between {} and {}, got {}",
                MIN_DISTANCE_KM, MAX_DISTANCE_KM, self.distance_km
            )));
        }
        if let Some(coords) = &self.coordinates {
            coords.validate()?;
        }
        Ok(())
    }

    /// Copy with different coordinates
    pub fn with_coordinates(&self, coordinates: Option<Coordinates>) -> Self {
        Self {
            coordinates,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = UserSettings::default();
        assert_eq!(settings.location, "Quận 1, TP.HCM");
        assert_eq!(settings.price_range, PriceRange::Mid);
        assert_eq!(settings.distance_km, 5);
        assert!(settings.coordinates.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_distance_bounds() {
        for (distance, ok) in [(0, false), (1, true), (20, true), (21, false)] {
            let settings = UserSettings {
                distance_km: distance,
                ..UserSettings::default()
            };
            assert_eq!(settings.validate().is_ok(), ok, "distance {}", distance);
        }
    }

    #[test]
    fn test_price_range_labels() {
        assert_eq!(PriceRange::Mid.to_string(), "Tầm trung");
    }

    #[test]
    fn test_settings_wire_format() {
        let json = serde_json::json!({
            "location": "Quận 3",
            "food_types": "Cà phê",
            "price_range": "premium",
            "distance_km": 3
        });
        let settings: UserSettings = serde_json::from_value(json).unwrap();
        assert_eq!(settings.price_range, PriceRange::Premium);
        assert!(settings.coordinates.is_none());
    }

    #[test]
    fn test_with_coordinates_keeps_other_fields() {
        let settings = UserSettings::default();
        let moved = settings.with_coordinates(Some(Coordinates::new(10.8, 106.7)));
        assert_eq!(moved.location, settings.location);
        assert_eq!(moved.coordinates, Some(Coordinates::new(10.8, 106.7)));
    }
}
