//! Serializable map scene
//!
//! The scene is what the page draws with its map library: markers with
//! popup content, the latest camera command, and which popup is open.

use crate::chat::Place;
use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};

/// Latitude/longitude rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest rectangle containing every point
    pub fn around<I: IntoIterator<Item = Coordinates>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let init = Self {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Some(points.fold(init, |b, p| Self {
            south: b.south.min(p.lat),
            west: b.west.min(p.lng),
            north: b.north.max(p.lat),
            east: b.east.max(p.lng),
        }))
    }

    /// Grow each side by `ratio` of the height/width
    pub fn pad(self, ratio: f64) -> Self {
        let dlat = (self.north - self.south) * ratio;
        let dlng = (self.east - self.west) * ratio;
        Self {
            south: self.south - dlat,
            west: self.west - dlng,
            north: self.north + dlat,
            east: self.east + dlng,
        }
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }
}

/// Most recent camera command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Camera {
    /// Jump to a center and zoom
    SetView { center: Coordinates, zoom: u8 },
    /// Frame a rectangle
    FitBounds { bounds: Bounds },
    /// Animate to a center and zoom
    FlyTo { center: Coordinates, zoom: u8 },
}

/// Popup content for one marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub title: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Confidence as a whole percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_pct: Option<u8>,
}

impl From<&Place> for Popup {
    fn from(place: &Place) -> Self {
        Self {
            title: place.title.clone(),
            address: place.address.clone(),
            image: place.images.first().cloned(),
            rating: place.rating,
            review_count: place.review_count.filter(|n| *n > 0),
            opening_hours: place.opening_hours.clone(),
            price_range: place.price_range.clone(),
            reason: Some(place.reason.clone()).filter(|r| !r.trim().is_empty()),
            source: place.source.clone(),
            confidence_pct: place
                .confidence
                .map(|c| (c.clamp(0.0, 1.0) * 100.0).round() as u8),
        }
    }
}

/// A plotted place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub place_id: String,
    pub title: String,
    pub position: Coordinates,
    pub popup: Popup,
}

/// Everything the page needs to draw the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapScene {
    pub markers: Vec<Marker>,
    pub camera: Camera,
    /// Place whose popup is open
    pub open_popup: Option<String>,
    /// Bumped on every change so the page can skip redundant redraws
    pub revision: u64,
}

impl MapScene {
    pub fn new(camera: Camera) -> Self {
        Self {
            markers: Vec::new(),
            camera,
            open_popup: None,
            revision: 0,
        }
    }

    pub fn marker(&self, place_id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.place_id == place_id)
    }
}
