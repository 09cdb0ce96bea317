//! Conversation model
//!
//! Messages are append-only; AI messages may own the places they recommend.

pub mod render;

use crate::geo::Coordinates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    /// Role name used in the AI chat history
    pub fn role(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "model",
        }
    }
}

/// A recommended place
///
/// `id` is derived from the name and its position in one response, so it
/// is unique within that response only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub title: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub popular_reviews: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Place {
    /// Id for the place at `index` in one response
    pub fn make_id(name: &str, index: usize) -> String {
        let slug: String = name
            .chars()
            .map(|c| if c.is_whitespace() { '-' } else { c })
            .collect();
        format!("{}-{}", slug, index)
    }

    /// Coordinates if they can be put on a map
    ///
    /// Zero components are treated as missing: the model emits them as
    /// placeholders when it does not know a location.
    pub fn map_position(&self) -> Option<Coordinates> {
        let coords = Coordinates::new(self.latitude, self.longitude);
        if self.latitude == 0.0 || self.longitude == 0.0 || coords.validate().is_err() {
            return None;
        }
        Some(coords)
    }
}

/// One chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub places: Vec<Place>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A message written by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: format!("user-{}", uuid::Uuid::new_v4()),
            text: text.into(),
            sender: Sender::User,
            places: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// A reply from the assistant
    pub fn ai(text: impl Into<String>, places: Vec<Place>) -> Self {
        Self {
            id: format!("ai-{}", uuid::Uuid::new_v4()),
            text: text.into(),
            sender: Sender::Ai,
            places,
            created_at: Utc::now(),
        }
    }

    /// Replace the generated id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn has_places(&self) -> bool {
        self.sender == Sender::Ai && !self.places.is_empty()
    }

    /// Place with exactly this title, preferring the first one that plots
    pub fn place_titled(&self, title: &str) -> Option<&Place> {
        let mut titled = self.places.iter().filter(|p| p.title == title);
        let first = titled.clone().next();
        titled.find(|p| p.map_position().is_some()).or(first)
    }
}

#[cfg(test)]
pub(crate) fn sample_place(title: &str, index: usize, lat: f64, lng: f64) -> Place {
    Place {
        id: Place::make_id(title, index),
        title: title.to_string(),
        address: format!("{} Lê Lợi, Quận 1", index + 1),
        latitude: lat,
        longitude: lng,
        rating: Some(4.5),
        review_count: Some(120),
        price_range: Some("30,000đ - 70,000đ".to_string()),
        opening_hours: Some("07:00 - 22:00".to_string()),
        reason: "- Không gian yên tĩnh.".to_string(),
        popular_reviews: Vec::new(),
        images: vec!["https://images.unsplash.com/photo-1541167760496-1628856ab772".to_string()],
        source: Some("Google Maps".to_string()),
        confidence: Some(0.9),
    }
}
