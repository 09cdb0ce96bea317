//! Strict parsing of the model's JSON answer
//!
//! The answer must be an object with `summary` and `places`; every place
//! must carry its required fields. Anything else is rejected as a whole
//! rather than producing partial places.

use crate::ai::Recommendation;
use crate::chat::Place;
use crate::constants::messages::SUMMARY_FALLBACK;
use crate::error::{Error, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RawRecommendation {
    summary: String,
    places: Vec<RawPlace>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
    reason: String,
    images: Vec<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    review_count: Option<f64>,
    #[serde(default)]
    price_range: Option<String>,
    #[serde(default)]
    opening_hours: Option<String>,
    #[serde(default)]
    popular_reviews: Option<Vec<String>>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl RawPlace {
    fn into_place(self, index: usize) -> Result<Place> {
        let title = self.name.trim().to_string();
        if title.is_empty() {
            return Err(Error::MalformedResponse(format!(
                "place {} has an empty name",
                index
            )));
        }

        let confidence = self.confidence.filter(|c| {
            let valid = (0.0..=1.0).contains(c);
            if !valid {
                debug!("Dropping out-of-range confidence {} for {}", c, title);
            }
            valid
        });

        Ok(Place {
            id: Place::make_id(&title, index),
            address: self.address.trim().to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            rating: self.rating.filter(|r| (0.0..=5.0).contains(r)),
            review_count: self
                .review_count
                .filter(|n| n.is_finite() && *n >= 0.0)
                .map(|n| n.round() as u64),
            price_range: non_blank(self.price_range),
            opening_hours: non_blank(self.opening_hours),
            reason: self.reason,
            popular_reviews: self.popular_reviews.unwrap_or_default(),
            images: self
                .images
                .into_iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect(),
            source: non_blank(self.source),
            confidence,
            title,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Drop a Markdown code fence the model sometimes wraps around JSON
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse and validate the model's text output
pub fn parse_recommendation(text: &str) -> Result<Recommendation> {
    let raw: RawRecommendation = serde_json::from_str(strip_fence(text))
        .map_err(|e| Error::MalformedResponse(format!("invalid recommendation JSON: {}", e)))?;

    let places = raw
        .places
        .into_iter()
        .enumerate()
        .map(|(index, place)| place.into_place(index))
        .collect::<Result<Vec<_>>>()?;

    let summary = if raw.summary.trim().is_empty() {
        SUMMARY_FALLBACK.to_string()
    } else {
        raw.summary
    };

    Ok(Recommendation { summary, places })
}
