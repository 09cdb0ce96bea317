//! Recommendation service
//!
//! The AI backend is opaque: it receives the user's message, the prior
//! conversation and the current settings, and must answer with a summary
//! plus a list of places. Any failure becomes a canned chat reply so the
//! session stays usable.

pub mod gemini;
pub mod prompt;
pub mod schema;

use crate::chat::{Message, Place};
use crate::constants::messages;
use crate::error::{Error, Result};
use crate::session::settings::UserSettings;
use serde::{Deserialize, Serialize};
use tracing::error;

/// One prior message as the AI sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// "user" or "model"
    pub role: String,
    pub text: String,
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.sender.role().to_string(),
            text: message.text.clone(),
        }
    }
}

/// Everything sent for one recommendation
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRequest {
    pub message: String,
    pub history: Vec<ChatTurn>,
    pub settings: UserSettings,
}

/// A validated AI answer
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub summary: String,
    pub places: Vec<Place>,
}

/// Trait for recommendation backends
pub trait Recommender: Send + Sync {
    fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> impl std::future::Future<Output = Result<Recommendation>> + Send;

    /// Whether a credential is available
    fn is_configured(&self) -> bool;
}

/// What gets appended to the chat
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub places: Vec<Place>,
}

impl From<Recommendation> for Reply {
    fn from(recommendation: Recommendation) -> Self {
        Self {
            text: recommendation.summary,
            places: recommendation.places,
        }
    }
}

/// Canned chat text for a failed exchange
pub fn failure_message(err: &Error) -> &'static str {
    match err {
        Error::MissingCredential(_) => messages::MISSING_CREDENTIAL,
        Error::MalformedResponse(_) | Error::Json(_) => messages::MALFORMED_RESPONSE,
        _ => messages::NETWORK_FAILURE,
    }
}

/// Ask the recommender and turn any failure into a canned reply
pub async fn reply_to<R: Recommender>(recommender: &R, request: &RecommendationRequest) -> Reply {
    match recommender.recommend(request).await {
        Ok(recommendation) => recommendation.into(),
        Err(e) => {
            error!("Error fetching recommendation: {}", e);
            Reply {
                text: failure_message(&e).to_string(),
                places: Vec::new(),
            }
        }
    }
}
