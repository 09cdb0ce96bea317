//! Gemini recommendation backend
//!
//! Calls the Generative Language `generateContent` REST endpoint with a
//! JSON response schema. The API key is read once at construction; when it
//! is absent every request fails with [`Error::MissingCredential`].

use crate::ai::prompt::{response_schema, system_instruction};
use crate::ai::schema::parse_recommendation;
use crate::ai::{Recommendation, RecommendationRequest, Recommender};
use crate::config::Config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Gemini API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

impl GeminiClient {
    /// Create a client; `api_key` may be missing
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        api_key_env: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            api_key_env: api_key_env.into(),
        }
    }

    /// Create a client from config, reading the key from the environment
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ai.endpoint.clone(),
            config.ai.model.clone(),
            config.api_key(),
            config.ai.api_key_env.clone(),
        )
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn build_request(request: &RecommendationRequest) -> GenerateRequest {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|turn| Content::text(Some(turn.role.as_str()), &turn.text))
            .collect();
        contents.push(Content::text(Some("user"), &request.message));

        GenerateRequest {
            system_instruction: Content::text(None, &system_instruction(&request.settings)),
            contents,
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        }
    }

    /// Concatenated text of the first candidate
    fn extract_text(response: GenerateResponse) -> Result<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::MalformedResponse("response has no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::MalformedResponse(format!(
                "candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

impl Recommender for GeminiClient {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Recommendation> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::MissingCredential(format!(
                "API key not found. Please set the {} environment variable.",
                self.api_key_env
            ))
        })?;

        info!(
            "Requesting recommendations from {} ({} history turns)",
            self.model,
            request.history.len()
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&Self::build_request(request))
            .send()
            .await
            .map_err(|e| Error::Network(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "Gemini returned status {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse Gemini response: {}", e)))?;

        let text = Self::extract_text(body)?;
        debug!("Gemini returned {} bytes of JSON", text.len());
        parse_recommendation(&text)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ChatTurn;
    use crate::session::settings::UserSettings;

    fn request() -> RecommendationRequest {
        RecommendationRequest {
            message: "quán có view đẹp".to_string(),
            history: vec![
                ChatTurn {
                    role: "user".to_string(),
                    text: "chào".to_string(),
                },
                ChatTurn {
                    role: "model".to_string(),
                    text: "Chào bạn!".to_string(),
                },
            ],
            settings: UserSettings::default(),
        }
    }

    #[tokio::test]
    async fn test_missing_credential_fails_request() {
        let client = GeminiClient::new("http://127.0.0.1:9", "gemini-2.5-flash", None, "API_KEY");
        assert!(!client.is_configured());

        let err = client.recommend(&request()).await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential(_)));
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_url() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com/v1beta/",
            "gemini-2.5-flash",
            Some("k".to_string()),
            "API_KEY",
        );
        assert_eq!(
            client.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GeminiClient::build_request(&request())).unwrap();

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "quán có view đẹp");

        assert!(body["systemInstruction"].get("role").is_none());
        assert!(body["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Quận 1, TP.HCM"));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_extract_text() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"summary\":" }, { "text": "\"ok\",\"places\":[]}" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        let text = GeminiClient::extract_text(response).unwrap();
        assert_eq!(parse_recommendation(&text).unwrap().summary, "ok");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let response: GenerateResponse =
            serde_json::from_value(serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .unwrap();
        assert!(matches!(
            GeminiClient::extract_text(response),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_extract_text_empty_candidate() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();
        let err = GeminiClient::extract_text(response).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }
}
