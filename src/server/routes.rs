//! HTTP API routes
//!
//! Every session endpoint answers with a fresh [`SessionSnapshot`], so the
//! page redraws from one shape.

use crate::ai::Recommender;
use crate::error::Error;
use crate::geo::{Coordinates, GeoBackend};
use crate::server::state::AppState;
use crate::session::selection::SelectionSource;
use crate::session::{SessionSnapshot, SettingsForm};

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::warn;

/// Create the API router
pub fn create_router<G, R>(state: Arc<AppState<G, R>>) -> Router
where
    G: GeoBackend + 'static,
    R: Recommender + 'static,
{
    // Try relative to cwd first, then next to the executable
    let static_path = if std::path::Path::new("static").exists() {
        "static".to_string()
    } else if let Some(path) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("static")))
        .filter(|path| path.exists())
    {
        path.to_string_lossy().to_string()
    } else {
        "static".to_string()
    };

    Router::new()
        .route("/api/status", get(status_handler::<G, R>))
        .route(
            "/api/session",
            get(session_handler::<G, R>).delete(reset_handler::<G, R>),
        )
        .route("/api/settings", put(settings_handler::<G, R>))
        .route("/api/location", post(location_handler::<G, R>))
        .route("/api/chat", post(chat_handler::<G, R>))
        .route("/api/select", post(select_handler::<G, R>))
        .fallback_service(ServeDir::new(&static_path).append_index_html_on_directories(true))
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn new(code: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "INVALID_SETTINGS" | "INVALID_COORDINATES" | "INVALID_REQUEST" => {
                StatusCode::BAD_REQUEST
            }
            "UNKNOWN_PLACE" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidSettings(_) => "INVALID_SETTINGS",
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::InvalidRequest(_) => "INVALID_REQUEST",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

type Snapshot = Result<Json<SessionSnapshot>, ApiError>;

async fn snapshot<G, R>(state: &AppState<G, R>) -> Json<SessionSnapshot>
where
    G: GeoBackend + 'static,
    R: Recommender + 'static,
{
    Json(state.session().lock().await.snapshot())
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Recommendation model name
    pub model: String,
    /// Whether the AI credential is present
    pub ai_configured: bool,
    /// Geocoder base URL
    pub geocoder: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<G, R>(State(state): State<Arc<AppState<G, R>>>) -> Json<StatusResponse>
where
    G: GeoBackend + 'static,
    R: Recommender + 'static,
{
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.config.ai.model.clone(),
        ai_configured: state.recommender().is_configured(),
        geocoder: state.config.geocoding.endpoint.clone(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Current session
///
/// GET /api/session
async fn session_handler<G, R>(State(state): State<Arc<AppState<G, R>>>) -> Json<SessionSnapshot>
where
    G: GeoBackend + 'static,
    R: Recommender + 'static,
{
    snapshot(&state).await
}

/// Start the conversation over
///
/// DELETE /api/session
async fn reset_handler<G, R>(State(state): State<Arc<AppState<G, R>>>) -> Json<SessionSnapshot>
where
    G: GeoBackend + 'static,
    R: Recommender + 'static,
{
    let mut session = state.session().lock().await;
    session.clear_conversation();
    Json(session.snapshot())
}

/// Replace the settings
///
/// PUT /api/settings
async fn settings_handler<G, R>(
    State(state): State<Arc<AppState<G, R>>>,
    Json(form): Json<SettingsForm>,
) -> Snapshot
where
    G: GeoBackend + 'static,
    R: Recommender + 'static,
{
    let location_changed = state.session().lock().await.replace_settings(form)?;
    if location_changed {
        state.schedule_geocode();
    }
    Ok(snapshot(&state).await)
}

/// What the page reports after asking for device geolocation
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LocationReport {
    Position { lat: f64, lng: f64 },
    Failure { error: String },
}

/// Device geolocation outcome
///
/// POST /api/location
async fn location_handler<G, R>(
    State(state): State<Arc<AppState<G, R>>>,
    Json(report): Json<LocationReport>,
) -> Snapshot
where
    G: GeoBackend + 'static,
    R: Recommender + 'static,
{
    match report {
        LocationReport::Position { lat, lng } => {
            state
                .session()
                .lock()
                .await
                .apply_device_position(Coordinates::new(lat, lng))?;
        }
        LocationReport::Failure { error } => {
            warn!("Device geolocation unavailable: {}", error);
        }
    }
    Ok(snapshot(&state).await)
}

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Send a chat message and wait for the reply
///
/// POST /api/chat
async fn chat_handler<G, R>(
    State(state): State<Arc<AppState<G, R>>>,
    Json(req): Json<ChatRequest>,
) -> Snapshot
where
    G: GeoBackend + 'static,
    R: Recommender + 'static,
{
    state.send_message(&req.message).await?;
    Ok(snapshot(&state).await)
}

/// Selection request body
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub place_id: String,
    pub source: SelectionSource,
}

/// Select a place from a chat link or map marker
///
/// POST /api/select
async fn select_handler<G, R>(
    State(state): State<Arc<AppState<G, R>>>,
    Json(req): Json<SelectRequest>,
) -> Snapshot
where
    G: GeoBackend + 'static,
    R: Recommender + 'static,
{
    let mut session = state.session().lock().await;
    if !session.select(&req.place_id, req.source) {
        return Err(ApiError::new(
            "UNKNOWN_PLACE",
            format!("Place is not currently shown: {}", req.place_id),
        ));
    }
    Ok(Json(session.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{StubRecommender, StubReply};
    use crate::ai::Recommendation;
    use crate::chat::sample_place;
    use crate::config::Config;
    use crate::constants::location::CURRENT_LOCATION;
    use crate::constants::messages;
    use crate::geo::testing::StubGeocoder;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    type TestState = AppState<StubGeocoder, StubRecommender>;

    fn create_test_state(replies: Vec<StubReply>) -> Arc<TestState> {
        Arc::new(AppState::new(
            Config::default(),
            StubGeocoder::new(),
            StubRecommender::new(replies),
        ))
    }

    fn two_cafes() -> StubReply {
        StubReply::Ok(Recommendation {
            summary: "1️⃣ **Café A**\n2️⃣ **Café B**".to_string(),
            places: vec![
                sample_place("Café A", 0, 10.77, 106.70),
                sample_place("Café B", 1, 10.78, 106.71),
            ],
        })
    }

    async fn send(
        state: &Arc<TestState>,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let app = create_router(Arc::clone(state));
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let state = create_test_state(Vec::new());
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();

        assert!(status.running);
        assert!(status.ai_configured);
        assert_eq!(status.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_initial_session() {
        let state = create_test_state(Vec::new());
        let (status, body) = send(&state, "GET", "/api/session", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["id"], messages::GREETING_ID);
        assert_eq!(body["settings"]["price_range"], "mid");
        assert!(body["map"].is_null());
        assert!(body["selected_place_id"].is_null());
    }

    #[tokio::test]
    async fn test_chat_renders_links_and_map() {
        let state = create_test_state(vec![two_cafes()]);
        let (status, body) = send(
            &state,
            "POST",
            "/api/chat",
            Some(json!({ "message": "quán yên tĩnh" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let latest = &body["messages"][2];
        assert_eq!(latest["sender"], "ai");
        assert_eq!(latest["has_map"], true);
        assert_eq!(latest["segments"][1]["kind"], "place_link");
        assert_eq!(latest["segments"][1]["place_id"], "Café-A-0");
        assert_eq!(body["map"]["markers"].as_array().unwrap().len(), 2);
        assert_eq!(body["map"]["camera"]["kind"], "fit_bounds");
    }

    #[tokio::test]
    async fn test_chat_failure_is_a_canned_reply() {
        let state = create_test_state(vec![StubReply::Malformed]);
        let (status, body) = send(
            &state,
            "POST",
            "/api/chat",
            Some(json!({ "message": "hi" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["messages"][2]["segments"][0]["text"],
            messages::MALFORMED_RESPONSE
        );
        assert_eq!(body["messages"][2]["has_map"], false);
    }

    #[tokio::test]
    async fn test_empty_chat_message_is_rejected() {
        let state = create_test_state(Vec::new());
        let (status, body) = send(
            &state,
            "POST",
            "/api/chat",
            Some(json!({ "message": "  " })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
        assert!(state.recommender().requests().is_empty());
    }

    #[tokio::test]
    async fn test_select_flies_to_marker() {
        let state = create_test_state(vec![two_cafes()]);
        send(&state, "POST", "/api/chat", Some(json!({ "message": "x" }))).await;

        let (status, body) = send(
            &state,
            "POST",
            "/api/select",
            Some(json!({ "place_id": "Café-B-1", "source": "map_marker" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected_place_id"], "Café-B-1");
        assert_eq!(body["map"]["open_popup"], "Café-B-1");
        assert_eq!(body["map"]["camera"]["kind"], "fly_to");
        assert_eq!(body["map"]["camera"]["zoom"], 16);
    }

    #[tokio::test]
    async fn test_select_unknown_place() {
        let state = create_test_state(vec![two_cafes()]);
        send(&state, "POST", "/api/chat", Some(json!({ "message": "x" }))).await;

        let (status, body) = send(
            &state,
            "POST",
            "/api/select",
            Some(json!({ "place_id": "nope", "source": "chat_link" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "UNKNOWN_PLACE");
    }

    #[tokio::test]
    async fn test_settings_replace_and_validation() {
        let state = create_test_state(Vec::new());
        let form = json!({
            "location": "Quận 1, TP.HCM",
            "food_types": "Trà sữa",
            "price_range": "budget",
            "distance_km": 2
        });
        let (status, body) = send(&state, "PUT", "/api/settings", Some(form)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["settings"]["food_types"], "Trà sữa");
        assert_eq!(body["settings"]["distance_km"], 2);

        let bad = json!({
            "location": "Quận 1, TP.HCM",
            "food_types": "Trà sữa",
            "price_range": "budget",
            "distance_km": 40
        });
        let (status, body) = send(&state, "PUT", "/api/settings", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_SETTINGS");
        assert_eq!(state.session().lock().await.settings().distance_km, 2);
    }

    #[tokio::test]
    async fn test_location_position_and_failure() {
        let state = create_test_state(Vec::new());

        let (status, _) = send(
            &state,
            "POST",
            "/api/location",
            Some(json!({ "error": "User denied Geolocation" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            state.session().lock().await.settings().location,
            "Quận 1, TP.HCM"
        );

        let (status, body) = send(
            &state,
            "POST",
            "/api/location",
            Some(json!({ "lat": 10.8, "lng": 106.65 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["settings"]["location"], CURRENT_LOCATION);
        assert_eq!(body["settings"]["coordinates"]["lat"], 10.8);

        let (status, body) = send(
            &state,
            "POST",
            "/api/location",
            Some(json!({ "lat": 100.0, "lng": 106.65 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_COORDINATES");
    }

    #[tokio::test]
    async fn test_reset_session() {
        let state = create_test_state(vec![two_cafes()]);
        send(&state, "POST", "/api/chat", Some(json!({ "message": "x" }))).await;

        let (status, body) = send(&state, "DELETE", "/api/session", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert!(body["map"].is_null());
    }
}
