//! Server shared state
//!
//! Holds configuration, the single chat session, and the geocoding and
//! recommendation backends. The session lock is only held for state
//! updates, never across a network call.

use crate::ai::gemini::GeminiClient;
use crate::ai::{reply_to, Recommender, Reply};
use crate::config::Config;
use crate::error::Result;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::resolver::{GeocodeResolver, LocationInput};
use crate::geo::GeoBackend;
use crate::session::debounce::Debouncer;
use crate::session::Session;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// State with the production backends
pub type LiveState = AppState<NominatimBackend, GeminiClient>;

/// Shared state for the HTTP server
pub struct AppState<G, R> {
    /// Configuration
    pub config: Config,

    session: Mutex<Session>,
    resolver: GeocodeResolver<G>,
    recommender: R,
    debouncer: Debouncer,
    started: Instant,
}

impl<G, R> AppState<G, R>
where
    G: GeoBackend + 'static,
    R: Recommender + 'static,
{
    /// Create new application state
    pub fn new(config: Config, geocoder: G, recommender: R) -> Self {
        let resolver = GeocodeResolver::from_config(geocoder, &config.geocoding);
        let debouncer = Debouncer::from_millis(config.geocoding.debounce_ms);
        Self {
            session: Mutex::new(Session::new(config.map.clone())),
            resolver,
            recommender,
            debouncer,
            started: Instant::now(),
            config,
        }
    }

    pub fn session(&self) -> &Mutex<Session> {
        &self.session
    }

    pub fn resolver(&self) -> &GeocodeResolver<G> {
        &self.resolver
    }

    pub fn recommender(&self) -> &R {
        &self.recommender
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Geocode the current location once input has been quiet long enough
    pub fn schedule_geocode(self: &Arc<Self>) {
        let ticket = self.debouncer.trigger();
        let state = Arc::clone(self);
        tokio::spawn(async move {
            if state.debouncer.settle(ticket).await {
                state.run_geocode().await;
            } else {
                debug!("Geocode superseded by newer input");
            }
        });
    }

    /// Resolve the current location text and apply the outcome
    ///
    /// Returns whether the result was applied.
    pub async fn run_geocode(&self) -> bool {
        let location = self.session.lock().await.settings().location.clone();

        let coords = match LocationInput::classify(&location) {
            LocationInput::Empty => None,
            LocationInput::CurrentLocation => {
                debug!("Location is the device position; nothing to geocode");
                return false;
            }
            LocationInput::Address(raw) => self
                .resolver
                .resolve(raw)
                .await
                .map(|hit| hit.coordinates()),
        };

        let applied = self.session.lock().await.apply_geocode(&location, coords);
        if applied {
            info!(
                "Coordinates for {:?} set to {:?}",
                location,
                coords.map(|c| (c.lat, c.lng))
            );
        }
        applied
    }

    /// Run one chat exchange
    ///
    /// A reply that arrives after the conversation was cleared is returned
    /// but not recorded.
    pub async fn send_message(&self, text: &str) -> Result<Reply> {
        let pending = self.session.lock().await.begin_exchange(text)?;
        let reply = reply_to(&self.recommender, &pending.request).await;
        if !self
            .session
            .lock()
            .await
            .finish_exchange(pending.ticket, reply.clone())
        {
            info!("Conversation was cleared while a reply was pending");
        }
        Ok(reply)
    }
}

impl LiveState {
    /// Build state with the Nominatim and Gemini backends
    pub fn live(config: Config) -> Result<Self> {
        let geocoder = crate::geo::get_geocoder(&config.geocoding)?;
        let recommender = GeminiClient::from_config(&config);
        Ok(Self::new(config, geocoder, recommender))
    }
}
