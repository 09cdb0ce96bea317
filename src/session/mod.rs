//! Session context
//!
//! One [`Session`] holds everything a chat session mutates: settings, the
//! message log, the selection and the map. Callers drive it through
//! methods; network work happens outside and its results are applied back
//! through [`Session::apply_geocode`] and [`Session::finish_exchange`].

pub mod debounce;
pub mod selection;
pub mod settings;

use crate::ai::{ChatTurn, RecommendationRequest, Reply};
use crate::chat::render::{render_message, RenderedMessage};
use crate::chat::{Message, Place, Sender};
use crate::config::MapConfig;
use crate::constants::location::CURRENT_LOCATION;
use crate::constants::messages::{GREETING, GREETING_ID};
use crate::error::{Error, Result};
use crate::geo::Coordinates;
use crate::map::scene::MapScene;
use crate::map::MapViewController;
use selection::{SelectionCoordinator, SelectionEvent, SelectionSource};
use serde::{Deserialize, Serialize};
use settings::{PriceRange, UserSettings};
use tracing::{debug, info};

/// Settings as submitted by the form; coordinates are owned by the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsForm {
    pub location: String,
    pub food_types: String,
    pub price_range: PriceRange,
    pub distance_km: u8,
}

impl From<&UserSettings> for SettingsForm {
    fn from(settings: &UserSettings) -> Self {
        Self {
            location: settings.location.clone(),
            food_types: settings.food_types.clone(),
            price_range: settings.price_range,
            distance_km: settings.distance_km,
        }
    }
}

/// Everything the page needs to redraw
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub settings: UserSettings,
    pub messages: Vec<RenderedMessage>,
    pub selected_place_id: Option<String>,
    pub loading: bool,
    pub map: Option<MapScene>,
}

/// Identifies one in-flight exchange
///
/// Tickets are invalidated by [`Session::clear_conversation`]; a reply
/// carrying an old ticket is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeTicket(u64);

/// A started exchange: the ticket to finish it with and the AI request
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub ticket: ExchangeTicket,
    pub request: RecommendationRequest,
}

#[derive(Debug)]
pub struct Session {
    settings: UserSettings,
    messages: Vec<Message>,
    selection: SelectionCoordinator,
    map: MapViewController,
    loading: bool,
    conversation: u64,
}

impl Session {
    pub fn new(map: MapConfig) -> Self {
        Self {
            settings: UserSettings::default(),
            messages: vec![greeting()],
            selection: SelectionCoordinator::new(),
            map: MapViewController::new(map),
            loading: false,
            conversation: 0,
        }
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.selected()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn map(&self) -> &MapViewController {
        &self.map
    }

    /// Replace the settings as one object
    ///
    /// Held coordinates are kept until a geocode result replaces them.
    /// Returns true when the location text changed.
    pub fn replace_settings(&mut self, form: SettingsForm) -> Result<bool> {
        let next = UserSettings {
            location: form.location,
            food_types: form.food_types,
            price_range: form.price_range,
            distance_km: form.distance_km,
            coordinates: self.settings.coordinates,
        };
        next.validate()?;

        let changed = next.location != self.settings.location;
        self.settings = next;
        Ok(changed)
    }

    /// Device geolocation succeeded
    pub fn apply_device_position(&mut self, coords: Coordinates) -> Result<()> {
        coords.validate()?;
        info!("Device position received: [{}, {}]", coords.lat, coords.lng);
        self.settings = UserSettings {
            location: CURRENT_LOCATION.to_string(),
            coordinates: Some(coords),
            ..self.settings.clone()
        };
        Ok(())
    }

    /// Apply a geocode outcome for `target`
    ///
    /// Dropped (returns false) when the location has changed since the
    /// lookup started.
    pub fn apply_geocode(&mut self, target: &str, coords: Option<Coordinates>) -> bool {
        if self.settings.location != target {
            debug!(
                "Discarding geocode result for {:?}; location is now {:?}",
                target, self.settings.location
            );
            return false;
        }
        self.settings = self.settings.with_coordinates(coords);
        true
    }

    /// Record a user message and build the AI request for it
    pub fn begin_exchange(&mut self, text: &str) -> Result<PendingExchange> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::InvalidRequest("message is empty".to_string()));
        }
        if self.loading {
            return Err(Error::InvalidRequest(
                "a reply is still being generated".to_string(),
            ));
        }

        let history = self
            .messages
            .iter()
            .filter(|m| m.id != GREETING_ID)
            .map(ChatTurn::from)
            .collect();

        self.messages.push(Message::user(text));
        self.selection.handle(SelectionEvent::UserMessageSent);
        self.loading = true;

        Ok(PendingExchange {
            ticket: ExchangeTicket(self.conversation),
            request: RecommendationRequest {
                message: text.to_string(),
                history,
                settings: self.settings.clone(),
            },
        })
    }

    /// Append the AI reply and put its places on the map
    ///
    /// Returns false (and changes nothing) when the conversation was
    /// cleared after `ticket` was issued.
    pub fn finish_exchange(&mut self, ticket: ExchangeTicket, reply: Reply) -> bool {
        if ticket != ExchangeTicket(self.conversation) {
            debug!("Dropping reply for a cleared conversation");
            return false;
        }
        self.loading = false;
        let has_places = !reply.places.is_empty();
        self.messages.push(Message::ai(reply.text, reply.places));

        if has_places {
            let coords = self.settings.coordinates;
            self.map.mount(coords);
            let places = self.current_places().to_vec();
            let report = self.map.show(&places, coords);
            info!(
                "Map updated: {} markers, {} skipped, {} duplicate titles",
                report.added,
                report.skipped.len(),
                report.duplicates
            );
        } else {
            self.map.unmount();
        }
        self.prune_selection();
        true
    }

    /// Places of the latest AI message
    pub fn current_places(&self) -> &[Place] {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Ai)
            .map(|m| m.places.as_slice())
            .unwrap_or_default()
    }

    /// Select a currently rendered place
    ///
    /// Returns false (and changes nothing) for an unknown id.
    pub fn select(&mut self, place_id: &str, source: SelectionSource) -> bool {
        if !self.current_places().iter().any(|p| p.id == place_id) {
            debug!("Ignoring selection of unknown place {:?}", place_id);
            return false;
        }
        self.selection.handle(SelectionEvent::Activate {
            place_id: place_id.to_string(),
            source,
        });
        self.map.focus(place_id);
        true
    }

    /// Start over with a fresh greeting, keeping settings
    pub fn clear_conversation(&mut self) {
        self.messages = vec![greeting()];
        self.selection.clear();
        self.map.unmount();
        self.loading = false;
        self.conversation += 1;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let latest_ai = self
            .messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Ai)
            .map(|m| m.id.as_str());
        let selected = self.selection.selected();

        let messages = self
            .messages
            .iter()
            .map(|m| {
                let highlight = if Some(m.id.as_str()) == latest_ai {
                    selected
                } else {
                    None
                };
                render_message(m, highlight)
            })
            .collect();

        SessionSnapshot {
            settings: self.settings.clone(),
            messages,
            selected_place_id: selected.map(str::to_string),
            loading: self.loading,
            map: self.map.scene().cloned(),
        }
    }

    fn prune_selection(&mut self) {
        let ids: Vec<String> = self.current_places().iter().map(|p| p.id.clone()).collect();
        let cleared = self.selection.retain(|id| ids.iter().any(|known| known == id));
        if cleared {
            debug!("Selection cleared; place is no longer rendered");
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

fn greeting() -> Message {
    Message::ai(GREETING, Vec::new()).with_id(GREETING_ID)
}
