//! Selected-place state
//!
//! Marker clicks and inline chat links both arrive as [`SelectionEvent`]s
//! and converge on the same state update.

use serde::{Deserialize, Serialize};

/// Where a selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    ChatLink,
    MapMarker,
}

/// Input to the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    Activate {
        place_id: String,
        source: SelectionSource,
    },
    /// A new user message starts a fresh recommendation cycle
    UserMessageSent,
}

/// NoSelection / Selected(place id)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionCoordinator {
    selected: Option<String>,
}

impl SelectionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, place_id: &str) -> bool {
        self.selected.as_deref() == Some(place_id)
    }

    /// Apply an event and return the resulting selection
    pub fn handle(&mut self, event: SelectionEvent) -> Option<&str> {
        match event {
            SelectionEvent::Activate { place_id, .. } => self.selected = Some(place_id),
            SelectionEvent::UserMessageSent => self.selected = None,
        }
        self.selected()
    }

    /// Drop a selection whose place is no longer rendered
    ///
    /// Returns true if the selection was cleared.
    pub fn retain<F: Fn(&str) -> bool>(&mut self, exists: F) -> bool {
        let dangling = self.selected.as_deref().is_some_and(|id| !exists(id));
        if dangling {
            self.selected = None;
        }
        dangling
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
