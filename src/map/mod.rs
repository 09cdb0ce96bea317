//! Map view controller
//!
//! Owns the single map scene: mounting, marker reconciliation against the
//! current place list, camera framing, and fly-to on selection. Nothing
//! else mutates the scene.

pub mod scene;

use crate::chat::Place;
use crate::config::MapConfig;
use crate::geo::Coordinates;
use scene::{Bounds, Camera, MapScene, Marker, Popup};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Markers plotted
    pub added: usize,
    /// Titles skipped because they had no usable coordinates
    pub skipped: Vec<String>,
    /// Plottable places dropped because an earlier marker had the same title
    pub duplicates: usize,
}

/// Drives the map scene
#[derive(Debug, Clone)]
pub struct MapViewController {
    config: MapConfig,
    scene: Option<MapScene>,
}

impl MapViewController {
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            scene: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.scene.is_some()
    }

    pub fn scene(&self) -> Option<&MapScene> {
        self.scene.as_ref()
    }

    /// Create the scene, centered on `coords` or the city default
    ///
    /// Returns false without touching anything if a scene is already live.
    pub fn mount(&mut self, coords: Option<Coordinates>) -> bool {
        if self.scene.is_some() {
            return false;
        }
        let center = coords
            .unwrap_or_else(|| Coordinates::new(self.config.center_lat, self.config.center_lng));
        self.scene = Some(MapScene::new(Camera::SetView {
            center,
            zoom: self.config.default_zoom,
        }));
        debug!("Map mounted at [{}, {}]", center.lat, center.lng);
        true
    }

    /// Release the scene and all markers
    pub fn unmount(&mut self) -> bool {
        self.scene.take().is_some()
    }

    /// Replace all markers with the given places and reframe the camera
    ///
    /// `fallback` centers the camera when nothing could be plotted.
    pub fn show(&mut self, places: &[Place], fallback: Option<Coordinates>) -> ReconcileReport {
        let Some(scene) = self.scene.as_mut() else {
            debug!("Ignoring place update while the map is not mounted");
            return ReconcileReport::default();
        };

        scene.markers.clear();
        scene.open_popup = None;

        let mut report = ReconcileReport::default();
        let mut titles = HashSet::new();

        for place in places {
            match place.map_position() {
                Some(_) if !titles.insert(place.title.as_str()) => {
                    report.duplicates += 1;
                }
                Some(position) => {
                    info!(
                        "Marker added for {} at [{}, {}]",
                        place.title, position.lat, position.lng
                    );
                    scene.markers.push(Marker {
                        place_id: place.id.clone(),
                        title: place.title.clone(),
                        position,
                        popup: Popup::from(place),
                    });
                    report.added += 1;
                }
                None => {
                    warn!("Missing coordinates for {:?}", place.title);
                    report.skipped.push(place.title.clone());
                }
            }
        }

        if let Some(bounds) = Bounds::around(scene.markers.iter().map(|m| m.position)) {
            scene.camera = Camera::FitBounds {
                bounds: bounds.pad(self.config.fit_padding),
            };
        } else if let Some(center) = fallback {
            scene.camera = Camera::SetView {
                center,
                zoom: self.config.default_zoom,
            };
        }
        scene.revision += 1;

        report
    }

    pub fn has_marker(&self, place_id: &str) -> bool {
        self.scene
            .as_ref()
            .is_some_and(|scene| scene.marker(place_id).is_some())
    }

    /// Fly to a marker and open its popup
    ///
    /// Returns false when there is no marker for the id.
    pub fn focus(&mut self, place_id: &str) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        let Some(position) = scene.marker(place_id).map(|m| m.position) else {
            debug!("No marker for {:?}; camera unchanged", place_id);
            return false;
        };

        scene.camera = Camera::FlyTo {
            center: position,
            zoom: self.config.focus_zoom,
        };
        scene.open_popup = Some(place_id.to_string());
        scene.revision += 1;
        true
    }
}

impl Default for MapViewController {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}
