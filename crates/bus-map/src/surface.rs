//! # Map Surface
//!
//! The imperative map API the marker layer drives. A real mapping provider
//! sits behind this trait in a browser build; the in-memory and logging
//! surfaces here back tests and the command-line runner.

use std::collections::BTreeMap;

use bus_domain::{Coordinates, VehicleId};
use serde::Serialize;
use tracing::{debug, info};

/// Identity of a marker on the surface
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MarkerKey {
    Bus(VehicleId),
    Stop(usize),
    University,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarkerKind {
    Bus,
    Stop,
    University,
    Viewer,
}

/// Everything needed to draw one marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Coordinates,
    pub title: String,
    /// Info-window text opened on click
    pub info: Option<String>,
    pub icon_px: u32,
    pub color: &'static str,
}

/// Imperative map operations
pub trait MapSurface {
    fn set_view(&mut self, center: Coordinates, zoom: u8);

    fn add_marker(&mut self, key: MarkerKey, marker: Marker);

    /// Move an existing marker and refresh its title and info text
    fn update_marker(&mut self, key: &MarkerKey, marker: Marker);

    fn remove_marker(&mut self, key: &MarkerKey);

    /// Draw or redraw the line from a bus to its destination
    fn set_route(&mut self, id: &VehicleId, from: Coordinates, to: Coordinates);

    fn remove_route(&mut self, id: &VehicleId);
}

/// Surface keeping its state in memory
#[derive(Debug, Default)]
pub struct MemorySurface {
    pub center: Option<(Coordinates, u8)>,
    pub markers: BTreeMap<MarkerKey, Marker>,
    pub routes: BTreeMap<VehicleId, (Coordinates, Coordinates)>,
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self, key: &MarkerKey) -> Option<&Marker> {
        self.markers.get(key)
    }

    pub fn bus_markers(&self) -> impl Iterator<Item = (&VehicleId, &Marker)> {
        self.markers.iter().filter_map(|(key, marker)| match key {
            MarkerKey::Bus(id) => Some((id, marker)),
            _ => None,
        })
    }
}

impl MapSurface for MemorySurface {
    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        self.center = Some((center, zoom));
    }

    fn add_marker(&mut self, key: MarkerKey, marker: Marker) {
        self.created += 1;
        self.markers.insert(key, marker);
    }

    fn update_marker(&mut self, key: &MarkerKey, marker: Marker) {
        if let Some(existing) = self.markers.get_mut(key) {
            self.updated += 1;
            *existing = marker;
        }
    }

    fn remove_marker(&mut self, key: &MarkerKey) {
        if self.markers.remove(key).is_some() {
            self.removed += 1;
        }
    }

    fn set_route(&mut self, id: &VehicleId, from: Coordinates, to: Coordinates) {
        self.routes.insert(id.clone(), (from, to));
    }

    fn remove_route(&mut self, id: &VehicleId) {
        self.routes.remove(id);
    }
}

/// Surface that reports every operation through `tracing`
#[derive(Debug, Default)]
pub struct LogSurface;

impl MapSurface for LogSurface {
    fn set_view(&mut self, center: Coordinates, zoom: u8) {
        info!(%center, zoom, "map view set");
    }

    fn add_marker(&mut self, key: MarkerKey, marker: Marker) {
        debug!(?key, title = %marker.title, position = %marker.position, "marker added");
    }

    fn update_marker(&mut self, key: &MarkerKey, marker: Marker) {
        debug!(?key, title = %marker.title, position = %marker.position, "marker moved");
    }

    fn remove_marker(&mut self, key: &MarkerKey) {
        debug!(?key, "marker removed");
    }

    fn set_route(&mut self, id: &VehicleId, from: Coordinates, to: Coordinates) {
        let km = from.distance_to_km(&to);
        debug!(vehicle = %id, %from, %to, km, "route drawn");
    }

    fn remove_route(&mut self, id: &VehicleId) {
        debug!(vehicle = %id, "route removed");
    }
}
