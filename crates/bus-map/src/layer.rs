//! # Marker Layer
//!
//! Keeps exactly one marker per bus on a [`MapSurface`], keyed by vehicle id.
//! Each snapshot removes markers for ids that are gone, moves markers for ids
//! that persist, and creates markers for new ids. Persisting markers are never
//! recreated.

use std::collections::BTreeSet;

use bus_domain::{Coordinates, FleetSnapshot, Vehicle, VehicleId};
use tracing::{debug, info};

use crate::selection::Selection;
use crate::style::MapStyle;
use crate::surface::{MapSurface, MarkerKey};

/// What one render changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub added: usize,
    pub moved: usize,
    pub removed: usize,
}

/// Bus markers, fixed stops, the viewer marker and the selection for one map
pub struct MarkerLayer<S: MapSurface> {
    surface: S,
    style: MapStyle,
    buses: BTreeSet<VehicleId>,
    viewer: Option<Coordinates>,
    selection: Selection,
    last_sequence: Option<u64>,
}

impl<S: MapSurface> MarkerLayer<S> {
    /// Mount the layer: set the view and draw the fixed markers.
    pub fn mount(style: MapStyle, mut surface: S) -> Self {
        surface.set_view(style.center, style.zoom);

        for (idx, stop) in style.stops.iter().enumerate() {
            surface.add_marker(MarkerKey::Stop(idx), style.stop_marker(stop));
        }
        if style.university_marker {
            surface.add_marker(MarkerKey::University, style.university_marker());
        }

        info!(
            variant = %style.variant,
            stops = style.stops.len(),
            "map layer mounted"
        );

        Self {
            surface,
            style,
            buses: BTreeSet::new(),
            viewer: None,
            selection: Selection::new(),
            last_sequence: None,
        }
    }

    /// Reconcile the markers with `snapshot`.
    pub fn render(&mut self, snapshot: &FleetSnapshot) -> RenderStats {
        let mut stats = RenderStats::default();
        let current: BTreeSet<VehicleId> = snapshot.ids().cloned().collect();

        for gone in self.buses.difference(&current) {
            self.surface.remove_marker(&MarkerKey::Bus(gone.clone()));
            if self.style.route_target.is_some() {
                self.surface.remove_route(gone);
            }
            stats.removed += 1;
        }

        for vehicle in &snapshot.vehicles {
            let key = MarkerKey::Bus(vehicle.id().clone());
            let marker = self.style.bus_marker(vehicle);
            if self.buses.contains(vehicle.id()) {
                self.surface.update_marker(&key, marker);
                stats.moved += 1;
            } else {
                self.surface.add_marker(key, marker);
                stats.added += 1;
            }

            if let Some(target) = self.style.route_target {
                self.surface.set_route(vehicle.id(), vehicle.position, target);
            }
        }

        self.buses = current;
        self.selection.reconcile(snapshot);
        self.last_sequence = Some(snapshot.sequence);

        debug!(
            sequence = snapshot.sequence,
            added = stats.added,
            moved = stats.moved,
            removed = stats.removed,
            "markers reconciled"
        );
        stats
    }

    /// Handle a click on a bus marker.
    pub fn click<'a>(&mut self, id: &VehicleId, snapshot: &'a FleetSnapshot) -> Option<&'a Vehicle> {
        self.selection.select(id, snapshot);
        let selected = self.selection.selected(snapshot);
        if let Some(vehicle) = selected {
            info!(vehicle = %vehicle.id(), label = %vehicle.label, "bus selected");
        }
        selected
    }

    /// Handle a click on a bus card in the list; clicking the selected card
    /// again clears the selection.
    pub fn click_card<'a>(&mut self, id: &VehicleId, snapshot: &'a FleetSnapshot) -> Option<&'a Vehicle> {
        self.selection.toggle(id, snapshot);
        let selected = self.selection.selected(snapshot);
        match selected {
            Some(vehicle) => info!(vehicle = %vehicle.id(), label = %vehicle.label, "bus selected from list"),
            None => debug!(vehicle = %id, "list selection cleared"),
        }
        selected
    }

    /// Place (or replace) the viewer marker and recentre on it.
    pub fn show_viewer(&mut self, position: Coordinates) {
        if self.viewer.take().is_some() {
            self.surface.remove_marker(&MarkerKey::Viewer);
        }
        self.surface
            .add_marker(MarkerKey::Viewer, self.style.viewer_marker(position));
        self.surface.set_view(position, self.style.zoom);
        self.viewer = Some(position);
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn style(&self) -> &MapStyle {
        &self.style
    }

    pub fn viewer(&self) -> Option<Coordinates> {
        self.viewer
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MarkerKind, MemorySurface};
    use bus_domain::{seed, Variant};

    fn campus() -> (MarkerLayer<MemorySurface>, FleetSnapshot) {
        let layer = MarkerLayer::mount(MapStyle::for_variant(Variant::Campus), MemorySurface::new());
        let snapshot = FleetSnapshot::new(0, seed::campus_fleet().unwrap());
        (layer, snapshot)
    }

    fn moved(snapshot: &FleetSnapshot, sequence: u64) -> FleetSnapshot {
        let mut vehicles = snapshot.vehicles.clone();
        for v in &mut vehicles {
            v.position = v.position.offset(0.0004, -0.0003);
            v.step_eta(-1);
        }
        FleetSnapshot::new(sequence, vehicles)
    }

    #[test]
    fn test_mount_draws_stops() {
        let (layer, _) = campus();
        let surface = layer.surface();
        assert_eq!(surface.markers.len(), 4);
        assert_eq!(surface.center, Some((seed::UNIVERSITY, 15)));
        assert!(surface.markers.values().all(|m| m.kind == MarkerKind::Stop));
    }

    #[test]
    fn test_first_render_adds_one_marker_per_bus() {
        let (mut layer, snapshot) = campus();
        let stats = layer.render(&snapshot);
        assert_eq!(stats, RenderStats { added: 3, moved: 0, removed: 0 });
        assert_eq!(layer.surface().bus_markers().count(), 3);
    }

    #[test]
    fn test_repeat_render_moves_without_recreating() {
        let (mut layer, snapshot) = campus();
        layer.render(&snapshot);
        let created_before = layer.surface().created;

        let next = moved(&snapshot, 1);
        let stats = layer.render(&next);

        assert_eq!(stats, RenderStats { added: 0, moved: 3, removed: 0 });
        assert_eq!(layer.surface().created, created_before);
        assert_eq!(layer.surface().removed, 0);

        let marker = layer.surface().marker(&MarkerKey::Bus("1".into())).unwrap();
        assert_eq!(marker.position, next.vehicles[0].position);
        assert_eq!(marker.title, "KU-01 - ETA: 4 min");
    }

    #[test]
    fn test_vanished_and_new_ids() {
        let (mut layer, snapshot) = campus();
        layer.render(&snapshot);

        let mut vehicles = snapshot.vehicles.clone();
        vehicles.retain(|v| v.id().as_str() != "2");
        vehicles.push(
            Vehicle::new("4", "KU-04", seed::UNIVERSITY, 15).unwrap(),
        );
        let stats = layer.render(&FleetSnapshot::new(1, vehicles));

        assert_eq!(stats, RenderStats { added: 1, moved: 2, removed: 1 });
        let ids: Vec<_> = layer.surface().bus_markers().map(|(id, _)| id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
    }

    #[test]
    fn test_click_selects_and_vanish_clears() {
        let (mut layer, snapshot) = campus();
        layer.render(&snapshot);

        let selected = layer.click(&"3".into(), &snapshot).unwrap();
        assert_eq!(selected.label, "KU-03");

        assert!(layer.click(&"nonexistent".into(), &snapshot).is_none());
        assert!(layer.selection().id().is_none());

        layer.click(&"3".into(), &snapshot);
        let mut vehicles = snapshot.vehicles.clone();
        vehicles.retain(|v| v.id().as_str() != "3");
        layer.render(&FleetSnapshot::new(1, vehicles));
        assert!(layer.selection().id().is_none());
    }

    #[test]
    fn test_card_click_toggles() {
        let (mut layer, snapshot) = campus();
        layer.render(&snapshot);

        let selected = layer.click_card(&"2".into(), &snapshot).unwrap();
        assert_eq!(selected.label, "KU-02");
        assert!(layer.click_card(&"2".into(), &snapshot).is_none());
        assert!(layer.selection().id().is_none());

        layer.click_card(&"1".into(), &snapshot);
        layer.click_card(&"3".into(), &snapshot);
        assert_eq!(layer.selection().id(), Some(&VehicleId::from("3")));

        assert!(layer.click_card(&"9".into(), &snapshot).is_none());
        assert!(layer.selection().id().is_none());
    }

    #[test]
    fn test_viewer_marker_replaced() {
        let (mut layer, _) = campus();
        layer.show_viewer(seed::UNIVERSITY);
        let elsewhere = Coordinates::new(24.9100, 67.0900);
        layer.show_viewer(elsewhere);

        let surface = layer.surface();
        assert_eq!(surface.marker(&MarkerKey::Viewer).unwrap().position, elsewhere);
        assert_eq!(surface.removed, 1);
        assert_eq!(surface.center, Some((elsewhere, 15)));
    }

    #[test]
    fn test_fleet_routes_follow_buses() {
        let mut layer = MarkerLayer::mount(MapStyle::for_variant(Variant::Fleet), MemorySurface::new());
        let snapshot = FleetSnapshot::new(0, seed::city_fleet().unwrap());
        layer.render(&snapshot);

        assert!(layer.surface().marker(&MarkerKey::University).is_some());
        assert_eq!(layer.surface().routes.len(), 5);

        let next = moved(&snapshot, 1);
        layer.render(&next);
        let (from, to) = layer.surface().routes[&VehicleId::from("5")];
        assert_eq!(from, next.vehicles[4].position);
        assert_eq!(to, seed::UNIVERSITY);

        let mut fewer = next.vehicles.clone();
        fewer.truncate(3);
        layer.render(&FleetSnapshot::new(2, fewer));
        assert_eq!(layer.surface().routes.len(), 3);
    }
}
