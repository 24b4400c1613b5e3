//! Which bus is highlighted for detail display.

use bus_domain::{FleetSnapshot, Vehicle, VehicleId};
use tracing::debug;

/// Selected bus, keyed by id and resolved against the current snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<VehicleId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`; an id missing from the snapshot clears the selection.
    pub fn select(&mut self, id: &VehicleId, snapshot: &FleetSnapshot) {
        if snapshot.contains(id) {
            self.selected = Some(id.clone());
        } else {
            debug!(vehicle = %id, "selected id not in snapshot, clearing");
            self.selected = None;
        }
    }

    /// Select `id`, or clear if it is already selected.
    pub fn toggle(&mut self, id: &VehicleId, snapshot: &FleetSnapshot) {
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        } else {
            self.select(id, snapshot);
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Drop the selection if its bus is no longer in the snapshot.
    pub fn reconcile(&mut self, snapshot: &FleetSnapshot) {
        if self.selected.as_ref().is_some_and(|id| !snapshot.contains(id)) {
            self.selected = None;
        }
    }

    pub fn id(&self) -> Option<&VehicleId> {
        self.selected.as_ref()
    }

    /// The selected bus as it is in `snapshot`
    pub fn selected<'a>(&self, snapshot: &'a FleetSnapshot) -> Option<&'a Vehicle> {
        self.selected.as_ref().and_then(|id| snapshot.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus_domain::seed;

    fn snapshot() -> FleetSnapshot {
        FleetSnapshot::new(0, seed::campus_fleet().unwrap())
    }

    #[test]
    fn test_select_existing() {
        let snap = snapshot();
        let mut selection = Selection::new();
        selection.select(&"2".into(), &snap);
        assert_eq!(selection.selected(&snap).unwrap().label, "KU-02");
    }

    #[test]
    fn test_select_nonexistent_clears() {
        let snap = snapshot();
        let mut selection = Selection::new();
        selection.select(&"1".into(), &snap);
        selection.select(&"nonexistent".into(), &snap);
        assert!(selection.id().is_none());
        assert!(selection.selected(&snap).is_none());
    }

    #[test]
    fn test_toggle() {
        let snap = snapshot();
        let mut selection = Selection::new();
        let id = VehicleId::from("3");
        selection.toggle(&id, &snap);
        assert_eq!(selection.id(), Some(&id));
        selection.toggle(&id, &snap);
        assert!(selection.id().is_none());
    }

    #[test]
    fn test_reconcile_drops_vanished_bus() {
        let snap = snapshot();
        let mut selection = Selection::new();
        selection.select(&"3".into(), &snap);

        let mut vehicles = snap.vehicles.clone();
        vehicles.retain(|v| v.id().as_str() != "3");
        let next = FleetSnapshot::new(1, vehicles);

        selection.reconcile(&next);
        assert!(selection.id().is_none());
    }
}
