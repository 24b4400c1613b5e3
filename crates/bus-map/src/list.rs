//! Bus cards listed under the map.

use std::fmt;

use bus_domain::{FleetSnapshot, Variant, Vehicle, VehicleId, VehicleStatus};
use serde::Serialize;

/// One row of the bus list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusCard {
    pub id: VehicleId,
    pub label: String,
    pub eta_minutes: u32,
    pub status: VehicleStatus,
    pub seats: String,
    /// Load bar fill in percent, when seat counts are tracked
    pub load_pct: Option<f32>,
    pub driver: Option<String>,
    pub area: Option<String>,
    pub selected: bool,
}

impl BusCard {
    pub fn from_vehicle(vehicle: &Vehicle, selected: Option<&VehicleId>) -> Self {
        let (seats, load_pct) = match vehicle.occupancy() {
            Some(o) => (
                format!("{}/{}", o.occupied(), o.capacity()),
                Some(o.load_pct()),
            ),
            None => (format!("{} seats", vehicle.capacity_seats), None),
        };

        Self {
            id: vehicle.id().clone(),
            label: vehicle.label.clone(),
            eta_minutes: vehicle.eta_minutes(),
            status: vehicle.status,
            seats,
            load_pct,
            driver: vehicle.assignment.as_ref().map(|a| a.driver.clone()),
            area: vehicle.assignment.as_ref().map(|a| a.area.clone()),
            selected: selected == Some(vehicle.id()),
        }
    }

    /// Cards for every bus, in snapshot order
    pub fn from_snapshot(snapshot: &FleetSnapshot, selected: Option<&VehicleId>) -> Vec<Self> {
        snapshot
            .vehicles
            .iter()
            .map(|v| Self::from_vehicle(v, selected))
            .collect()
    }
}

impl fmt::Display for BusCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.selected { '*' } else { ' ' };
        write!(
            f,
            "{marker} {:<6} {:>3} min  {:<11} {}",
            self.label, self.eta_minutes, self.status, self.seats
        )?;
        if let Some(driver) = &self.driver {
            write!(f, "  {driver}")?;
        }
        if let Some(area) = &self.area {
            write!(f, " ({area})")?;
        }
        Ok(())
    }
}

/// Heading shown above the list
pub fn list_heading(variant: Variant, snapshot: &FleetSnapshot) -> String {
    match variant {
        Variant::Fleet => format!("Live Fleet Tracking: {} buses covering Karachi city areas", snapshot.len()),
        _ => "Live Bus Tracking".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus_domain::seed;

    #[test]
    fn test_occupancy_card() {
        let snapshot = FleetSnapshot::new(0, seed::occupancy_fleet().unwrap());
        let cards = BusCard::from_snapshot(&snapshot, Some(&"1".into()));
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].seats, "32/45");
        assert!(cards[0].selected);
        assert!(!cards[1].selected);
        assert!((cards[2].load_pct.unwrap() - 91.11).abs() < 0.01);
    }

    #[test]
    fn test_fleet_card_display() {
        let snapshot = FleetSnapshot::new(0, seed::city_fleet().unwrap());
        let card = BusCard::from_vehicle(&snapshot.vehicles[0], None);
        assert_eq!(
            card.to_string(),
            "  KU-01   25 min  active      45 seats  Ahmed Ali (Shah Faisal Colony)"
        );
        assert_eq!(
            list_heading(Variant::Fleet, &snapshot),
            "Live Fleet Tracking: 5 buses covering Karachi city areas"
        );
    }
}
