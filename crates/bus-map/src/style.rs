//! Per-screen map configuration.
//!
//! The campus and fleet maps differ only in icon size, info-window text and
//! the route overlay, so one [`MapStyle`] covers every screen.

use std::fmt::Write as _;

use bus_domain::{seed, BusStop, Coordinates, Variant, Vehicle};

use crate::surface::{Marker, MarkerKind};

const CAMPUS_GREEN: &str = "#16a34a";
const STOP_RED: &str = "#dc2626";
const VIEWER_BLUE: &str = "#2563eb";

/// Rendering settings for one dashboard map
#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    pub variant: Variant,
    pub center: Coordinates,
    pub zoom: u8,
    pub bus_icon_px: u32,
    pub stops: Vec<BusStop>,
    /// Where route lines lead; `None` disables the overlay
    pub route_target: Option<Coordinates>,
    pub university_marker: bool,
}

impl MapStyle {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Campus | Variant::Occupancy => Self {
                variant,
                center: seed::UNIVERSITY,
                zoom: 15,
                bus_icon_px: 30,
                stops: seed::stops_for(variant),
                route_target: None,
                university_marker: false,
            },
            Variant::Fleet => Self {
                variant,
                center: Coordinates::new(24.9000, 67.1000),
                zoom: 12,
                bus_icon_px: 40,
                stops: seed::stops_for(variant),
                route_target: Some(seed::UNIVERSITY),
                university_marker: true,
            },
        }
    }

    pub fn bus_marker(&self, vehicle: &Vehicle) -> Marker {
        let (title, color) = match (self.variant, vehicle.assignment.as_ref()) {
            (Variant::Fleet, Some(assignment)) => (
                format!("{} - {}", vehicle.label, assignment.driver),
                vehicle.status.color(),
            ),
            (Variant::Fleet, None) => (vehicle.label.clone(), vehicle.status.color()),
            _ => (
                format!("{} - ETA: {} min", vehicle.label, vehicle.eta_minutes()),
                CAMPUS_GREEN,
            ),
        };

        Marker {
            kind: MarkerKind::Bus,
            position: vehicle.position,
            title,
            info: Some(self.info_text(vehicle)),
            icon_px: self.bus_icon_px,
            color,
        }
    }

    pub fn stop_marker(&self, stop: &BusStop) -> Marker {
        Marker {
            kind: MarkerKind::Stop,
            position: stop.position,
            title: stop.name.clone(),
            info: None,
            icon_px: 16,
            color: STOP_RED,
        }
    }

    pub fn university_marker(&self) -> Marker {
        Marker {
            kind: MarkerKind::University,
            position: seed::UNIVERSITY,
            title: "Karachi University".to_string(),
            info: None,
            icon_px: 30,
            color: STOP_RED,
        }
    }

    pub fn viewer_marker(&self, position: Coordinates) -> Marker {
        let title = match self.variant {
            Variant::Fleet => "Admin Location",
            _ => "Your Location",
        };
        Marker {
            kind: MarkerKind::Viewer,
            position,
            title: title.to_string(),
            info: None,
            icon_px: if self.variant == Variant::Fleet { 24 } else { 20 },
            color: VIEWER_BLUE,
        }
    }

    /// Info-window text for a bus
    pub fn info_text(&self, vehicle: &Vehicle) -> String {
        let mut out = String::new();
        match (self.variant, vehicle.assignment.as_ref()) {
            (Variant::Fleet, assignment) => {
                let _ = writeln!(out, "{} [{}]", vehicle.label, vehicle.status);
                if let Some(a) = assignment {
                    let _ = writeln!(out, "Driver: {}", a.driver);
                    let _ = writeln!(out, "Phone: {}", a.driver_phone);
                    let _ = writeln!(out, "Area: {}", a.area);
                    let _ = writeln!(out, "Route: {}", a.route);
                }
            }
            _ => {
                let _ = writeln!(out, "{}", vehicle.label);
            }
        }
        let _ = writeln!(out, "ETA: {} minutes", vehicle.eta_minutes());
        let _ = write!(out, "Capacity: {} seats", vehicle.capacity_seats);
        if let Some(occupancy) = vehicle.occupancy() {
            let _ = write!(
                out,
                "\nOccupied: {}/{} seats",
                occupancy.occupied(),
                occupancy.capacity()
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus_domain::VehicleStatus;

    #[test]
    fn test_campus_info() {
        let style = MapStyle::for_variant(Variant::Campus);
        let bus = &seed::campus_fleet().unwrap()[0];
        assert_eq!(style.info_text(bus), "KU-01\nETA: 5 minutes\nCapacity: 45 seats");

        let marker = style.bus_marker(bus);
        assert_eq!(marker.title, "KU-01 - ETA: 5 min");
        assert_eq!(marker.icon_px, 30);
    }

    #[test]
    fn test_occupancy_info() {
        let style = MapStyle::for_variant(Variant::Occupancy);
        let bus = &seed::occupancy_fleet().unwrap()[2];
        assert!(style.info_text(bus).ends_with("Occupied: 41/45 seats"));
    }

    #[test]
    fn test_fleet_marker_uses_status_colour() {
        let style = MapStyle::for_variant(Variant::Fleet);
        let fleet = seed::city_fleet().unwrap();
        let delayed = fleet.iter().find(|v| v.status == VehicleStatus::Delayed).unwrap();

        let marker = style.bus_marker(delayed);
        assert_eq!(marker.color, "#f59e0b");
        assert_eq!(marker.icon_px, 40);
        assert_eq!(marker.title, "KU-03 - Usman Sheikh");

        let info = marker.info.unwrap();
        assert!(info.starts_with("KU-03 [delayed]\nDriver: Usman Sheikh"));
        assert!(info.contains("Route: Gulshan-e-Maymar Route"));
    }

    #[test]
    fn test_fleet_style_routes_to_university() {
        let style = MapStyle::for_variant(Variant::Fleet);
        assert_eq!(style.route_target, Some(seed::UNIVERSITY));
        assert!(style.university_marker);
        assert!(MapStyle::for_variant(Variant::Campus).route_target.is_none());
    }
}
