//! Fixed sample fleets and map points the dashboards start from.

use crate::{BusStop, Coordinates, DriverAssignment, Result, Variant, Vehicle, VehicleStatus};

/// Karachi University marker on the fleet map
pub const UNIVERSITY: Coordinates = crate::UNIVERSITY_MAIN_GATE;

/// Starting fleet for a screen
pub fn fleet_for(variant: Variant) -> Result<Vec<Vehicle>> {
    match variant {
        Variant::Campus => campus_fleet(),
        Variant::Occupancy => occupancy_fleet(),
        Variant::Fleet => city_fleet(),
    }
}

/// Fixed points drawn under the buses for a screen
pub fn stops_for(variant: Variant) -> Vec<BusStop> {
    match variant {
        Variant::Campus | Variant::Occupancy => campus_stops(),
        Variant::Fleet => university_stops(),
    }
}

/// Student dashboard buses circling the campus
pub fn campus_fleet() -> Result<Vec<Vehicle>> {
    Ok(vec![
        Vehicle::new("1", "KU-01", Coordinates::new(24.9226, 67.1040), 5)?,
        Vehicle::new("2", "KU-02", Coordinates::new(24.9200, 67.1020), 12)?,
        Vehicle::new("3", "KU-03", Coordinates::new(24.9250, 67.1060), 8)?,
    ])
}

/// Campus buses with live seat counts
pub fn occupancy_fleet() -> Result<Vec<Vehicle>> {
    let seats = Vehicle::DEFAULT_SEATS;
    Ok(vec![
        Vehicle::new("1", "KU-01", Coordinates::new(24.9226, 67.1040), 5)?
            .with_occupancy(32, seats)?,
        Vehicle::new("2", "KU-02", Coordinates::new(24.9200, 67.1020), 12)?
            .with_occupancy(28, seats)?,
        Vehicle::new("3", "KU-03", Coordinates::new(24.9250, 67.1060), 8)?
            .with_occupancy(41, seats)?,
    ])
}

/// Admin fleet covering the city routes into campus
pub fn city_fleet() -> Result<Vec<Vehicle>> {
    let rows = [
        ("1", "KU-01", "Ahmed Ali", "+92 300 1234567", 24.8607, 67.0011, 25, VehicleStatus::Active, "Shah Faisal Colony"),
        ("2", "KU-02", "Hassan Khan", "+92 301 2345678", 24.8607, 67.0275, 30, VehicleStatus::Active, "Saddar"),
        ("3", "KU-03", "Usman Sheikh", "+92 302 3456789", 24.9341, 67.1785, 35, VehicleStatus::Delayed, "Gulshan-e-Maymar"),
        ("4", "KU-04", "Ali Raza", "+92 303 4567890", 24.9265, 67.1362, 15, VehicleStatus::Active, "NIPA"),
        ("5", "KU-05", "Muhammad Tariq", "+92 304 5678901", 24.9056, 67.1011, 20, VehicleStatus::Active, "Jail Chowrangi"),
    ];

    rows.into_iter()
        .map(|(id, label, driver, phone, lat, lng, eta, status, area)| {
            let vehicle = Vehicle::new(id, label, Coordinates::new(lat, lng), eta)?
                .with_status(status)
                .with_assignment(DriverAssignment {
                    driver: driver.to_string(),
                    driver_phone: phone.to_string(),
                    route: format!("{area} Route"),
                    area: area.to_string(),
                });
            Ok(vehicle)
        })
        .collect()
}

/// Stops shown on the student maps
pub fn campus_stops() -> Vec<BusStop> {
    vec![
        BusStop::new("Main Gate", 24.9226, 67.1040),
        BusStop::new("Library", 24.9200, 67.1020),
        BusStop::new("Cafeteria", 24.9250, 67.1060),
        BusStop::new("Hostel", 24.9280, 67.1080),
    ]
}

/// Buildings and stops shown around the university on the fleet map
pub fn university_stops() -> Vec<BusStop> {
    vec![
        BusStop::new("Main Gate", 24.9226, 67.1040),
        BusStop::new("Central Library", 24.9200, 67.1020),
        BusStop::new("Cafeteria", 24.9250, 67.1060),
        BusStop::new("Boys Hostel", 24.9280, 67.1080),
        BusStop::new("Girls Hostel", 24.9180, 67.1100),
    ]
}
