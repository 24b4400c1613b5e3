//! # Campus Bus Tracker - Domain Model
//!
//! Vehicles, fleet snapshots and fixed map points for the university bus
//! tracker. These types are shared by the simulator and the map layer; the
//! simulator owns the canonical vehicle set and everything else reads
//! [`FleetSnapshot`]s.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod seed;

// =============================================================================
// VALUE OBJECTS
// =============================================================================

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build coordinates, rejecting values outside the WGS84 ranges
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinates {
                lat: latitude,
                lon: longitude,
            });
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Shift by the given offsets in degrees
    #[must_use]
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.latitude + d_lat, self.longitude + d_lng)
    }

    /// Calculate great-circle distance to another point (Haversine formula)
    #[must_use]
    pub fn distance_to_km(&self, other: &Coordinates) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }
}

impl Default for Coordinates {
    fn default() -> Self {
        UNIVERSITY_MAIN_GATE
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}°N {:.4}°E", self.latitude, self.longitude)
    }
}

/// Main gate of Karachi University; also the viewer fallback location
pub const UNIVERSITY_MAIN_GATE: Coordinates = Coordinates::new(24.9226, 67.1040);

/// Stable vehicle identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VehicleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// ENUMS
// =============================================================================

/// Bus operational status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[default]
    Active,
    Delayed,
    Maintenance,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Delayed => "delayed",
            Self::Maintenance => "maintenance",
        }
    }

    /// Marker and badge colour used by the fleet map
    pub fn color(&self) -> &'static str {
        match self {
            Self::Active => "#16a34a",
            Self::Delayed => "#f59e0b",
            Self::Maintenance => "#dc2626",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Which dashboard screen is tracking the fleet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Student dashboard map around campus
    #[default]
    Campus,
    /// Student map with live seat counts
    Occupancy,
    /// Admin fleet map across the city
    Fleet,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Campus => "campus",
            Self::Occupancy => "occupancy",
            Self::Fleet => "fleet",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "campus" | "student" => Ok(Self::Campus),
            "occupancy" => Ok(Self::Occupancy),
            "fleet" | "admin" => Ok(Self::Fleet),
            other => Err(DomainError::UnknownVariant(other.to_string())),
        }
    }
}

// =============================================================================
// NESTED VALUE OBJECTS
// =============================================================================

/// Seat occupancy; `occupied` never exceeds `capacity`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OccupancyRecord")]
pub struct Occupancy {
    capacity: u32,
    occupied: u32,
}

impl Occupancy {
    pub fn new(occupied: u32, capacity: u32) -> Result<Self> {
        if occupied > capacity {
            return Err(DomainError::OccupancyOverCapacity { occupied, capacity });
        }
        Ok(Self { capacity, occupied })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn occupied(&self) -> u32 {
        self.occupied
    }

    /// Apply a signed step, clamped to `[0, capacity]`
    pub fn step(&mut self, delta: i32) {
        let next = i64::from(self.occupied) + i64::from(delta);
        self.occupied = next.clamp(0, i64::from(self.capacity)) as u32;
    }

    /// Load factor in percent; 0 for a zero-capacity vehicle
    #[must_use]
    pub fn load_pct(&self) -> f32 {
        if self.capacity == 0 {
            0.0
        } else {
            (self.occupied as f32 / self.capacity as f32) * 100.0
        }
    }
}

#[derive(Deserialize)]
struct OccupancyRecord {
    capacity: u32,
    occupied: u32,
}

impl TryFrom<OccupancyRecord> for Occupancy {
    type Error = DomainError;

    fn try_from(record: OccupancyRecord) -> Result<Self> {
        Self::new(record.occupied, record.capacity)
    }
}

/// Driver and route details shown on the fleet map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverAssignment {
    pub driver: String,
    pub driver_phone: String,
    pub route: String,
    pub area: String,
}

// =============================================================================
// ENTITY TYPES
// =============================================================================

/// A tracked bus.
///
/// `id` is fixed at construction. ETA and occupancy are only reachable through
/// methods that keep their bounds, everything else is plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VehicleRecord")]
pub struct Vehicle {
    id: VehicleId,
    pub label: String,
    pub position: Coordinates,
    eta_minutes: u32,
    pub capacity_seats: u32,
    occupancy: Option<Occupancy>,
    pub status: VehicleStatus,
    pub assignment: Option<DriverAssignment>,
}

impl Vehicle {
    pub const DEFAULT_SEATS: u32 = 45;

    pub fn new(
        id: impl Into<VehicleId>,
        label: impl Into<String>,
        position: Coordinates,
        eta_minutes: u32,
    ) -> Result<Self> {
        if eta_minutes == 0 {
            return Err(DomainError::InvalidEta(eta_minutes));
        }
        Ok(Self {
            id: id.into(),
            label: label.into(),
            position,
            eta_minutes,
            capacity_seats: Self::DEFAULT_SEATS,
            occupancy: None,
            status: VehicleStatus::default(),
            assignment: None,
        })
    }

    /// Track occupancy; the seat count follows the occupancy capacity
    pub fn with_occupancy(mut self, occupied: u32, capacity: u32) -> Result<Self> {
        self.occupancy = Some(Occupancy::new(occupied, capacity)?);
        self.capacity_seats = capacity;
        Ok(self)
    }

    #[must_use]
    pub fn with_status(mut self, status: VehicleStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_assignment(mut self, assignment: DriverAssignment) -> Self {
        self.assignment = Some(assignment);
        self
    }

    pub fn id(&self) -> &VehicleId {
        &self.id
    }

    pub fn eta_minutes(&self) -> u32 {
        self.eta_minutes
    }

    pub fn occupancy(&self) -> Option<&Occupancy> {
        self.occupancy.as_ref()
    }

    /// Apply a signed ETA step, never going below one minute
    pub fn step_eta(&mut self, delta: i32) {
        let next = i64::from(self.eta_minutes) + i64::from(delta);
        self.eta_minutes = next.clamp(1, i64::from(u32::MAX)) as u32;
    }

    /// Apply a signed occupancy step; no-op when occupancy is not tracked
    pub fn step_occupancy(&mut self, delta: i32) {
        if let Some(occupancy) = self.occupancy.as_mut() {
            occupancy.step(delta);
        }
    }
}

/// Wire form of [`Vehicle`], checked before it becomes one
#[derive(Deserialize)]
struct VehicleRecord {
    id: VehicleId,
    label: String,
    position: Coordinates,
    eta_minutes: u32,
    capacity_seats: u32,
    occupancy: Option<Occupancy>,
    #[serde(default)]
    status: VehicleStatus,
    assignment: Option<DriverAssignment>,
}

impl TryFrom<VehicleRecord> for Vehicle {
    type Error = DomainError;

    fn try_from(record: VehicleRecord) -> Result<Self> {
        let mut vehicle = Self::new(record.id, record.label, record.position, record.eta_minutes)?
            .with_status(record.status);
        vehicle.capacity_seats = record.capacity_seats;
        if let Some(occupancy) = record.occupancy {
            vehicle = vehicle.with_occupancy(occupancy.occupied, occupancy.capacity)?;
        }
        if let Some(assignment) = record.assignment {
            vehicle = vehicle.with_assignment(assignment);
        }
        Ok(vehicle)
    }
}

/// Named fixed point on the map (bus stop, campus landmark)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusStop {
    pub name: String,
    pub position: Coordinates,
}

impl BusStop {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            position: Coordinates::new(latitude, longitude),
        }
    }
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

/// Immutable view of every vehicle at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Tick counter; 0 is the seeded state
    pub sequence: u64,
    pub taken_at: DateTime<Utc>,
    pub vehicles: Vec<Vehicle>,
}

impl FleetSnapshot {
    pub fn new(sequence: u64, vehicles: Vec<Vehicle>) -> Self {
        Self {
            sequence,
            taken_at: Utc::now(),
            vehicles,
        }
    }

    pub fn get(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id() == id)
    }

    pub fn contains(&self, id: &VehicleId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &VehicleId> {
        self.vehicles.iter().map(Vehicle::id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

/// Reject a vehicle set that reuses an id
pub fn ensure_unique_ids(vehicles: &[Vehicle]) -> Result<()> {
    let mut seen = HashSet::with_capacity(vehicles.len());
    for vehicle in vehicles {
        if !seen.insert(vehicle.id()) {
            return Err(DomainError::DuplicateVehicleId(vehicle.id().to_string()));
        }
    }
    Ok(())
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DomainError {
    #[error("Invalid ETA: {0} minutes (must be at least 1)")]
    InvalidEta(u32),

    #[error("Occupancy {occupied} exceeds capacity {capacity}")]
    OccupancyOverCapacity { occupied: u32, capacity: u32 },

    #[error("Invalid coordinates: lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("Duplicate vehicle id: {0}")]
    DuplicateVehicleId(String),

    #[error("Unknown screen variant: {0}")]
    UnknownVariant(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn bus(id: &str, eta: u32) -> Vehicle {
        Vehicle::new(id, format!("KU-{id}"), UNIVERSITY_MAIN_GATE, eta).unwrap()
    }

    #[test]
    fn test_zero_eta_rejected() {
        let err = Vehicle::new("1", "KU-01", UNIVERSITY_MAIN_GATE, 0).unwrap_err();
        assert_eq!(err, DomainError::InvalidEta(0));
    }

    #[test]
    fn test_eta_step_clamps_at_one() {
        let mut v = bus("3", 1);
        v.step_eta(-1);
        assert_eq!(v.eta_minutes(), 1);
        v.step_eta(1);
        assert_eq!(v.eta_minutes(), 2);
    }

    #[test]
    fn test_occupancy_bounds() {
        assert!(Occupancy::new(46, 45).is_err());

        let mut full = Occupancy::new(45, 45).unwrap();
        full.step(1);
        assert_eq!(full.occupied(), 45);

        let mut empty = Occupancy::new(0, 45).unwrap();
        empty.step(-1);
        assert_eq!(empty.occupied(), 0);
    }

    #[test]
    fn test_step_occupancy_without_tracking_is_noop() {
        let mut v = bus("1", 5);
        v.step_occupancy(1);
        assert!(v.occupancy().is_none());
    }

    #[test]
    fn test_with_occupancy_sets_seats() {
        let v = bus("1", 5).with_occupancy(32, 40).unwrap();
        assert_eq!(v.capacity_seats, 40);
        assert!((v.occupancy().unwrap().load_pct() - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let fleet = vec![bus("1", 5), bus("2", 7), bus("1", 9)];
        assert_eq!(
            ensure_unique_ids(&fleet),
            Err(DomainError::DuplicateVehicleId("1".into()))
        );
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = FleetSnapshot::new(0, vec![bus("1", 5), bus("2", 7)]);
        assert!(snapshot.contains(&VehicleId::from("2")));
        assert!(snapshot.get(&VehicleId::from("nonexistent")).is_none());
        assert_eq!(snapshot.ids().count(), 2);
    }

    #[test]
    fn test_validated_coordinates() {
        assert!(Coordinates::validated(24.9, 67.1).is_ok());
        assert!(Coordinates::validated(91.0, 67.1).is_err());
        assert!(Coordinates::validated(24.9, -181.0).is_err());
    }

    #[test]
    fn test_distance_campus_to_saddar() {
        let saddar = Coordinates::new(24.8607, 67.0275);
        let km = UNIVERSITY_MAIN_GATE.distance_to_km(&saddar);
        assert!(km > 9.0 && km < 11.0, "got {km}");
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("admin".parse::<Variant>().unwrap(), Variant::Fleet);
        assert_eq!(" Occupancy ".parse::<Variant>().unwrap(), Variant::Occupancy);
        assert!("bogus".parse::<Variant>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&VehicleStatus::Delayed).unwrap();
        assert_eq!(json, "\"delayed\"");
    }

    #[test]
    fn test_vehicle_json_keeps_bounds() {
        let bus = Vehicle::new("2", "KU-02", Coordinates::default(), 12)
            .unwrap()
            .with_occupancy(28, 45)
            .unwrap()
            .with_status(VehicleStatus::Delayed);
        let json = serde_json::to_string(&bus).unwrap();
        let back: Vehicle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), bus.id());
        assert_eq!(back.eta_minutes(), 12);
        assert_eq!(back.occupancy(), bus.occupancy());
        assert_eq!(back.status, VehicleStatus::Delayed);

        let zero_eta = json.replace("\"eta_minutes\":12", "\"eta_minutes\":0");
        let err = serde_json::from_str::<Vehicle>(&zero_eta).unwrap_err();
        assert!(err.to_string().contains("Invalid ETA"), "{err}");

        let overfull = json.replace("\"occupied\":28", "\"occupied\":50");
        let err = serde_json::from_str::<Vehicle>(&overfull).unwrap_err();
        assert!(err.to_string().contains("exceeds"), "{err}");
    }

    #[test]
    fn test_occupancy_json_rejects_overfull() {
        let result = serde_json::from_str::<Occupancy>(r#"{"capacity":10,"occupied":50}"#);
        assert!(result.is_err());
        let ok: Occupancy = serde_json::from_str(r#"{"capacity":10,"occupied":4}"#).unwrap();
        assert_eq!(ok.occupied(), 4);
    }
}
