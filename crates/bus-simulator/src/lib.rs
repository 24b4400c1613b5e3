//! # Bus Simulator
//!
//! Simulated fleet positions for the campus bus tracker.
//!
//! ## Features
//!
//! - Seeded fleets per dashboard screen
//! - Bounded random drift of position, ETA and seat occupancy
//! - Snapshot store with explicit start/stop scheduling and subscriptions
//! - Best-effort viewer location with a fixed fallback

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod fleet;
pub mod location;
pub mod motion;
pub mod store;

pub use config::{ConfigError, TrackerConfig};
pub use fleet::{FleetError, FleetSimulator};
pub use location::{LocationError, LocationProvider, LocationSource};
pub use motion::{MotionError, MotionProfile};
pub use store::{FleetStore, SnapshotSubscription};
