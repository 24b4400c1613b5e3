//! Per-tick drift applied to each simulated bus.

use std::time::Duration;

use bus_domain::{Variant, Vehicle};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Jitter span for the campus maps, in degrees
pub const CAMPUS_JITTER_DEG: f64 = 0.001;
/// Jitter span for the city-wide fleet map, in degrees
pub const FLEET_JITTER_DEG: f64 = 0.002;

const CAMPUS_TICK: Duration = Duration::from_secs(5);
const FLEET_TICK: Duration = Duration::from_secs(8);

/// How far and how often buses drift on a given screen.
///
/// Each tick moves latitude and longitude by an independent uniform delta in
/// `[-jitter_deg / 2, jitter_deg / 2]`; ETA and occupancy take a step in
/// `{-1, 0, +1}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MotionRecord")]
pub struct MotionProfile {
    jitter_deg: f64,
    tick_period: Duration,
}

/// Rejected motion parameters
#[derive(Debug, Error, PartialEq)]
pub enum MotionError {
    #[error("Invalid jitter span: {0} (must be a finite, non-negative number of degrees)")]
    InvalidJitter(f64),
}

#[derive(Deserialize)]
struct MotionRecord {
    jitter_deg: f64,
    tick_period: Duration,
}

impl TryFrom<MotionRecord> for MotionProfile {
    type Error = MotionError;

    fn try_from(record: MotionRecord) -> Result<Self, MotionError> {
        Self::new(record.jitter_deg, record.tick_period)
    }
}

impl MotionProfile {
    pub fn new(jitter_deg: f64, tick_period: Duration) -> Result<Self, MotionError> {
        if !jitter_deg.is_finite() || jitter_deg < 0.0 {
            return Err(MotionError::InvalidJitter(jitter_deg));
        }
        Ok(Self::from_parts(jitter_deg, tick_period))
    }

    const fn from_parts(jitter_deg: f64, tick_period: Duration) -> Self {
        Self {
            jitter_deg,
            tick_period,
        }
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Campus | Variant::Occupancy => Self::from_parts(CAMPUS_JITTER_DEG, CAMPUS_TICK),
            Variant::Fleet => Self::from_parts(FLEET_JITTER_DEG, FLEET_TICK),
        }
    }

    #[must_use]
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    pub fn jitter_deg(&self) -> f64 {
        self.jitter_deg
    }

    /// Largest per-axis movement a single tick can produce
    pub fn max_step_deg(&self) -> f64 {
        self.jitter_deg / 2.0
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Advance one bus by one tick.
    pub fn apply<R: Rng + ?Sized>(&self, vehicle: &mut Vehicle, rng: &mut R) {
        let half = self.max_step_deg();
        let d_lat = rng.gen_range(-half..=half);
        let d_lng = rng.gen_range(-half..=half);
        vehicle.position = vehicle.position.offset(d_lat, d_lng);

        vehicle.step_eta(rng.gen_range(-1..=1));

        if vehicle.occupancy().is_some() {
            vehicle.step_occupancy(rng.gen_range(-1..=1));
        }
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::for_variant(Variant::default())
    }
}
