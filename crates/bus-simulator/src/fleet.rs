//! Fleet-level simulation owning the canonical vehicle set.

use bus_domain::{seed, DomainError, FleetSnapshot, Variant, Vehicle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::motion::MotionProfile;

/// Errors raised while seeding a fleet.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Invalid seed data: {0}")]
    Seed(#[from] DomainError),
}

/// Simulated bus fleet.
///
/// The vehicle set is fixed at construction; [`FleetSimulator::tick`] only
/// mutates the existing entries.
pub struct FleetSimulator {
    vehicles: Vec<Vehicle>,
    motion: MotionProfile,
    sequence: u64,
    rng: ChaCha8Rng,
}

impl FleetSimulator {
    /// Create a simulator over the given vehicles.
    pub fn new(vehicles: Vec<Vehicle>, motion: MotionProfile) -> Result<Self, FleetError> {
        bus_domain::ensure_unique_ids(&vehicles)?;
        Ok(Self {
            vehicles,
            motion,
            sequence: 0,
            rng: ChaCha8Rng::from_entropy(),
        })
    }

    /// Create a simulator seeded with a screen's sample fleet.
    pub fn for_variant(variant: Variant) -> Result<Self, FleetError> {
        Self::new(seed::fleet_for(variant)?, MotionProfile::for_variant(variant))
    }

    /// Use a deterministic random stream.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn motion(&self) -> &MotionProfile {
        &self.motion
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Copy the current vehicle set.
    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot::new(self.sequence, self.vehicles.clone())
    }

    /// Advance every vehicle by one tick and return the new snapshot.
    pub fn tick(&mut self) -> FleetSnapshot {
        for vehicle in &mut self.vehicles {
            self.motion.apply(vehicle, &mut self.rng);
            trace!(
                vehicle = %vehicle.id(),
                eta_minutes = vehicle.eta_minutes(),
                position = %vehicle.position,
                "vehicle advanced"
            );
        }
        self.sequence += 1;
        debug!(sequence = self.sequence, vehicles = self.vehicles.len(), "fleet ticked");
        self.snapshot()
    }
}
