//! # Tracker Configuration
//!
//! Environment-based configuration for the bus tracker runner.

use std::env;
use std::time::Duration;

use bus_domain::{Coordinates, DomainError, Variant, UNIVERSITY_MAIN_GATE};
use thiserror::Error;

use crate::motion::MotionProfile;

/// Malformed environment values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Runner configuration
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Which dashboard screen to simulate
    pub variant: Variant,

    /// Tick period override; the variant cadence applies when unset
    pub tick_period: Option<Duration>,

    /// Random seed for reproducible runs
    pub seed: Option<u64>,

    /// Where the viewer is assumed to be when location lookup fails
    pub fallback_location: Coordinates,

    /// Logging level
    pub log_level: String,
}

impl TrackerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let variant = match lookup("BUS_TRACKER_VARIANT") {
            Some(v) => v.parse()?,
            None => Variant::default(),
        };

        let tick_period = lookup("BUS_TRACKER_TICK_MS")
            .map(|v| match parse_number::<u64>("BUS_TRACKER_TICK_MS", &v)? {
                0 => Err(ConfigError::InvalidValue { key: "BUS_TRACKER_TICK_MS", value: v }),
                ms => Ok(Duration::from_millis(ms)),
            })
            .transpose()?;

        let seed = lookup("BUS_TRACKER_SEED")
            .map(|v| parse_number::<u64>("BUS_TRACKER_SEED", &v))
            .transpose()?;

        let fallback_location = match (
            lookup("BUS_TRACKER_FALLBACK_LAT"),
            lookup("BUS_TRACKER_FALLBACK_LNG"),
        ) {
            (Some(lat), Some(lng)) => Coordinates::validated(
                parse_number("BUS_TRACKER_FALLBACK_LAT", &lat)?,
                parse_number("BUS_TRACKER_FALLBACK_LNG", &lng)?,
            )?,
            (None, None) => UNIVERSITY_MAIN_GATE,
            (Some(_), None) => return Err(missing("BUS_TRACKER_FALLBACK_LNG")),
            (None, Some(_)) => return Err(missing("BUS_TRACKER_FALLBACK_LAT")),
        };

        Ok(Self {
            variant,
            tick_period,
            seed,
            fallback_location,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Motion profile for the configured variant, honouring the period override
    pub fn motion(&self) -> MotionProfile {
        let profile = MotionProfile::for_variant(self.variant);
        match self.tick_period {
            Some(period) => profile.with_tick_period(period),
            None => profile,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            tick_period: None,
            seed: None,
            fallback_location: UNIVERSITY_MAIN_GATE,
            log_level: "info".to_string(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// One half of a key pair was set without the other
fn missing(key: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: String::new(),
    }
}
