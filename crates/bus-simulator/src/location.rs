//! # Viewer Location
//!
//! Best-effort position of the person looking at the map. Platform sources
//! may deny or fail; the provider always resolves, falling back to the
//! university main gate.

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use bus_domain::{Coordinates, UNIVERSITY_MAIN_GATE};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

pub const VIEWER_LAT_VAR: &str = "BUS_TRACKER_VIEWER_LAT";
pub const VIEWER_LNG_VAR: &str = "BUS_TRACKER_VIEWER_LNG";

/// Outcomes a platform location source can fail with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

/// Platform capability that can look up the viewer's position
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Source that always reports the same position
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub Coordinates);

#[async_trait]
impl LocationSource for FixedSource {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Source standing in for a user who refused the permission prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedSource;

#[async_trait]
impl LocationSource for DeniedSource {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

/// Source reading the viewer position from the environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl EnvSource {
    fn parse(lat: Option<String>, lng: Option<String>) -> Result<Coordinates, LocationError> {
        let (Some(lat), Some(lng)) = (lat, lng) else {
            return Err(LocationError::Unavailable(format!(
                "{VIEWER_LAT_VAR}/{VIEWER_LNG_VAR} not set"
            )));
        };
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| LocationError::Unavailable(format!("bad latitude '{lat}'")))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| LocationError::Unavailable(format!("bad longitude '{lng}'")))?;
        Coordinates::validated(lat, lng).map_err(|e| LocationError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl LocationSource for EnvSource {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Self::parse(env::var(VIEWER_LAT_VAR).ok(), env::var(VIEWER_LNG_VAR).ok())
    }
}

/// Resolves the viewer location, never failing the caller.
#[derive(Clone)]
pub struct LocationProvider {
    source: Option<Arc<dyn LocationSource>>,
    fallback: Coordinates,
}

impl LocationProvider {
    pub fn new(source: Arc<dyn LocationSource>) -> Self {
        Self {
            source: Some(source),
            fallback: UNIVERSITY_MAIN_GATE,
        }
    }

    /// Provider on a platform without location support.
    pub fn unsupported() -> Self {
        Self {
            source: None,
            fallback: UNIVERSITY_MAIN_GATE,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: Coordinates) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> Coordinates {
        self.fallback
    }

    /// Look up the viewer position once.
    pub async fn current_location(&self) -> Coordinates {
        let Some(source) = self.source.as_ref() else {
            debug!("no location capability, using fallback");
            return self.fallback;
        };

        match source.current_position().await {
            Ok(position) => {
                debug!(%position, "viewer location resolved");
                position
            }
            Err(err) => {
                warn!(error = %err, fallback = %self.fallback, "location lookup failed, using fallback");
                self.fallback
            }
        }
    }

    /// Look up the viewer position in the background.
    ///
    /// The result is dropped quietly if the receiver is gone by then.
    pub fn request(&self) -> oneshot::Receiver<Coordinates> {
        let (tx, rx) = oneshot::channel();
        let provider = self.clone();
        tokio::spawn(async move {
            let position = provider.current_location().await;
            if tx.send(position).is_err() {
                debug!("location consumer gone, discarding result");
            }
        });
        rx
    }
}

impl Default for LocationProvider {
    fn default() -> Self {
        Self::new(Arc::new(EnvSource))
    }
}
