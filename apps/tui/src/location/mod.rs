pub mod geoip;
pub mod gpsd;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::Coordinate;
use crate::error::DashboardError;

pub use geoip::{GeoIpResponse, HttpGeolocator};
pub use gpsd::GpsdSensor;

/// Status line shown when both location attempts fail.
pub const LOCATION_UNAVAILABLE: &str = "Unable to detect location.";

/// A device-provided position source.
#[async_trait]
pub trait LocationSensor: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, DashboardError>;
}

/// Network-based, city-level position lookup.
#[async_trait]
pub trait IpGeolocator: Send + Sync {
    async fn locate(&self) -> Result<GeoIpResponse, DashboardError>;
}

/// A position given up front, e.g. on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedSensor(pub Coordinate);

#[async_trait]
impl LocationSensor for FixedSensor {
    async fn current_position(&self) -> Result<Coordinate, DashboardError> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum LocationSource {
    Gps,
    Approximate { city: String, country: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    #[serde(flatten)]
    pub source: LocationSource,
}

impl ResolvedLocation {
    pub fn status_message(&self) -> String {
        match &self.source {
            LocationSource::Gps => format!("Location (GPS): {}", self.coordinate),
            LocationSource::Approximate { city, country } => {
                format!("Approx. location: {city}, {country}")
            }
        }
    }
}

/// Sensor first, IP geolocation second. One attempt each, no retries.
#[derive(Clone)]
pub struct LocationResolver {
    sensor: Option<Arc<dyn LocationSensor>>,
    geolocator: Arc<dyn IpGeolocator>,
    timeout: Duration,
}

impl LocationResolver {
    pub fn new(
        sensor: Option<Arc<dyn LocationSensor>>,
        geolocator: Arc<dyn IpGeolocator>,
        timeout: Duration,
    ) -> Self {
        Self {
            sensor,
            geolocator,
            timeout,
        }
    }

    pub async fn resolve(&self) -> Result<ResolvedLocation, DashboardError> {
        match self.read_sensor().await {
            Ok(coordinate) => {
                info!(%coordinate, "location from device sensor");
                return Ok(ResolvedLocation {
                    coordinate,
                    source: LocationSource::Gps,
                });
            }
            Err(e) => warn!("device location failed, falling back to IP lookup: {e}"),
        }

        match self
            .geolocator
            .locate()
            .await
            .and_then(GeoIpResponse::into_resolved)
        {
            Ok(resolved) => {
                info!(coordinate = %resolved.coordinate, "approximate location from IP lookup");
                Ok(resolved)
            }
            Err(e) => {
                warn!("IP geolocation failed: {e}");
                Err(DashboardError::LocationUnavailable)
            }
        }
    }

    async fn read_sensor(&self) -> Result<Coordinate, DashboardError> {
        let sensor = self
            .sensor
            .as_ref()
            .ok_or_else(|| DashboardError::SensorUnavailable("no sensor configured".to_string()))?;

        tokio::time::timeout(self.timeout, sensor.current_position())
            .await
            .map_err(|_| DashboardError::SensorTimeout(self.timeout))?
    }
}
