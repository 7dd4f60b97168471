use std::time::Duration;
use thiserror::Error;

/// Failures inside the dashboard pipeline. None of these leave the
/// controller: each one becomes a UI state change plus a log entry.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Unable to detect location.")]
    LocationUnavailable,

    #[error("location sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("IP geolocation failed: {0}")]
    GeolocationFailed(String),

    #[error("location sensor timed out after {}ms", .0.as_millis())]
    SensorTimeout(Duration),

    #[error("{0}")]
    PredictionFailed(String),

    #[error("weather unavailable: {0}")]
    WeatherUnavailable(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
