use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{IpGeolocator, LocationSource, ResolvedLocation};
use crate::domain::Coordinate;
use crate::error::DashboardError;

/// Body of `GET https://ipapi.co/json/`. Rate-limited or failed lookups come
/// back as `{"error": true, "reason": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeoIpResponse {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub country_name: Option<String>,
    #[serde(default)]
    pub error: Option<bool>,
    pub reason: Option<String>,
}

impl GeoIpResponse {
    pub fn into_resolved(self) -> Result<ResolvedLocation, DashboardError> {
        if self.error == Some(true) {
            return Err(DashboardError::GeolocationFailed(
                self.reason
                    .unwrap_or_else(|| "geolocation service error".to_string()),
            ));
        }

        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Ok(ResolvedLocation {
                coordinate: Coordinate::new(latitude, longitude),
                source: LocationSource::Approximate {
                    city: self.city.unwrap_or_else(|| "unknown".to_string()),
                    country: self.country_name.unwrap_or_else(|| "unknown".to_string()),
                },
            }),
            _ => Err(DashboardError::LocationUnavailable),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpGeolocator {
    client: reqwest::Client,
    url: String,
}

impl HttpGeolocator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DashboardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("risk_dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl IpGeolocator for HttpGeolocator {
    async fn locate(&self) -> Result<GeoIpResponse, DashboardError> {
        debug!(url = %self.url, "requesting IP geolocation");
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        Ok(response.json::<GeoIpResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::serve_once;

    #[test]
    fn test_missing_coordinates_fail() {
        let response = GeoIpResponse {
            city: Some("Nowhere".to_string()),
            ..GeoIpResponse::default()
        };
        assert!(matches!(
            response.into_resolved(),
            Err(DashboardError::LocationUnavailable)
        ));
    }

    #[test]
    fn test_rate_limited_response_fails() {
        let response = GeoIpResponse {
            latitude: Some(1.0),
            longitude: Some(2.0),
            error: Some(true),
            reason: Some("RateLimited".to_string()),
            ..GeoIpResponse::default()
        };
        assert!(matches!(
            response.into_resolved(),
            Err(DashboardError::GeolocationFailed(reason)) if reason == "RateLimited"
        ));
    }

    #[tokio::test]
    async fn test_http_lookup() -> Result<(), Box<dyn std::error::Error>> {
        let (base_url, server) = serve_once(
            200,
            r#"{"latitude":48.85,"longitude":2.35,"city":"Paris","country_name":"France"}"#,
        )
        .await?;

        let geolocator = HttpGeolocator::new(format!("{base_url}/json/"), Duration::from_secs(5))?;
        let resolved = geolocator.locate().await?.into_resolved()?;
        server.await??;

        assert_eq!(resolved.coordinate, Coordinate::new(48.85, 2.35));
        assert_eq!(resolved.status_message(), "Approx. location: Paris, France");
        Ok(())
    }
}
