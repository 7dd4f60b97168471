use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use crate::domain::{is_truthy, Coordinate, PredictionResult, WeatherResult};
use crate::error::DashboardError;

/// The prediction backend: `/api/predict`, `/api/weather` and `/api/health`.
#[async_trait]
pub trait RiskApi: Send + Sync {
    async fn predict(&self, payload: &Map<String, Value>) -> Result<PredictionResult, DashboardError>;

    async fn weather(&self, coordinate: Coordinate) -> Result<WeatherResult, DashboardError>;

    async fn health(&self) -> Result<bool, DashboardError>;
}

#[derive(Debug, Clone)]
pub struct HttpRiskApi {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: Value,
}

impl HttpRiskApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DashboardError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl RiskApi for HttpRiskApi {
    async fn predict(&self, payload: &Map<String, Value>) -> Result<PredictionResult, DashboardError> {
        let url = self.endpoint("/api/predict");
        debug!(%url, "requesting prediction");

        // The backend reports model failures in the body, so the status code
        // is not checked here.
        let response = self.client.post(&url).json(payload).send().await?;
        let result = response.json::<PredictionResult>().await?;
        Ok(result)
    }

    async fn weather(&self, coordinate: Coordinate) -> Result<WeatherResult, DashboardError> {
        let url = self.endpoint("/api/weather");
        debug!(%url, %coordinate, "requesting weather");

        let response = self
            .client
            .get(&url)
            .query(&[("lat", coordinate.latitude), ("lon", coordinate.longitude)])
            .send()
            .await?;
        let result = response.json::<WeatherResult>().await?;
        Ok(result)
    }

    async fn health(&self) -> Result<bool, DashboardError> {
        let url = self.endpoint("/api/health");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let health = response.json::<HealthResponse>().await?;
        Ok(is_truthy(&health.ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::payload::build_payload;
    use crate::api::test_server::serve_once;
    use crate::domain::{Overrides, Severity};

    fn api(base_url: &str) -> Result<HttpRiskApi, DashboardError> {
        HttpRiskApi::new(base_url, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_predict_posts_payload() -> Result<(), Box<dyn std::error::Error>> {
        let (base_url, server) = serve_once(
            200,
            r##"{"ok":true,"probability":0.82,"severity":"EXTREME","color":"#ff0000","advice":"Evacuate","predicted_disaster":"flood"}"##,
        )
        .await?;

        let overrides = Overrides::from([("rainfall_mm".to_string(), "150".to_string())]);
        let payload = build_payload(Coordinate::new(37.7, -122.4), 4, &overrides);
        let result = api(&base_url)?.predict(&payload).await?;

        let request = server.await??;
        assert!(request.request_line.starts_with("POST /api/predict"));
        let sent: Value = serde_json::from_str(&request.body)?;
        assert_eq!(sent["lat"], Value::from(37.7));
        assert_eq!(sent["month"], Value::from(4));
        assert_eq!(sent["rainfall_mm"], Value::from("150"));

        let prediction = result.into_prediction()?;
        assert_eq!(prediction.severity, Severity::Extreme);
        Ok(())
    }

    #[tokio::test]
    async fn test_weather_sends_query() -> Result<(), Box<dyn std::error::Error>> {
        let (base_url, server) =
            serve_once(200, r#"{"ok":true,"data":{"temperature_2m":21.5}}"#).await?;

        let result = api(&base_url)?
            .weather(Coordinate::new(37.7, -122.4))
            .await?;

        let request = server.await??;
        assert!(request
            .request_line
            .starts_with("GET /api/weather?lat=37.7&lon=-122.4"));
        assert_eq!(result.into_data()?.temperature_2m, Some(21.5));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let (base_url, server) = serve_once(200, "<html>oops</html>").await?;

        let result = api(&base_url)?.predict(&Map::new()).await;
        server.await??;
        assert!(result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_health() -> Result<(), Box<dyn std::error::Error>> {
        let (base_url, server) = serve_once(200, r#"{"ok":true}"#).await?;
        assert!(api(&base_url)?.health().await?);
        server.await??;
        Ok(())
    }
}
