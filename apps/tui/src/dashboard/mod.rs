//! The location → prediction → render pipeline.
//!
//! `Dashboard` owns the shared state (last resolved coordinate and the
//! rolling risk history). Network calls are plain async functions that take
//! what they need by value, so a caller can run them on a spawned task and
//! hand the outcome back to `apply_*` on the UI thread. The `boot`,
//! `predict` and `refresh` helpers chain the same steps inline.

pub mod view;

use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{build_payload, current_utc_month, RiskApi};
use crate::config::MapConfig;
use crate::domain::{Coordinate, Overrides, Prediction, RiskHistory, RiskSample, WeatherData};
use crate::error::DashboardError;
use crate::location::{LocationResolver, ResolvedLocation, LOCATION_UNAVAILABLE};

pub use view::{
    Badge, ChartSeries, MapView, MarkerView, RiskRenderer, ViewState, WeatherPanel,
    MODEL_NOT_RESPONDING,
};

pub struct Dashboard {
    api: Arc<dyn RiskApi>,
    map: MapConfig,
    coordinate: Option<Coordinate>,
    history: RiskHistory,
}

impl Dashboard {
    pub fn new(api: Arc<dyn RiskApi>, map: MapConfig) -> Self {
        Self {
            api,
            map,
            coordinate: None,
            history: RiskHistory::new(),
        }
    }

    pub const fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub const fn history(&self) -> &RiskHistory {
        &self.history
    }

    pub fn api(&self) -> Arc<dyn RiskApi> {
        Arc::clone(&self.api)
    }

    /// Records a location outcome. Only a successful resolution touches the
    /// stored coordinate.
    pub fn apply_location<R: RiskRenderer>(
        &mut self,
        outcome: Result<ResolvedLocation, DashboardError>,
        renderer: &mut R,
    ) -> Option<Coordinate> {
        match outcome {
            Ok(resolved) => {
                self.coordinate = Some(resolved.coordinate);
                renderer.update_status(&resolved.status_message());
                renderer.init_map(&MapView {
                    center: resolved.coordinate,
                    zoom: self.map.zoom,
                    detail: self.map.detail,
                    attribution: self.map.attribution.clone(),
                });
                Some(resolved.coordinate)
            }
            Err(e) => {
                warn!("location unavailable: {e}");
                renderer.update_status(LOCATION_UNAVAILABLE);
                None
            }
        }
    }

    /// Sends one prediction request for `coordinate`.
    pub async fn fetch_prediction(
        api: &dyn RiskApi,
        coordinate: Coordinate,
        overrides: &Overrides,
    ) -> Result<Prediction, DashboardError> {
        let payload = build_payload(coordinate, current_utc_month(), overrides);
        info!(%coordinate, overrides = overrides.len(), "requesting prediction");
        api.predict(&payload).await?.into_prediction()
    }

    pub async fn fetch_weather(
        api: &dyn RiskApi,
        coordinate: Coordinate,
    ) -> Result<WeatherData, DashboardError> {
        api.weather(coordinate).await?.into_data()
    }

    /// Renders a prediction outcome. Returns `true` when it succeeded and
    /// the weather fetch should follow.
    pub fn apply_prediction<R: RiskRenderer>(
        &mut self,
        coordinate: Coordinate,
        outcome: Result<Prediction, DashboardError>,
        renderer: &mut R,
    ) -> bool {
        match outcome {
            Ok(prediction) => {
                info!(
                    severity = %prediction.severity,
                    probability = prediction.probability,
                    "prediction received"
                );
                self.render_prediction(coordinate, &prediction, renderer);
                true
            }
            Err(e) => {
                warn!("prediction failed: {e}");
                renderer.update_badge(&Badge::unavailable());
                renderer.update_advice(MODEL_NOT_RESPONDING);
                false
            }
        }
    }

    fn render_prediction<R: RiskRenderer>(
        &mut self,
        coordinate: Coordinate,
        prediction: &Prediction,
        renderer: &mut R,
    ) {
        renderer.update_badge(&Badge::for_prediction(prediction));
        renderer.update_advice(&prediction.advice);
        renderer.update_disaster_type(&view::disaster_label(
            prediction.predicted_disaster.as_deref(),
        ));

        renderer.update_marker(&MarkerView::for_prediction(coordinate, prediction));

        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.history.push(RiskSample::new(
            timestamp,
            prediction.probability,
            prediction.color.clone(),
        ));
        if let Some(series) = ChartSeries::from_history(&self.history) {
            renderer.update_chart_series(&series);
        }
    }

    pub fn apply_weather<R: RiskRenderer>(
        outcome: Result<WeatherData, DashboardError>,
        renderer: &mut R,
    ) {
        let panel = match outcome {
            Ok(data) => WeatherPanel::Loaded(data),
            Err(e) => {
                warn!("weather unavailable: {e}");
                WeatherPanel::Unavailable
            }
        };
        renderer.update_weather_panel(&panel);
    }

    /// Resolves the location and runs the first prediction.
    pub async fn boot<R: RiskRenderer>(&mut self, resolver: &LocationResolver, renderer: &mut R) {
        let outcome = resolver.resolve().await;
        if let Some(coordinate) = self.apply_location(outcome, renderer) {
            self.predict(coordinate, &Overrides::new(), renderer).await;
        }
    }

    /// Prediction followed, on success, by the weather fetch.
    pub async fn predict<R: RiskRenderer>(
        &mut self,
        coordinate: Coordinate,
        overrides: &Overrides,
        renderer: &mut R,
    ) {
        let api = self.api();
        let outcome = Self::fetch_prediction(api.as_ref(), coordinate, overrides).await;
        if self.apply_prediction(coordinate, outcome, renderer) {
            let weather = Self::fetch_weather(api.as_ref(), coordinate).await;
            Self::apply_weather(weather, renderer);
        }
    }

    /// Re-runs the prediction for the last known coordinate. Returns `false`
    /// without doing anything when no location has been resolved yet.
    pub async fn refresh<R: RiskRenderer>(&mut self, overrides: &Overrides, renderer: &mut R) -> bool {
        let Some(coordinate) = self.coordinate else {
            return false;
        };
        self.predict(coordinate, overrides, renderer).await;
        true
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::domain::{PredictionResult, WeatherResult};

    /// Scripted backend that records every call.
    #[derive(Default)]
    pub struct FakeApi {
        predictions: Mutex<VecDeque<Value>>,
        weather: Mutex<VecDeque<Value>>,
        pub payloads: Mutex<Vec<Map<String, Value>>>,
        pub weather_calls: Mutex<Vec<Coordinate>>,
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_prediction(self, body: Value) -> Self {
            if let Ok(mut queue) = self.predictions.lock() {
                queue.push_back(body);
            }
            self
        }

        pub fn with_weather(self, body: Value) -> Self {
            if let Ok(mut queue) = self.weather.lock() {
                queue.push_back(body);
            }
            self
        }

        pub fn prediction_calls(&self) -> usize {
            self.payloads.lock().map(|p| p.len()).unwrap_or_default()
        }

        pub fn weather_call_count(&self) -> usize {
            self.weather_calls.lock().map(|w| w.len()).unwrap_or_default()
        }
    }

    fn next(queue: &Mutex<VecDeque<Value>>) -> Result<Value, DashboardError> {
        queue
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .ok_or_else(|| DashboardError::PredictionFailed("connection refused".to_string()))
    }

    #[async_trait]
    impl RiskApi for FakeApi {
        async fn predict(
            &self,
            payload: &Map<String, Value>,
        ) -> Result<PredictionResult, DashboardError> {
            if let Ok(mut payloads) = self.payloads.lock() {
                payloads.push(payload.clone());
            }
            Ok(serde_json::from_value(next(&self.predictions)?)?)
        }

        async fn weather(&self, coordinate: Coordinate) -> Result<WeatherResult, DashboardError> {
            if let Ok(mut calls) = self.weather_calls.lock() {
                calls.push(coordinate);
            }
            Ok(serde_json::from_value(next(&self.weather)?)?)
        }

        async fn health(&self) -> Result<bool, DashboardError> {
            Ok(true)
        }
    }
}
