use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::error::DashboardError;

/// Number of samples the risk chart keeps.
pub const HISTORY_CAPACITY: usize = 5;

/// Manually entered sensor readings, submitted as text.
pub type Overrides = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Extreme,
    Other(String),
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Extreme => "EXTREME",
            Self::Other(value) => value,
        }
    }

    /// Severity labels are matched exactly; anything else is kept verbatim.
    pub fn parse(value: &str) -> Self {
        match value {
            "LOW" => Self::Low,
            "MODERATE" => Self::Moderate,
            "HIGH" => Self::High,
            "EXTREME" => Self::Extreme,
            other => Self::Other(other.to_string()),
        }
    }

    /// HIGH and EXTREME make the map marker pulse.
    pub const fn is_elevated(&self) -> bool {
        matches!(self, Self::High | Self::Extreme)
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of `POST /api/predict`. Every field is optional because a
/// failed prediction only carries `ok` and `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionResult {
    #[serde(default)]
    pub ok: Value,
    pub probability: Option<f64>,
    pub severity: Option<Severity>,
    pub color: Option<String>,
    pub advice: Option<String>,
    pub predicted_disaster: Option<String>,
    pub error: Option<String>,
}

/// A successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub probability: f64,
    pub severity: Severity,
    pub color: String,
    pub advice: String,
    pub predicted_disaster: Option<String>,
}

/// Used when the backend omits a marker color.
pub const NEUTRAL_COLOR: &str = "#64748b";

impl PredictionResult {
    pub fn into_prediction(self) -> Result<Prediction, DashboardError> {
        if !is_truthy(&self.ok) {
            return Err(DashboardError::PredictionFailed(
                self.error
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| "Prediction failed".to_string()),
            ));
        }

        let probability = self.probability.ok_or_else(|| {
            DashboardError::PredictionFailed("response is missing probability".to_string())
        })?;
        let severity = self.severity.ok_or_else(|| {
            DashboardError::PredictionFailed("response is missing severity".to_string())
        })?;

        Ok(Prediction {
            probability,
            severity,
            color: self.color.unwrap_or_else(|| NEUTRAL_COLOR.to_string()),
            advice: self.advice.unwrap_or_default(),
            predicted_disaster: self.predicted_disaster,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub temperature_2m: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub precipitation: Option<f64>,
}

/// Wire shape of `GET /api/weather`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherResult {
    #[serde(default)]
    pub ok: Value,
    pub data: Option<WeatherData>,
    pub error: Option<String>,
}

impl WeatherResult {
    pub fn into_data(self) -> Result<WeatherData, DashboardError> {
        match (is_truthy(&self.ok), self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(DashboardError::WeatherUnavailable(
                "response has no data".to_string(),
            )),
            (false, _) => Err(DashboardError::WeatherUnavailable(
                self.error.unwrap_or_else(|| "backend reported failure".to_string()),
            )),
        }
    }
}

/// JSON truthiness: `false`, `null`, `0`, `""` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSample {
    pub timestamp: String,
    pub probability_percent: f64,
    pub color: String,
}

impl RiskSample {
    pub fn new(timestamp: impl Into<String>, probability: f64, color: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            probability_percent: round_tenths(probability * 100.0),
            color: color.into(),
        }
    }
}

/// Rounds to one decimal, ties away from zero.
pub(crate) fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Fixed-capacity FIFO of recent risk samples, oldest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RiskHistory {
    samples: VecDeque<RiskSample>,
}

impl RiskHistory {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    pub fn push(&mut self, sample: RiskSample) {
        self.samples.push_back(sample);
        while self.samples.len() > HISTORY_CAPACITY {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&RiskSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RiskSample> {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_keeps_five_most_recent() {
        let mut history = RiskHistory::new();
        for i in 0..6 {
            history.push(RiskSample::new(format!("t{i}"), f64::from(i) / 10.0, "#fff"));
        }

        assert_eq!(history.len(), HISTORY_CAPACITY);
        let labels: Vec<_> = history.iter().map(|s| s.timestamp.as_str()).collect();
        assert_eq!(labels, ["t1", "t2", "t3", "t4", "t5"]);
        assert_eq!(history.latest().map(|s| s.probability_percent), Some(50.0));
    }

    #[test]
    fn test_sample_rounds_to_one_decimal() {
        let sample = RiskSample::new("12:00:00", 0.123_46, "#00ff00");
        assert!((sample.probability_percent - 12.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_severity_parse_is_exact() {
        assert_eq!(Severity::parse("HIGH"), Severity::High);
        assert_eq!(Severity::parse("high"), Severity::Other("high".to_string()));
        assert!(Severity::Extreme.is_elevated());
        assert!(!Severity::Moderate.is_elevated());
        assert_eq!(Severity::Other("SEVERE".to_string()).to_string(), "SEVERE");
    }

    #[test]
    fn test_failed_prediction_carries_server_error() -> Result<(), Box<dyn std::error::Error>> {
        let result: PredictionResult =
            serde_json::from_value(json!({"ok": false, "error": "model timeout"}))?;
        let err = result.into_prediction().err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("model timeout"));

        let result: PredictionResult = serde_json::from_value(json!({}))?;
        let err = result.into_prediction().err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("Prediction failed"));
        Ok(())
    }

    #[test]
    fn test_successful_prediction_decodes() -> Result<(), Box<dyn std::error::Error>> {
        let result: PredictionResult = serde_json::from_value(json!({
            "ok": true,
            "probability": 0.82,
            "severity": "EXTREME",
            "color": "#ff0000",
            "advice": "Evacuate",
            "predicted_disaster": "flood"
        }))?;
        let prediction = result.into_prediction()?;
        assert_eq!(prediction.severity, Severity::Extreme);
        assert_eq!(prediction.color, "#ff0000");
        assert_eq!(prediction.predicted_disaster.as_deref(), Some("flood"));
        Ok(())
    }

    #[test]
    fn test_weather_requires_ok_and_data() -> Result<(), Box<dyn std::error::Error>> {
        let partial: WeatherResult =
            serde_json::from_value(json!({"ok": true, "data": {"temperature_2m": 21.5}}))?;
        let data = partial.into_data()?;
        assert_eq!(data.temperature_2m, Some(21.5));
        assert_eq!(data.wind_speed_10m, None);

        let empty: WeatherResult = serde_json::from_value(json!({"ok": true}))?;
        assert!(empty.into_data().is_err());

        let failed: WeatherResult = serde_json::from_value(json!({"ok": false, "data": {}}))?;
        assert!(failed.into_data().is_err());
        Ok(())
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }
}
