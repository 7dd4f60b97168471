use serde::Serialize;

use crate::config::MapDetail;
use crate::domain::{round_tenths, Coordinate, Prediction, RiskHistory, Severity, WeatherData};

pub const RISK_UNAVAILABLE: &str = "Risk unavailable";
pub const MODEL_NOT_RESPONDING: &str = "Model not responding.";
pub const WEATHER_UNAVAILABLE: &str = "Unable to load weather data.";
pub const PLACEHOLDER: &str = "—";

/// The UI surface the pipeline writes to.
pub trait RiskRenderer {
    fn update_status(&mut self, status: &str);
    fn init_map(&mut self, view: &MapView);
    fn update_badge(&mut self, badge: &Badge);
    fn update_advice(&mut self, advice: &str);
    fn update_disaster_type(&mut self, label: &str);
    fn update_marker(&mut self, marker: &MarkerView);
    fn update_chart_series(&mut self, series: &ChartSeries);
    fn update_weather_panel(&mut self, panel: &WeatherPanel);
}

/// Severity-driven style flags. Always computed together so a previous
/// render never leaves one behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BadgeStyle {
    pub high: bool,
    pub extreme: bool,
}

impl BadgeStyle {
    pub fn for_severity(severity: &Severity) -> Self {
        Self {
            high: *severity == Severity::High,
            extreme: *severity == Severity::Extreme,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub text: String,
    pub color: Option<String>,
    pub style: BadgeStyle,
}

impl Badge {
    pub fn for_prediction(prediction: &Prediction) -> Self {
        Self {
            text: badge_text(prediction.probability, &prediction.severity),
            color: Some(prediction.color.clone()),
            style: BadgeStyle::for_severity(&prediction.severity),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            text: RISK_UNAVAILABLE.to_string(),
            color: None,
            style: BadgeStyle::default(),
        }
    }
}

/// Uses the same rounding as the chart samples so both show one number.
pub fn badge_text(probability: f64, severity: &Severity) -> String {
    format!("Risk: {:.1}% • {severity}", round_tenths(probability * 100.0))
}

/// Uppercased disaster name, or a dash when the backend gave none.
pub fn disaster_label(predicted: Option<&str>) -> String {
    predicted
        .filter(|name| !name.is_empty())
        .map_or_else(|| PLACEHOLDER.to_string(), str::to_uppercase)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    #[serde(skip)]
    pub detail: MapDetail,
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub coordinate: Coordinate,
    pub color: String,
    pub pulsing: bool,
    pub title: String,
    pub subtitle: String,
}

impl MarkerView {
    pub fn initial(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            color: crate::domain::NEUTRAL_COLOR.to_string(),
            pulsing: false,
            title: "Your Location".to_string(),
            subtitle: String::new(),
        }
    }

    pub fn for_prediction(coordinate: Coordinate, prediction: &Prediction) -> Self {
        let title = prediction
            .predicted_disaster
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("NORMAL")
            .to_uppercase();

        Self {
            coordinate,
            color: prediction.color.clone(),
            pulsing: prediction.severity.is_elevated(),
            title,
            subtitle: prediction.severity.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub line_color: String,
    pub fill_color: String,
}

impl ChartSeries {
    /// Chronological series; the whole line takes the latest sample's color.
    pub fn from_history(history: &RiskHistory) -> Option<Self> {
        let latest = history.latest()?;
        Some(Self {
            labels: history.iter().map(|s| s.timestamp.clone()).collect(),
            values: history.iter().map(|s| s.probability_percent).collect(),
            line_color: latest.color.clone(),
            fill_color: format!("{}33", latest.color),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum WeatherPanel {
    Loaded(WeatherData),
    Unavailable,
}

impl WeatherPanel {
    /// Display rows, one per reading.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Loaded(data) => vec![
                format!("Temp: {} °C", reading(data.temperature_2m)),
                format!("Wind: {} km/h", reading(data.wind_speed_10m)),
                format!("Clouds: {} %", reading(data.cloud_cover)),
                format!("Rain: {} mm", reading(data.precipitation)),
            ],
            Self::Unavailable => vec![WEATHER_UNAVAILABLE.to_string()],
        }
    }
}

fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapState {
    pub view: MapView,
    pub marker: Option<MarkerView>,
}

/// Rendered dashboard state, independent of any terminal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewState {
    pub status: String,
    pub map: Option<MapState>,
    pub badge: Option<Badge>,
    pub advice: Option<String>,
    pub disaster_type: Option<String>,
    pub chart: Option<ChartSeries>,
    pub weather: Option<WeatherPanel>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self) -> Option<&MarkerView> {
        self.map.as_ref().and_then(|map| map.marker.as_ref())
    }
}

impl RiskRenderer for ViewState {
    fn update_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// First call creates the map with a starting marker; later calls only
    /// recenter it.
    fn init_map(&mut self, view: &MapView) {
        if let Some(map) = self.map.as_mut() {
            map.view.center = view.center;
            map.view.zoom = view.zoom;
            return;
        }

        self.map = Some(MapState {
            view: view.clone(),
            marker: Some(MarkerView::initial(view.center)),
        });
    }

    fn update_badge(&mut self, badge: &Badge) {
        self.badge = Some(badge.clone());
    }

    fn update_advice(&mut self, advice: &str) {
        self.advice = Some(advice.to_string());
    }

    fn update_disaster_type(&mut self, label: &str) {
        self.disaster_type = Some(label.to_string());
    }

    /// Ignored until the map exists.
    fn update_marker(&mut self, marker: &MarkerView) {
        if let Some(map) = self.map.as_mut() {
            map.marker = Some(marker.clone());
            map.view.center = marker.coordinate;
        }
    }

    fn update_chart_series(&mut self, series: &ChartSeries) {
        self.chart = Some(series.clone());
    }

    fn update_weather_panel(&mut self, panel: &WeatherPanel) {
        self.weather = Some(panel.clone());
    }
}
