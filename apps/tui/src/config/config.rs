use color_eyre::eyre::eyre;
use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::Coordinate;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_GEOIP_URL: &str = "https://ipapi.co/json/";
pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 8000;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAP_ZOOM: u8 = 4;
pub const MAP_ATTRIBUTION: &str = "Natural Earth coastlines";

/// Level of detail for the canvas world map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapDetail {
    Low,
    High,
}

impl FromStr for MapDetail {
    type Err = color_eyre::eyre::Report;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "high" => Ok(Self::High),
            other => Err(eyre!("unknown map detail '{other}', expected low or high")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapConfig {
    pub detail: MapDetail,
    pub zoom: u8,
    pub attribution: String,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_url: String,
    pub geoip_url: String,
    pub gpsd_addr: Option<String>,
    pub fixed_position: Option<Coordinate>,
    pub location_timeout: Duration,
    pub refresh_interval: Duration,
    pub http_timeout: Duration,
    pub map: MapConfig,
}

impl DashboardConfig {
    /// Builds the configuration from any key lookup. `init_app_config` feeds
    /// it the process environment.
    pub fn from_lookup<F>(lookup: F) -> color_eyre::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("RISK_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let geoip_url = lookup("GEOIP_URL").unwrap_or_else(|| DEFAULT_GEOIP_URL.to_string());
        let gpsd_addr = lookup("GPSD_ADDR").filter(|addr| !addr.trim().is_empty());

        let fixed_position = match (
            parse_opt::<f64>(&lookup, "DEVICE_LAT")?,
            parse_opt::<f64>(&lookup, "DEVICE_LON")?,
        ) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            (None, None) => None,
            _ => return Err(eyre!("DEVICE_LAT and DEVICE_LON must be set together")),
        };

        let location_timeout = Duration::from_millis(
            parse_opt(&lookup, "LOCATION_TIMEOUT_MS")?.unwrap_or(DEFAULT_LOCATION_TIMEOUT_MS),
        );
        let refresh_secs: u64 =
            parse_opt(&lookup, "REFRESH_INTERVAL_SECS")?.unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS);
        if refresh_secs == 0 {
            return Err(eyre!("REFRESH_INTERVAL_SECS must be greater than zero"));
        }
        let http_timeout_secs: u64 =
            parse_opt(&lookup, "HTTP_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        if http_timeout_secs == 0 {
            return Err(eyre!("HTTP_TIMEOUT_SECS must be greater than zero"));
        }
        let http_timeout = Duration::from_secs(http_timeout_secs);

        let map = MapConfig {
            detail: parse_opt(&lookup, "MAP_DETAIL")?.unwrap_or(MapDetail::High),
            zoom: parse_opt(&lookup, "MAP_ZOOM")?.unwrap_or(DEFAULT_MAP_ZOOM),
            attribution: MAP_ATTRIBUTION.to_string(),
        };

        Ok(Self {
            api_url,
            geoip_url,
            gpsd_addr,
            fixed_position,
            location_timeout,
            refresh_interval: Duration::from_secs(refresh_secs),
            http_timeout,
            map,
        })
    }
}

fn parse_opt<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> color_eyre::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| eyre!("invalid value for {key}: '{value}' ({e})"))
        })
        .transpose()
}

/// Initializes the application configuration from `.env` and the process
/// environment.
pub fn init_app_config() -> color_eyre::Result<DashboardConfig> {
    // Load environment variables from .env file
    dotenv().ok();

    DashboardConfig::from_lookup(|key| env::var(key).ok())
}
