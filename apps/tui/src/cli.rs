use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "risk_dashboard", version, about = "Disaster risk dashboard")]
pub struct CliArgs {
    /// Run one prediction, print it and exit
    #[arg(long)]
    pub headless: bool,

    /// Print headless output as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the prediction backend base URL
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Read the device position from a gpsd daemon
    #[arg(long, value_name = "HOST:PORT")]
    pub gpsd: Option<String>,

    /// Fixed device latitude (requires --lon)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Fixed device longitude (requires --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Seconds between automatic refreshes
    #[arg(long = "refresh-secs", value_name = "SECS")]
    pub refresh_secs: Option<u64>,
}

impl CliArgs {
    /// Environment variables the flags stand in for. `--debug` is not one of
    /// them; it goes straight to the log filter.
    pub fn env_overrides(&self) -> Vec<(&'static str, String)> {
        let mut vars = Vec::new();
        if let Some(url) = &self.api_url {
            vars.push(("RISK_API_URL", url.clone()));
        }
        if let Some(addr) = &self.gpsd {
            vars.push(("GPSD_ADDR", addr.clone()));
        }
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            vars.push(("DEVICE_LAT", lat.to_string()));
            vars.push(("DEVICE_LON", lon.to_string()));
        }
        if let Some(secs) = self.refresh_secs {
            vars.push(("REFRESH_INTERVAL_SECS", secs.to_string()));
        }
        vars
    }

    pub fn apply_env_overrides(&self) {
        for (key, value) in self.env_overrides() {
            std::env::set_var(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_fixed_position() -> Result<(), clap::Error> {
        let args = CliArgs::try_parse_from(["risk_dashboard", "--lat", "37.7", "--lon", "-122.4"])?;
        assert_eq!(args.lat, Some(37.7));
        assert_eq!(args.lon, Some(-122.4));
        Ok(())
    }

    #[test]
    fn test_lat_requires_lon() {
        assert!(CliArgs::try_parse_from(["risk_dashboard", "--lat", "37.7"]).is_err());
    }

    #[test]
    fn test_gpsd_and_refresh_flags() -> Result<(), clap::Error> {
        let args = CliArgs::try_parse_from([
            "risk_dashboard",
            "--gpsd",
            "127.0.0.1:2947",
            "--refresh-secs",
            "60",
            "--headless",
        ])?;
        assert_eq!(args.gpsd.as_deref(), Some("127.0.0.1:2947"));
        assert_eq!(args.refresh_secs, Some(60));
        assert!(args.headless);
        Ok(())
    }

    #[test]
    fn test_env_overrides_follow_flags() -> Result<(), clap::Error> {
        let args = CliArgs::try_parse_from([
            "risk_dashboard",
            "--debug",
            "--api-url",
            "http://risk.local",
            "--lat",
            "1.5",
            "--lon",
            "2.5",
        ])?;
        let vars = args.env_overrides();

        assert_eq!(
            vars,
            vec![
                ("RISK_API_URL", "http://risk.local".to_string()),
                ("DEVICE_LAT", "1.5".to_string()),
                ("DEVICE_LON", "2.5".to_string()),
            ]
        );
        assert!(vars.iter().all(|(key, _)| *key != "DEBUG"));
        Ok(())
    }
}
