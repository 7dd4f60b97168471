use clap::Parser;
use color_eyre::Result;
use std::sync::Arc;
use tracing::info;

use risk_dashboard::api::HttpRiskApi;
use risk_dashboard::app::App;
use risk_dashboard::cli::CliArgs;
use risk_dashboard::config::{init_app_config, DashboardConfig};
use risk_dashboard::location::{
    FixedSensor, GpsdSensor, HttpGeolocator, LocationResolver, LocationSensor,
};
use risk_dashboard::{event, logging, terminal, Dashboard};

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = init_app_config()?;

    let headless = args.headless || !is_terminal();
    let log_receiver = if headless {
        logging::init_stderr_logging(args.debug);
        None
    } else {
        Some(logging::init_channel_logging(args.debug))
    };
    info!(api_url = %config.api_url, "starting risk dashboard");

    let resolver = build_resolver(&config)?;
    let api = HttpRiskApi::new(config.api_url.clone(), config.http_timeout)?;
    let dashboard = Dashboard::new(Arc::new(api), config.map.clone());

    if headless {
        return event::run_headless(dashboard, &resolver, args.json).await;
    }

    let mut app = App::new(dashboard, config.refresh_interval);
    if let Some(receiver) = log_receiver {
        app = app.with_log_receiver(receiver);
    }

    // Setup terminal
    let (mut term, guard) = terminal::setup_terminal()?;

    // Run the application
    let result = event::run(&mut term, &mut app, resolver).await;

    // Restore terminal
    terminal::cleanup_terminal_state(guard);

    result
}

fn build_resolver(config: &DashboardConfig) -> Result<LocationResolver> {
    let sensor: Option<Arc<dyn LocationSensor>> = match (&config.fixed_position, &config.gpsd_addr)
    {
        (Some(position), _) => Some(Arc::new(FixedSensor(*position))),
        (None, Some(addr)) => Some(Arc::new(GpsdSensor::new(addr.clone()))),
        (None, None) => None,
    };
    let geolocator = HttpGeolocator::new(config.geoip_url.clone(), config.http_timeout)?;

    Ok(LocationResolver::new(
        sensor,
        Arc::new(geolocator),
        config.location_timeout,
    ))
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
