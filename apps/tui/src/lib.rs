// Export our modules for use in the binary and tests
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod event;
pub mod location;
pub mod logging;
pub mod terminal;
pub mod ui;

pub use dashboard::Dashboard;
pub use domain::{Coordinate, Prediction, RiskHistory, Severity};
pub use error::DashboardError;
