// App module for risk_dashboard
// Holds the terminal session state around the dashboard controller

pub mod form;
pub mod input;
pub mod state;

pub use input::handle_input;
pub use state::{App, UserAction};
