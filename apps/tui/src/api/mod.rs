pub mod client;
pub mod payload;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::{HttpRiskApi, RiskApi};
pub use payload::{build_payload, current_utc_month};
