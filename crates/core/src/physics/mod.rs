//! Weather-driven models: fire risk score and spread rate.

pub mod risk;
pub mod spread_rate;

pub use risk::compute_risk;
pub use spread_rate::{spread_distance, spread_rate, MIN_SPREAD_DISTANCE};
