//! Per-tick spread distance of a fire front.
//!
//! ```text
//! rate     = (risk / 100) × (W / 20) × (T / 30) × (1 − H / 150)
//! distance = 0.01 × rate × speed
//! ```
//!
//! W is wind speed (km/h), T temperature (°C), H relative humidity (%).
//! At H = 100 the dryness term is 1/3.

use crate::core_types::weather::SimulationParameters;

/// Degrees travelled per tick at a spread rate of 1.0
const DISTANCE_PER_RATE: f64 = 0.01;

/// Below this distance (degrees) a front does not move this tick.
pub const MIN_SPREAD_DISTANCE: f64 = 0.001;

/// Dimensionless spread rate for the given conditions.
pub fn spread_rate(params: &SimulationParameters) -> f64 {
    let risk = f64::from(params.risk()) / 100.0;
    let wind = *params.wind_speed() / 20.0;
    let temperature = *params.temperature() / 30.0;
    let dryness = 1.0 - *params.humidity() / 150.0;
    (risk * wind * temperature * dryness).max(0.0)
}

/// Distance (degrees) a front covers in one tick.
pub fn spread_distance(params: &SimulationParameters) -> f64 {
    DISTANCE_PER_RATE * spread_rate(params) * params.simulation_speed()
}
