//! Weather inputs that drive fire spread.
//!
//! `SimulationParameters` is the snapshot the dashboard sliders produce. It is
//! validated once at construction and read-only while a run is active.

use crate::core_types::units::{Celsius, Degrees, KilometersPerHour, Percent};
use crate::error::SimError;
use crate::physics::compute_risk;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Accepted ranges for each input.
pub mod parameter_ranges {
    use std::ops::RangeInclusive;

    /// Wind speed in km/h
    pub const WIND_SPEED: RangeInclusive<f64> = 0.0..=100.0;
    /// Air temperature in °C
    pub const TEMPERATURE: RangeInclusive<f64> = 0.0..=50.0;
    /// Relative humidity in %
    pub const HUMIDITY: RangeInclusive<f64> = 0.0..=100.0;
    /// Simulation speed multiplier
    pub const SIMULATION_SPEED: RangeInclusive<f64> = 0.1..=5.0;
}

/// Weather and speed inputs for a run.
///
/// # Example
/// ```
/// use fire_spread_core::SimulationParameters;
///
/// let params = SimulationParameters::new(0.0, 10.0, 25.0, 50.0, 1.0).unwrap();
/// assert_eq!(params.risk(), 50);
/// assert!(SimulationParameters::new(0.0, 10.0, 25.0, 150.0, 1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters", into = "RawParameters")]
pub struct SimulationParameters {
    wind_direction: Degrees,
    wind_speed: KilometersPerHour,
    temperature: Celsius,
    humidity: Percent,
    simulation_speed: f64,
}

impl Default for SimulationParameters {
    /// Dashboard slider defaults: calm north wind, 25 °C, 50 % humidity.
    fn default() -> Self {
        SimulationParameters {
            wind_direction: Degrees::new(0.0),
            wind_speed: KilometersPerHour::new(10.0),
            temperature: Celsius::new(25.0),
            humidity: Percent::new(50.0),
            simulation_speed: 1.0,
        }
    }
}

/// Wire shape of [`SimulationParameters`]; validated on the way in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawParameters {
    temperature: f64,
    humidity: f64,
    wind_speed: f64,
    wind_direction: f64,
    simulation_speed: f64,
}

impl TryFrom<RawParameters> for SimulationParameters {
    type Error = SimError;

    fn try_from(raw: RawParameters) -> Result<Self, SimError> {
        SimulationParameters::new(
            raw.wind_direction,
            raw.wind_speed,
            raw.temperature,
            raw.humidity,
            raw.simulation_speed,
        )
    }
}

impl From<SimulationParameters> for RawParameters {
    fn from(p: SimulationParameters) -> Self {
        RawParameters {
            temperature: *p.temperature,
            humidity: *p.humidity,
            wind_speed: *p.wind_speed,
            wind_direction: *p.wind_direction,
            simulation_speed: p.simulation_speed,
        }
    }
}

fn check(name: &str, value: f64, range: &RangeInclusive<f64>) -> Result<f64, SimError> {
    if value.is_finite() && range.contains(&value) {
        Ok(value)
    } else {
        Err(SimError::invalid_parameter(
            name,
            value,
            &format!("[{}, {}]", range.start(), range.end()),
        ))
    }
}

impl SimulationParameters {
    /// Create validated parameters.
    ///
    /// Wind direction is wrapped into `[0, 360)`; every other input must lie
    /// within its range in [`parameter_ranges`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] for out-of-range or non-finite input.
    pub fn new(
        wind_direction: f64,
        wind_speed: f64,
        temperature: f64,
        humidity: f64,
        simulation_speed: f64,
    ) -> Result<Self, SimError> {
        if !wind_direction.is_finite() {
            return Err(SimError::invalid_parameter(
                "wind direction",
                wind_direction,
                "[0, 360)",
            ));
        }
        Ok(SimulationParameters {
            wind_direction: Degrees::new(wind_direction).normalized(),
            wind_speed: KilometersPerHour::new(check(
                "wind speed",
                wind_speed,
                &parameter_ranges::WIND_SPEED,
            )?),
            temperature: Celsius::new(check(
                "temperature",
                temperature,
                &parameter_ranges::TEMPERATURE,
            )?),
            humidity: Percent::new(check("humidity", humidity, &parameter_ranges::HUMIDITY)?),
            simulation_speed: check(
                "simulation speed",
                simulation_speed,
                &parameter_ranges::SIMULATION_SPEED,
            )?,
        })
    }

    pub fn wind_direction(&self) -> Degrees {
        self.wind_direction
    }

    pub fn wind_speed(&self) -> KilometersPerHour {
        self.wind_speed
    }

    pub fn temperature(&self) -> Celsius {
        self.temperature
    }

    pub fn humidity(&self) -> Percent {
        self.humidity
    }

    pub fn simulation_speed(&self) -> f64 {
        self.simulation_speed
    }

    /// Same conditions at a different simulation speed.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidParameter`] if `speed` is outside
    /// [`parameter_ranges::SIMULATION_SPEED`].
    pub fn with_simulation_speed(self, speed: f64) -> Result<Self, SimError> {
        Ok(SimulationParameters {
            simulation_speed: check("simulation speed", speed, &parameter_ranges::SIMULATION_SPEED)?,
            ..self
        })
    }

    /// Fire risk score (0-100) for these conditions.
    pub fn risk(&self) -> u8 {
        compute_risk(*self.temperature, *self.humidity, *self.wind_speed)
    }
}
