//! Simulation configuration.
//!
//! Every limit the spread engine enforces lives here so tests and demos can
//! tighten them. Unknown fields are rejected and missing fields fall back to
//! the defaults below.

use crate::core_types::geo::LatLng;
use crate::simulation::persistence::PersistenceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Tunable limits and constants for a simulation session.
///
/// # Example
/// ```
/// use fire_spread_core::SimulationConfig;
///
/// let config = SimulationConfig {
///     max_active_fires: 10,
///     seed: Some(7),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// assert_eq!(config.placement_limit(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Ceiling on live fires after each tick
    pub max_active_fires: usize,
    /// Planar distance (degrees) under which two fires merge
    pub merge_distance: f64,
    /// Ticks without movement before a fire retires
    pub inactivity_limit: u32,
    /// Positions kept in each fire's history
    pub max_history_points: usize,
    /// Responders per active fire
    pub responders_per_fire: f64,
    /// Responders per unit of intensity
    pub responders_per_intensity: f64,
    /// Responders per unit of burned-area heuristic
    pub responders_per_area: f64,
    /// Ticks before a run stops on its own
    pub auto_stop_duration: u64,
    /// Wall-clock interval between ticks
    pub tick_interval_ms: u64,
    /// Offset (degrees) of the two side branches from the heading
    pub side_branch_offset_degrees: f64,
    /// Label stored with saved runs
    pub location_label: String,
    /// Map centre used when the caller does not supply one
    pub default_center: LatLng,
    /// Fixed RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            max_active_fires: 50,
            merge_distance: 0.02,
            inactivity_limit: 5,
            max_history_points: 10,
            responders_per_fire: 5.0,
            responders_per_intensity: 2.0,
            responders_per_area: 0.1,
            auto_stop_duration: 20,
            tick_interval_ms: 1000,
            side_branch_offset_degrees: 45.0,
            location_label: "San José de Chiquitos".to_string(),
            default_center: LatLng::new(-17.8, -61.5),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let contents =
            fs::read_to_string(path).map_err(|e| PersistenceError::LoadFailed(e.to_string()))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| PersistenceError::ParseFailed(e.to_string()))?;
        config.validate().map_err(PersistenceError::ParseFailed)?;
        Ok(config)
    }

    /// Check that every limit is usable.
    ///
    /// # Errors
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_active_fires == 0 {
            return Err("max_active_fires must be at least 1".to_string());
        }
        if !(self.merge_distance.is_finite() && self.merge_distance >= 0.0) {
            return Err(format!(
                "merge_distance must be finite and non-negative, got {}",
                self.merge_distance
            ));
        }
        if self.max_history_points == 0 {
            return Err("max_history_points must be at least 1".to_string());
        }
        if self.auto_stop_duration == 0 {
            return Err("auto_stop_duration must be at least 1 tick".to_string());
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be positive".to_string());
        }
        let rates = [
            ("responders_per_fire", self.responders_per_fire),
            ("responders_per_intensity", self.responders_per_intensity),
            ("responders_per_area", self.responders_per_area),
            ("side_branch_offset_degrees", self.side_branch_offset_degrees),
        ];
        for (name, value) in rates {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }
        if !self.default_center.is_finite() {
            return Err("default_center must be finite".to_string());
        }
        Ok(())
    }

    /// Live-set size at which new placements are refused.
    pub fn placement_limit(&self) -> usize {
        self.max_active_fires * 2
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.max_active_fires, 50);
        assert_eq!(config.merge_distance, 0.02);
        assert_eq!(config.inactivity_limit, 5);
        assert_eq!(config.max_history_points, 10);
        assert_eq!(config.auto_stop_duration, 20);
        assert_eq!(config.placement_limit(), 100);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"max_active_fires": 12, "seed": 99}"#).unwrap();
        assert_eq!(config.max_active_fires, 12);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.merge_distance, 0.02);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(serde_json::from_str::<SimulationConfig>(r#"{"max_fires": 12}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = SimulationConfig {
            max_active_fires: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            merge_distance: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_round_trip() {
        let path = std::env::temp_dir().join("fire_spread_config_test.json");
        let config = SimulationConfig {
            auto_stop_duration: 5,
            ..Default::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = SimulationConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_file(path);
    }
}
