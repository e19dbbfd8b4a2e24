//! Historical runs and replay.
//!
//! Store listings are loosely typed: older records may lack a name, a
//! duration, or even parameters. A [`HistoricalRun`] keeps `parameters` and
//! `initialFires` as raw JSON so the list can always be shown, and checks
//! them only when the user asks to replay.

use crate::core_types::geo::LatLng;
use crate::core_types::weather::SimulationParameters;
use crate::error::SimError;
use crate::simulation::persistence::{InitialFire, RunId};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Duration used when a stored run does not record one.
pub const DEFAULT_REPLAY_DURATION: u64 = 20;

/// One entry of the run history as returned by a store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRun {
    pub id: RunId,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub coordinates: Option<LatLng>,
    #[serde(default)]
    pub fire_risk: Option<u8>,
    #[serde(default)]
    pub fire_detected: bool,
    #[serde(default)]
    pub parameters: Option<Value>,
    #[serde(default)]
    pub initial_fires: Option<Value>,
}

/// A validated request to start a run from stored inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayPlan {
    pub parameters: SimulationParameters,
    pub initial_fires: Vec<InitialFire>,
    /// Auto-stop duration for the replayed run
    pub duration: u64,
}

impl HistoricalRun {
    /// Parse one listing entry.
    ///
    /// # Errors
    /// Returns [`SimError::MalformedReplay`] if the id or timestamp is missing or invalid.
    pub fn from_value(value: Value) -> Result<Self, SimError> {
        serde_json::from_value(value).map_err(|e| SimError::MalformedReplay(e.to_string()))
    }

    /// The user-given name, or the location when none was set.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.location,
        }
    }

    pub fn duration_or_default(&self) -> u64 {
        match self.duration {
            Some(d) if d > 0 => d,
            _ => DEFAULT_REPLAY_DURATION,
        }
    }

    /// Number of seed fires recorded, 0 if the list is missing or malformed.
    pub fn fire_count(&self) -> usize {
        match &self.initial_fires {
            Some(Value::Array(fires)) => fires.len(),
            _ => 0,
        }
    }

    /// Validate the stored inputs for a replay.
    ///
    /// # Errors
    /// Returns [`SimError::MalformedReplay`] when parameters are missing or
    /// invalid, or when the seed fires are not a list of `{lat, lng}` points.
    pub fn replay_plan(&self) -> Result<ReplayPlan, SimError> {
        let raw_params = self
            .parameters
            .as_ref()
            .filter(|v| !v.is_null())
            .ok_or_else(|| SimError::MalformedReplay("parameters are missing".to_string()))?;
        let parameters: SimulationParameters = serde_json::from_value(raw_params.clone())
            .map_err(|e| SimError::MalformedReplay(format!("invalid parameters: {e}")))?;

        let Some(Value::Array(raw_fires)) = &self.initial_fires else {
            return Err(SimError::MalformedReplay(
                "initial fires are not a list".to_string(),
            ));
        };
        let initial_fires = raw_fires
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let fire: InitialFire = serde_json::from_value(v.clone()).map_err(|e| {
                    SimError::MalformedReplay(format!("initial fire {i} is invalid: {e}"))
                })?;
                if fire.position().is_finite() && fire.intensity.is_finite() {
                    Ok(fire)
                } else {
                    Err(SimError::MalformedReplay(format!(
                        "initial fire {i} has non-finite values"
                    )))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReplayPlan {
            parameters,
            initial_fires,
            duration: self.duration_or_default(),
        })
    }
}
