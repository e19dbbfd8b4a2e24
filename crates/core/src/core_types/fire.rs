//! Fire entities: the spreading fronts the simulation creates, moves and retires.

use crate::core_types::geo::LatLng;
use crate::core_types::units::Degrees;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a fire entity.
///
/// Seeds are numbered (`f1`, `f2`, ...). Spread children append the tick
/// index and branch index to their parent's id, so ids stay unique without a
/// global counter and a run with a fixed seed reproduces the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FireId(String);

impl FireId {
    /// Id of the `n`-th seed fire placed in a simulation.
    pub fn seed(n: u64) -> Self {
        FireId(format!("f{n}"))
    }

    /// Id of the child spawned by `parent` on `tick` along `branch`.
    pub fn child(parent: &FireId, tick: u64, branch: usize) -> Self {
        FireId(format!("{}-{tick}-{branch}", parent.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single active or retired fire front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireEntity {
    pub id: FireId,
    /// Current leading edge
    pub position: LatLng,
    pub intensity: f64,
    /// Cumulative distance travelled (degrees)
    pub spread: f64,
    /// Heading, clockwise from north, in `[0, 360)`
    pub direction: Degrees,
    /// Consecutive ticks without movement
    pub last_movement: u32,
    pub active: bool,
    /// Visited positions, most recent last
    pub history: Vec<LatLng>,
}

impl FireEntity {
    /// Create a seed fire at `position` heading along the wind.
    pub fn ignite(id: FireId, position: LatLng, direction: Degrees) -> Self {
        Self::with_intensity(id, position, direction, 1.0)
    }

    /// Create a seed fire with an explicit intensity (used when replaying saved runs).
    pub fn with_intensity(id: FireId, position: LatLng, direction: Degrees, intensity: f64) -> Self {
        FireEntity {
            id,
            position,
            intensity: intensity.max(0.0),
            spread: 0.0,
            direction: direction.normalized(),
            last_movement: 0,
            active: true,
            history: vec![position],
        }
    }

    /// Copy of this entity marked as retired.
    #[must_use]
    pub fn retired(&self) -> Self {
        FireEntity {
            active: false,
            ..self.clone()
        }
    }

    /// Copy of this entity that failed to move this tick.
    #[must_use]
    pub fn stalled(&self) -> Self {
        FireEntity {
            last_movement: self.last_movement.saturating_add(1),
            ..self.clone()
        }
    }

    /// Burned-area heuristic used for resource estimates.
    ///
    /// `pi * (spread * 100)^2 / 100`; not a geodesic area.
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * (self.spread * 100.0).powi(2) / 100.0
    }
}

/// Append `point` to `history`, keeping only the most recent `max_points`.
pub(crate) fn push_history(history: &[LatLng], point: LatLng, max_points: usize) -> Vec<LatLng> {
    let mut next = Vec::with_capacity(history.len() + 1);
    next.extend_from_slice(history);
    next.push(point);
    truncate_front(next, max_points)
}

/// Drop the oldest entries until at most `max_points` remain.
pub(crate) fn truncate_front(mut history: Vec<LatLng>, max_points: usize) -> Vec<LatLng> {
    if history.len() > max_points {
        history.drain(..history.len() - max_points);
    }
    history
}
