//! Fire entity management and the run lifecycle.
//!
//! [`FireSimulation`] owns the live fire set and applies the spread engine to
//! it. [`session::SimulationSession`] wraps it with the clock, parameters,
//! notifications and persistence; [`session::LiveSession`] drives a session
//! from a wall-clock timer.

pub mod clock;
pub mod driver;
pub mod merge;
pub mod metrics;
pub mod notifications;
pub mod persistence;
pub mod replay;
pub mod session;
pub mod spread;

pub use clock::{ClockEvent, ClockState, SimulationClock};
pub use driver::{TickControl, TickDriver};
pub use metrics::{DerivedMetrics, MitigationStrategy};
pub use notifications::{Notification, NotificationLevel, NotificationQueue, SessionPrompt};
pub use persistence::{
    InMemoryRunStore, InitialFire, JsonFileRunStore, PersistenceError, RunId, RunStore, SavedRun,
};
pub use replay::{HistoricalRun, ReplayPlan};
pub use session::{LiveSession, SimulationSession, SimulationSnapshot};

use crate::config::SimulationConfig;
use crate::core_types::fire::{FireEntity, FireId};
use crate::core_types::geo::LatLng;
use crate::core_types::units::Degrees;
use crate::core_types::weather::SimulationParameters;
use crate::error::SimError;
use merge::merge_close_fires;
use rand::Rng;
use tracing::{debug, warn};

/// The live fire set plus the seed fires it was started from.
#[derive(Debug, Clone)]
pub struct FireSimulation {
    fires: Vec<FireEntity>,
    initial_fires: Vec<InitialFire>,
    next_seed: u64,
    config: SimulationConfig,
}

impl FireSimulation {
    pub fn new(config: SimulationConfig) -> Self {
        FireSimulation {
            fires: Vec::new(),
            initial_fires: Vec::new(),
            next_seed: 0,
            config,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Every entity, including ones retired this tick.
    pub fn fires(&self) -> &[FireEntity] {
        &self.fires
    }

    pub fn active_fires(&self) -> impl Iterator<Item = &FireEntity> {
        self.fires.iter().filter(|f| f.active)
    }

    pub fn active_count(&self) -> usize {
        self.active_fires().count()
    }

    pub fn is_empty(&self) -> bool {
        self.fires.is_empty()
    }

    /// Seed fires in placement order.
    pub fn initial_fires(&self) -> &[InitialFire] {
        &self.initial_fires
    }

    /// Place a seed fire heading along `wind_direction`, then merge the set.
    ///
    /// Returns the entity as created; the merge may fold it into an older fire.
    ///
    /// # Errors
    /// - [`SimError::InvalidParameter`] for a non-finite position
    /// - [`SimError::Capacity`] when the set already holds the placement limit
    pub fn add_fire(
        &mut self,
        position: LatLng,
        wind_direction: Degrees,
    ) -> Result<FireEntity, SimError> {
        if !position.is_finite() {
            return Err(SimError::InvalidParameter(format!(
                "fire position must be finite, got {position}"
            )));
        }
        let limit = self.config.placement_limit();
        if self.fires.len() >= limit {
            warn!("Refusing fire at {position}: {} fires live", self.fires.len());
            return Err(SimError::Capacity { limit });
        }

        let fire = self.spawn_seed(position, wind_direction, 1.0);
        self.fires.push(fire.clone());
        self.initial_fires.push(InitialFire {
            lat: position.lat,
            lng: position.lng,
            intensity: fire.intensity,
        });
        let fires = std::mem::take(&mut self.fires);
        self.fires = merge_close_fires(
            fires,
            self.config.merge_distance,
            self.config.max_history_points,
        );
        debug!("Placed fire {} at {position}", fire.id);
        Ok(fire)
    }

    /// Replace everything with fires at the recorded seed positions.
    ///
    /// No merge pass runs, so the replayed run starts from exactly the stored set.
    ///
    /// # Errors
    /// - [`SimError::NoFires`] for an empty list
    /// - [`SimError::Capacity`] if the list exceeds the placement limit
    pub fn reseed(
        &mut self,
        initial_fires: &[InitialFire],
        wind_direction: Degrees,
    ) -> Result<(), SimError> {
        if initial_fires.is_empty() {
            return Err(SimError::NoFires);
        }
        let limit = self.config.placement_limit();
        if initial_fires.len() > limit {
            return Err(SimError::Capacity { limit });
        }

        self.clear();
        for seed in initial_fires {
            let fire = self.spawn_seed(seed.position(), wind_direction, seed.intensity);
            self.fires.push(fire);
        }
        self.initial_fires = initial_fires.to_vec();
        Ok(())
    }

    /// Run one spread tick over the current set.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        params: &SimulationParameters,
        tick_index: u64,
        rng: &mut R,
    ) {
        self.fires = spread::spread_tick(&self.fires, params, tick_index, &self.config, rng);
    }

    pub fn clear(&mut self) {
        self.fires.clear();
        self.initial_fires.clear();
        self.next_seed = 0;
    }

    fn spawn_seed(&mut self, position: LatLng, direction: Degrees, intensity: f64) -> FireEntity {
        self.next_seed += 1;
        FireEntity::with_intensity(FireId::seed(self.next_seed), position, direction, intensity)
    }
}
