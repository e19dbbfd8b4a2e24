//! Simulation sessions.
//!
//! [`SimulationSession`] is the single owner of run state: fires, clock,
//! parameters, notifications and the pending prompt. Every operation takes
//! `&mut self`, so ticks, placements and resets never interleave.
//!
//! [`LiveSession`] shares a session behind a mutex with a [`TickDriver`].
//! The driver exists exactly while the run is active: stopping, clearing or
//! replaying cancels and joins it before touching the session, and a new one
//! is spawned on every start.

use crate::config::SimulationConfig;
use crate::core_types::fire::FireEntity;
use crate::core_types::geo::LatLng;
use crate::core_types::weather::SimulationParameters;
use crate::error::SimError;
use crate::simulation::clock::{ClockEvent, ClockState, SimulationClock};
use crate::simulation::driver::{TickControl, TickDriver};
use crate::simulation::metrics::{DerivedMetrics, MitigationStrategy};
use crate::simulation::notifications::{Notification, NotificationQueue, SessionPrompt};
use crate::simulation::persistence::{PersistenceError, RunId, RunStore, SavedRun};
use crate::simulation::replay::{HistoricalRun, ReplayPlan};
use crate::simulation::FireSimulation;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Read-only view of a session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    /// Active fires only
    pub fires: Vec<FireEntity>,
    pub state: ClockState,
    pub elapsed: u64,
    pub auto_stop_duration: u64,
    pub is_auto_stop: bool,
    pub is_replay: bool,
    pub active_count: usize,
    pub max_active_fires: usize,
    pub risk: u8,
    pub wind_label: &'static str,
    pub metrics: DerivedMetrics,
}

pub struct SimulationSession {
    sim: FireSimulation,
    clock: SimulationClock,
    params: SimulationParameters,
    rng: Box<dyn RngCore + Send>,
    notifications: NotificationQueue,
    prompt: Option<SessionPrompt>,
    is_replay: bool,
    metrics: DerivedMetrics,
}

impl fmt::Debug for SimulationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationSession")
            .field("sim", &self.sim)
            .field("clock", &self.clock)
            .field("params", &self.params)
            .field("prompt", &self.prompt)
            .field("is_replay", &self.is_replay)
            .finish_non_exhaustive()
    }
}

impl SimulationSession {
    /// Create a session with default parameters.
    ///
    /// The RNG is seeded from `config.seed` when set, otherwise from the OS.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidParameter`] if `config` fails validation.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    /// Create a session drawing randomness from `rng`.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidParameter`] if `config` fails validation.
    pub fn with_rng<R>(config: SimulationConfig, rng: R) -> Result<Self, SimError>
    where
        R: RngCore + Send + 'static,
    {
        config.validate().map_err(SimError::InvalidParameter)?;
        let clock = SimulationClock::new(config.auto_stop_duration);
        Ok(SimulationSession {
            sim: FireSimulation::new(config),
            clock,
            params: SimulationParameters::default(),
            rng: Box::new(rng),
            notifications: NotificationQueue::default(),
            prompt: None,
            is_replay: false,
            metrics: DerivedMetrics::default(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        self.sim.config()
    }

    pub fn fires(&self) -> &FireSimulation {
        &self.sim
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn is_active(&self) -> bool {
        self.clock.is_active()
    }

    pub fn is_replay(&self) -> bool {
        self.is_replay
    }

    /// Replace the run parameters.
    ///
    /// While a run is active only the simulation speed may change.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidParameter`] when weather inputs change mid-run.
    pub fn set_parameters(&mut self, params: SimulationParameters) -> Result<(), SimError> {
        if self.clock.is_active() {
            let speed_only = self.params.with_simulation_speed(params.simulation_speed())?;
            if speed_only != params {
                return Err(SimError::InvalidParameter(
                    "weather parameters are locked while the simulation runs".to_string(),
                ));
            }
        }
        self.params = params;
        self.refresh_metrics();
        Ok(())
    }

    /// Change the speed multiplier; allowed at any time.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidParameter`] for an out-of-range speed.
    pub fn set_simulation_speed(&mut self, speed: f64) -> Result<(), SimError> {
        self.params = self.params.with_simulation_speed(speed)?;
        Ok(())
    }

    /// Current fire risk score (0-100).
    pub fn risk(&self) -> u8 {
        self.params.risk()
    }

    /// Place a seed fire heading along the current wind.
    ///
    /// # Errors
    /// Returns [`SimError::Capacity`] at the placement limit (a warning is
    /// queued) or [`SimError::InvalidParameter`] for a non-finite position.
    pub fn add_fire(&mut self, position: LatLng) -> Result<FireEntity, SimError> {
        match self.sim.add_fire(position, self.params.wind_direction()) {
            Ok(fire) => {
                self.refresh_metrics();
                Ok(fire)
            }
            Err(err) => {
                if matches!(err, SimError::Capacity { .. }) {
                    self.notifications.warning("Fire limit reached");
                }
                Err(err)
            }
        }
    }

    /// Begin a run with the default duration. A no-op while already running.
    ///
    /// # Errors
    /// Returns [`SimError::NoFires`] when no active fire is placed.
    pub fn start(&mut self) -> Result<(), SimError> {
        if self.clock.is_active() {
            return Ok(());
        }
        if self.sim.active_count() == 0 {
            self.notifications
                .warning("Add at least one fire before starting");
            return Err(SimError::NoFires);
        }
        self.clock.start();
        self.prompt = None;
        info!(
            "Simulation started with {} fires, stopping after {} ticks",
            self.sim.active_count(),
            self.clock.auto_stop_duration()
        );
        Ok(())
    }

    /// Stop the run. Returns `false` if nothing was running.
    ///
    /// A run that advanced at least one tick raises a prompt: save for a
    /// fresh run, repeat-or-exit for a replay.
    pub fn stop(&mut self) -> bool {
        if !self.clock.stop() {
            return false;
        }
        info!("Simulation stopped at tick {}", self.clock.elapsed());
        if self.clock.elapsed() > 0 {
            self.prompt = Some(if self.is_replay {
                SessionPrompt::RepeatOrExit
            } else {
                SessionPrompt::Save {
                    completed: self.clock.completed(),
                }
            });
        }
        true
    }

    /// Start if idle, stop if running. Returns whether the run is now active.
    ///
    /// # Errors
    /// Returns [`SimError::NoFires`] when starting without fires.
    pub fn toggle(&mut self) -> Result<bool, SimError> {
        if self.clock.is_active() {
            self.stop();
            Ok(false)
        } else {
            self.start()?;
            Ok(true)
        }
    }

    /// Drop every fire and return to idle.
    pub fn clear(&mut self) {
        self.sim.clear();
        self.clock.reset();
        self.prompt = None;
        self.is_replay = false;
        self.refresh_metrics();
        self.notifications.info("Simulation reset");
        info!("Simulation cleared");
    }

    /// Advance one tick. Returns `None` when no run is active.
    pub fn tick(&mut self) -> Option<ClockEvent> {
        if !self.clock.is_active() {
            return None;
        }
        let tick_index = self.clock.elapsed();
        let params = self.params;
        self.sim.tick(&params, tick_index, &mut *self.rng);
        let event = self.clock.advance();
        self.refresh_metrics();

        if let Some(ClockEvent::AutoStopped { elapsed }) = event {
            info!(
                "Simulation completed after {elapsed} ticks with {} active fires",
                self.sim.active_count()
            );
            self.prompt = Some(SessionPrompt::Save { completed: true });
        }
        event
    }

    /// Replay a run from the history list.
    ///
    /// # Errors
    /// Returns [`SimError::MalformedReplay`] when the stored inputs are
    /// incomplete; the session is left untouched and an error is queued.
    pub fn repeat_run(&mut self, run: &HistoricalRun) -> Result<(), SimError> {
        let plan = match run.replay_plan() {
            Ok(plan) => plan,
            Err(err) => {
                warn!("Cannot replay run {}: {err}", run.id);
                self.notifications
                    .error("Could not load this simulation: incomplete data");
                return Err(err);
            }
        };
        self.start_replay(&plan)
    }

    /// Run the current seed fires again with the current parameters and duration.
    ///
    /// # Errors
    /// Returns [`SimError::NoFires`] when nothing was placed.
    pub fn repeat_current(&mut self) -> Result<(), SimError> {
        let plan = ReplayPlan {
            parameters: self.params,
            initial_fires: self.sim.initial_fires().to_vec(),
            duration: self.clock.auto_stop_duration(),
        };
        self.start_replay(&plan)
    }

    fn start_replay(&mut self, plan: &ReplayPlan) -> Result<(), SimError> {
        if let Err(err) = self
            .sim
            .reseed(&plan.initial_fires, plan.parameters.wind_direction())
        {
            self.notifications
                .error(format!("Could not load this simulation: {err}"));
            return Err(err);
        }
        self.params = plan.parameters;
        self.is_replay = true;
        self.prompt = None;
        self.clock.start_with_duration(plan.duration);
        self.refresh_metrics();
        self.notifications.success("Simulation loaded, starting");
        info!(
            "Replaying {} fires for {} ticks",
            plan.initial_fires.len(),
            plan.duration
        );
        Ok(())
    }

    /// Build the record for saving the current run.
    ///
    /// `center` is the map centre; the configured default is used without one.
    ///
    /// # Errors
    /// Returns [`SimError::NoFires`] if no seed fire was placed (an error is queued).
    pub fn prepare_save(&mut self, center: Option<LatLng>) -> Result<SavedRun, SimError> {
        if self.sim.initial_fires().is_empty() {
            self.notifications.error("Add at least one fire before saving");
            return Err(SimError::NoFires);
        }
        let config = self.sim.config();
        Ok(SavedRun {
            timestamp: Utc::now(),
            location: config.location_label.clone(),
            duration: self.clock.elapsed(),
            coordinates: center.unwrap_or(config.default_center),
            parameters: self.params,
            initial_fires: self.sim.initial_fires().to_vec(),
            fire_risk: self.params.risk(),
            fire_detected: !self.sim.is_empty(),
        })
    }

    /// Apply the outcome of a save: close the prompt on success, keep it open on failure.
    ///
    /// # Errors
    /// Passes a store failure through as [`SimError::Persistence`].
    pub fn record_save_result(
        &mut self,
        result: Result<RunId, PersistenceError>,
    ) -> Result<RunId, SimError> {
        match result {
            Ok(id) => {
                self.notifications.success("Simulation saved");
                if matches!(self.prompt, Some(SessionPrompt::Save { .. })) {
                    self.prompt = None;
                }
                info!("Simulation saved as run {id}");
                Ok(id)
            }
            Err(err) => {
                warn!("Saving simulation failed: {err}");
                self.notifications.error(format!("Save failed: {err}"));
                Err(err.into())
            }
        }
    }

    /// Save synchronously to `store`.
    ///
    /// # Errors
    /// Returns [`SimError::NoFires`] without seed fires or
    /// [`SimError::Persistence`] if the store fails.
    pub fn save_to(
        &mut self,
        store: &dyn RunStore,
        center: Option<LatLng>,
    ) -> Result<RunId, SimError> {
        let run = self.prepare_save(center)?;
        let result = store.save(&run);
        self.record_save_result(result)
    }

    /// Rename a stored run and report the outcome.
    ///
    /// # Errors
    /// Returns [`SimError::Persistence`] if the store fails.
    pub fn rename_run(
        &mut self,
        store: &dyn RunStore,
        id: RunId,
        name: &str,
    ) -> Result<(), SimError> {
        match store.rename(id, name) {
            Ok(()) => {
                self.notifications.success("Name updated");
                Ok(())
            }
            Err(err) => {
                self.notifications.error("Could not update the name");
                Err(err.into())
            }
        }
    }

    /// Delete a stored run and report the outcome.
    ///
    /// # Errors
    /// Returns [`SimError::Persistence`] if the store fails.
    pub fn delete_run(&mut self, store: &dyn RunStore, id: RunId) -> Result<(), SimError> {
        match store.delete(id) {
            Ok(()) => {
                self.notifications.success("Simulation deleted");
                Ok(())
            }
            Err(err) => {
                self.notifications.error("Could not delete the simulation");
                Err(err.into())
            }
        }
    }

    pub fn metrics(&self) -> &DerivedMetrics {
        &self.metrics
    }

    pub fn required_responders(&self) -> u64 {
        self.metrics.required_responders
    }

    pub fn mitigation_strategies(&self) -> &[MitigationStrategy] {
        &self.metrics.strategies
    }

    pub fn prompt(&self) -> Option<SessionPrompt> {
        self.prompt
    }

    pub fn take_prompt(&mut self) -> Option<SessionPrompt> {
        self.prompt.take()
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.take_pending()
    }

    /// Delivered notifications, oldest first.
    pub fn notification_history(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.history()
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            fires: self.sim.active_fires().cloned().collect(),
            state: self.clock.state(),
            elapsed: self.clock.elapsed(),
            auto_stop_duration: self.clock.auto_stop_duration(),
            is_auto_stop: self.clock.is_auto_stop(),
            is_replay: self.is_replay,
            active_count: self.sim.active_count(),
            max_active_fires: self.sim.config().max_active_fires,
            risk: self.params.risk(),
            wind_label: self.params.wind_direction().compass_label(),
            metrics: self.metrics.clone(),
        }
    }

    fn refresh_metrics(&mut self) {
        self.metrics = DerivedMetrics::compute(self.sim.fires(), &self.params, self.sim.config());
    }
}

fn lock(shared: &Mutex<SimulationSession>) -> MutexGuard<'_, SimulationSession> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A session ticked by a wall-clock timer.
#[derive(Debug)]
pub struct LiveSession {
    session: Arc<Mutex<SimulationSession>>,
    driver: Option<TickDriver>,
}

impl LiveSession {
    pub fn new(session: SimulationSession) -> Self {
        LiveSession {
            session: Arc::new(Mutex::new(session)),
            driver: None,
        }
    }

    /// Lock the session for reading or for operations that do not change
    /// whether the run is active.
    pub fn lock(&self) -> MutexGuard<'_, SimulationSession> {
        lock(&self.session)
    }

    /// The timer is currently driving ticks.
    pub fn is_running(&self) -> bool {
        self.driver.as_ref().is_some_and(|d| !d.is_finished())
    }

    /// Start a run and its timer.
    ///
    /// # Errors
    /// Returns [`SimError::NoFires`] when no fire is placed.
    pub fn start(&mut self) -> Result<(), SimError> {
        self.halt_driver();
        lock(&self.session).start()?;
        self.spawn_driver();
        Ok(())
    }

    /// Cancel the timer, then stop the run.
    pub fn stop(&mut self) -> bool {
        self.halt_driver();
        lock(&self.session).stop()
    }

    /// # Errors
    /// Returns [`SimError::NoFires`] when starting without fires.
    pub fn toggle(&mut self) -> Result<bool, SimError> {
        if self.lock().is_active() {
            self.stop();
            Ok(false)
        } else {
            self.start()?;
            Ok(true)
        }
    }

    pub fn clear(&mut self) {
        self.halt_driver();
        lock(&self.session).clear();
    }

    /// Replay a stored run. A rejected replay leaves the current run and its
    /// timer going.
    ///
    /// # Errors
    /// See [`SimulationSession::repeat_run`].
    pub fn repeat_run(&mut self, run: &HistoricalRun) -> Result<(), SimError> {
        self.restart_with(|session| session.repeat_run(run))
    }

    /// # Errors
    /// See [`SimulationSession::repeat_current`].
    pub fn repeat_current(&mut self) -> Result<(), SimError> {
        self.restart_with(SimulationSession::repeat_current)
    }

    /// Save on a background thread so ticking is never blocked by the store.
    ///
    /// The outcome is reported through the session's notifications and prompt.
    ///
    /// # Errors
    /// Returns [`SimError::NoFires`] if there is nothing to save.
    pub fn save_in_background(
        &self,
        store: Arc<dyn RunStore>,
        center: Option<LatLng>,
    ) -> Result<JoinHandle<()>, SimError> {
        let run = lock(&self.session).prepare_save(center)?;
        let shared = Arc::clone(&self.session);
        Ok(thread::spawn(move || {
            let result = store.save(&run);
            let _ = lock(&shared).record_save_result(result);
        }))
    }

    /// Run `op` with the timer halted, then resume the timer whenever the
    /// session is still active, whether or not `op` succeeded.
    fn restart_with<F>(&mut self, op: F) -> Result<(), SimError>
    where
        F: FnOnce(&mut SimulationSession) -> Result<(), SimError>,
    {
        self.halt_driver();
        let (result, active) = {
            let mut session = lock(&self.session);
            let result = op(&mut *session);
            (result, session.is_active())
        };
        if active {
            self.spawn_driver();
        }
        result
    }

    fn spawn_driver(&mut self) {
        let interval = lock(&self.session).config().tick_interval();
        let shared = Arc::clone(&self.session);
        self.driver = Some(TickDriver::spawn(interval, move || {
            match lock(&shared).tick() {
                Some(ClockEvent::Ticked { .. }) => TickControl::Continue,
                Some(ClockEvent::AutoStopped { .. }) | None => TickControl::Stop,
            }
        }));
    }

    fn halt_driver(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.cancel();
        }
    }
}
