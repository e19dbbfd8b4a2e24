//! Fire Spread Simulation Core Library
//!
//! A tick-based wildfire spread model over latitude/longitude coordinates.
//! Seed fires placed by the user branch along the wind each tick, nearby
//! fronts merge, and stalled fronts burn out. Weather inputs drive a 0-100
//! fire risk score that sets how far fronts travel.
//!
//! ## Layout
//!
//! - [`core_types`]: coordinates, unit newtypes, fire entities, run parameters
//! - [`physics`]: risk score and spread rate
//! - [`simulation`]: merge and spread passes, the run clock, sessions,
//!   derived metrics, saved runs and replay
//!
//! ## Example
//!
//! ```
//! use fire_spread_core::{LatLng, SimulationConfig, SimulationSession};
//!
//! let config = SimulationConfig { seed: Some(1), auto_stop_duration: 3, ..Default::default() };
//! let mut session = SimulationSession::new(config).unwrap();
//! session.add_fire(LatLng::new(-17.8, -61.5)).unwrap();
//! session.start().unwrap();
//! while session.tick().is_some() {}
//! assert!(session.clock().is_auto_stop());
//! ```

pub mod config;
pub mod core_types;
pub mod error;
pub mod physics;
pub mod simulation;

pub use config::SimulationConfig;
pub use core_types::{Degrees, FireEntity, FireId, LatLng, SimulationParameters};
pub use error::SimError;
pub use physics::{compute_risk, spread_distance, spread_rate};
pub use simulation::{
    ClockEvent, ClockState, DerivedMetrics, FireSimulation, HistoricalRun, InMemoryRunStore,
    JsonFileRunStore, LiveSession, MitigationStrategy, Notification, NotificationLevel,
    PersistenceError, RunId, RunStore, SavedRun, SessionPrompt, SimulationSession,
    SimulationSnapshot,
};
