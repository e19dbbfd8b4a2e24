//! Core types and utilities

pub mod fire;
pub mod geo;
pub mod units;
pub mod weather;

pub use fire::{FireEntity, FireId};
pub use geo::{LatLng, Vec2};
pub use units::*;
pub use weather::{parameter_ranges, SimulationParameters};
