//! Error types for simulation operations.
//!
//! No error here is fatal: every variant describes an operation that was
//! refused and left the simulation untouched.

use crate::simulation::persistence::PersistenceError;
use std::fmt;

/// Errors returned by simulation operations
#[derive(Debug)]
pub enum SimError {
    /// The live fire set is at its placement ceiling
    Capacity {
        /// Ceiling that was hit
        limit: usize,
    },
    /// A run was started without any fires placed
    NoFires,
    /// A historical run could not be replayed
    MalformedReplay(String),
    /// A parameter was outside its accepted range
    InvalidParameter(String),
    /// Saving or loading a run failed
    Persistence(PersistenceError),
}

impl SimError {
    pub(crate) fn invalid_parameter(name: &str, value: f64, range: &str) -> Self {
        SimError::InvalidParameter(format!("{name} must be within {range}, got {value}"))
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Capacity { limit } => write!(f, "Fire limit reached ({limit} fires)"),
            SimError::NoFires => write!(f, "Add at least one fire before starting the simulation"),
            SimError::MalformedReplay(msg) => write!(f, "Could not load this simulation: {msg}"),
            SimError::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            SimError::Persistence(err) => write!(f, "Could not save the simulation: {err}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersistenceError> for SimError {
    fn from(err: PersistenceError) -> Self {
        SimError::Persistence(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            SimError::Capacity { limit: 100 }.to_string(),
            "Fire limit reached (100 fires)"
        );
        let err = SimError::invalid_parameter("humidity", 120.0, "[0, 100]");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: humidity must be within [0, 100], got 120"
        );
    }

    #[test]
    fn test_persistence_source() {
        use std::error::Error;
        let err: SimError = PersistenceError::SaveFailed("offline".to_string()).into();
        assert!(err.source().is_some());
        assert!(SimError::NoFires.source().is_none());
    }
}
