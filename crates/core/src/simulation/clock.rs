//! Run clock: elapsed ticks, auto-stop and the run state machine.
//!
//! ```text
//! Idle ──start──▶ Active ──stop──────▶ Stopped
//!                   │                     │
//!                   └──auto-stop──▶ AutoStopped
//!                                         │
//! any ──reset──▶ Idle ◀───────────────────┘ (start re-enters Active)
//! ```
//!
//! The clock only counts. Wall-clock pacing belongs to
//! [`TickDriver`](crate::simulation::driver::TickDriver).

use serde::{Deserialize, Serialize};

/// Where a run currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockState {
    /// No run yet, or the previous one was cleared
    Idle,
    /// Ticking
    Active,
    /// Stopped by the user
    Stopped,
    /// Stopped by reaching the auto-stop duration
    AutoStopped,
}

/// Result of advancing the clock by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// The run continues
    Ticked { elapsed: u64 },
    /// The run reached its duration and stopped itself
    AutoStopped { elapsed: u64 },
}

#[derive(Debug, Clone)]
pub struct SimulationClock {
    state: ClockState,
    elapsed: u64,
    auto_stop_duration: u64,
    default_duration: u64,
    is_auto_stop: bool,
}

impl SimulationClock {
    pub fn new(default_duration: u64) -> Self {
        let default_duration = default_duration.max(1);
        SimulationClock {
            state: ClockState::Idle,
            elapsed: 0,
            auto_stop_duration: default_duration,
            default_duration,
            is_auto_stop: false,
        }
    }

    /// Begin a fresh run with the default duration.
    pub fn start(&mut self) {
        self.start_with_duration(self.default_duration);
    }

    /// Begin a fresh run that stops itself after `duration` ticks.
    pub fn start_with_duration(&mut self, duration: u64) {
        self.state = ClockState::Active;
        self.elapsed = 0;
        self.is_auto_stop = false;
        self.auto_stop_duration = duration.max(1);
    }

    /// Stop an active run. Returns `false` if nothing was running.
    pub fn stop(&mut self) -> bool {
        if self.state != ClockState::Active {
            return false;
        }
        self.state = ClockState::Stopped;
        true
    }

    /// Back to `Idle` with elapsed time and duration reset.
    pub fn reset(&mut self) {
        self.state = ClockState::Idle;
        self.elapsed = 0;
        self.is_auto_stop = false;
        self.auto_stop_duration = self.default_duration;
    }

    /// Count one tick. Returns `None` when the clock is not running.
    pub fn advance(&mut self) -> Option<ClockEvent> {
        if self.state != ClockState::Active {
            return None;
        }
        self.elapsed += 1;
        if self.elapsed >= self.auto_stop_duration {
            self.elapsed = self.auto_stop_duration;
            self.state = ClockState::AutoStopped;
            self.is_auto_stop = true;
            return Some(ClockEvent::AutoStopped {
                elapsed: self.elapsed,
            });
        }
        Some(ClockEvent::Ticked {
            elapsed: self.elapsed,
        })
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ClockState::Active
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn auto_stop_duration(&self) -> u64 {
        self.auto_stop_duration
    }

    pub fn is_auto_stop(&self) -> bool {
        self.is_auto_stop
    }

    /// The run ended by reaching its duration rather than by a user stop.
    pub fn completed(&self) -> bool {
        self.elapsed >= self.auto_stop_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_stop_after_duration() {
        let mut clock = SimulationClock::new(3);
        clock.start();
        assert_eq!(clock.advance(), Some(ClockEvent::Ticked { elapsed: 1 }));
        assert_eq!(clock.advance(), Some(ClockEvent::Ticked { elapsed: 2 }));
        assert_eq!(clock.advance(), Some(ClockEvent::AutoStopped { elapsed: 3 }));
        assert_eq!(clock.state(), ClockState::AutoStopped);
        assert!(clock.is_auto_stop());
        assert!(clock.completed());
        assert_eq!(clock.advance(), None);
        assert_eq!(clock.elapsed(), 3);
    }

    #[test]
    fn test_stop_only_from_active() {
        let mut clock = SimulationClock::new(20);
        assert!(!clock.stop());
        clock.start();
        assert_eq!(clock.advance(), Some(ClockEvent::Ticked { elapsed: 1 }));
        assert!(clock.stop());
        assert_eq!(clock.state(), ClockState::Stopped);
        assert!(!clock.is_auto_stop());
        assert!(!clock.completed());
        assert_eq!(clock.advance(), None);
    }

    #[test]
    fn test_start_resets_elapsed_and_duration() {
        let mut clock = SimulationClock::new(20);
        clock.start_with_duration(5);
        for _ in 0..5 {
            let _ = clock.advance();
        }
        assert!(clock.is_auto_stop());

        clock.start();
        assert_eq!(clock.elapsed(), 0);
        assert_eq!(clock.auto_stop_duration(), 20);
        assert!(!clock.is_auto_stop());
        assert!(clock.is_active());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut clock = SimulationClock::new(20);
        clock.start_with_duration(7);
        let _ = clock.advance();
        clock.reset();
        assert_eq!(clock.state(), ClockState::Idle);
        assert_eq!(clock.elapsed(), 0);
        assert_eq!(clock.auto_stop_duration(), 20);
    }
}
