//! User-facing notifications and prompts.
//!
//! The core never renders anything. It queues short messages with a severity
//! level and raises at most one prompt at a time; the presentation layer
//! drains them with [`NotificationQueue::take_pending`] and
//! [`SimulationSession::take_prompt`](crate::simulation::session::SimulationSession::take_prompt).

use std::collections::VecDeque;
use std::fmt;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Decision the user is asked to make once a run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPrompt {
    /// Offer to save the run. `completed` is set when it reached its duration.
    Save { completed: bool },
    /// A replayed run ended: repeat it again or leave.
    RepeatOrExit,
}

impl SessionPrompt {
    pub fn title(&self) -> &'static str {
        match self {
            SessionPrompt::Save { completed: true } => "Simulation complete",
            SessionPrompt::Save { completed: false } => "Simulation stopped",
            SessionPrompt::RepeatOrExit => "Replay finished",
        }
    }
}

/// Pending notifications plus a bounded history of delivered ones.
#[derive(Debug)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
    history: VecDeque<Notification>,
    max_history: usize,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(100)
    }
}

impl NotificationQueue {
    pub fn new(max_history: usize) -> Self {
        Self {
            pending: Vec::new(),
            history: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    pub fn push(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.pending.push(Notification {
            level,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message);
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    /// Drain everything queued since the last call and move it to history.
    pub fn take_pending(&mut self) -> Vec<Notification> {
        let taken = std::mem::take(&mut self.pending);
        for notification in &taken {
            self.history.push_back(notification.clone());
            if self.history.len() > self.max_history {
                self.history.pop_front();
            }
        }
        taken
    }

    /// Delivered notifications, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Notification> {
        self.history.iter()
    }
}
