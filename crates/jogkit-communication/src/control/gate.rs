//! Input debouncing
//!
//! An input event is admitted only when no command is in flight and the
//! debounce interval has passed since the last admitted event.

use crate::sync::session::Session;
use std::time::{Duration, Instant};

/// Default minimum spacing between admitted events
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy)]
pub struct DebounceGate {
    interval: Duration,
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl DebounceGate {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Admit or reject an event observed at `now`, recording it when admitted
    pub fn admit(&self, session: &mut Session, now: Instant) -> bool {
        if session.is_busy() {
            tracing::debug!("Input ignored, a command is still in progress");
            return false;
        }

        if let Some(last) = session.last_accepted() {
            if now.saturating_duration_since(last) < self.interval {
                tracing::debug!("Input ignored, debounce interval not elapsed");
                return false;
            }
        }

        session.record_accept(now);
        true
    }
}
