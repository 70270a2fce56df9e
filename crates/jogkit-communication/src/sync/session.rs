//! Pipeline session state
//!
//! One `Session` lives for the whole run and is threaded through the gate,
//! the dispatcher and the supervisor by `&mut`. Only this crate may change it.

use std::time::Instant;

#[derive(Debug, Default)]
pub struct Session {
    busy: bool,
    last_accepted: Option<Instant>,
    fault_latched: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A command is in flight
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// When the gate last admitted an input event
    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }

    /// The device reported a fault and no recovery command has been sent since
    pub fn fault_latched(&self) -> bool {
        self.fault_latched
    }

    pub(crate) fn mark_busy(&mut self) {
        self.busy = true;
    }

    pub(crate) fn clear_busy(&mut self) {
        self.busy = false;
    }

    pub(crate) fn record_accept(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }

    pub(crate) fn latch_fault(&mut self) {
        if !self.fault_latched {
            tracing::debug!("Fault latched");
        }
        self.fault_latched = true;
    }

    pub(crate) fn clear_fault(&mut self) {
        if self.fault_latched {
            tracing::debug!("Fault latch cleared");
        }
        self.fault_latched = false;
    }
}
