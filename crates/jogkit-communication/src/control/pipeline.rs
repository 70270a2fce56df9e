//! The single command pipeline
//!
//! A [`Pipeline`] owns the connection and the session for the whole run.
//! Input events pass the debounce gate, are looked up in the key table and,
//! when they map to a command, are dispatched and supervised to completion
//! before the next event is read.

use super::gate::DebounceGate;
use super::keymap::{action_for, Action};
use crate::communication::connection::Connection;
use crate::firmware::grbl::commands;
use crate::sync::dispatcher::{CommandDispatcher, DispatchResult};
use crate::sync::poller::StatusPoller;
use crate::sync::policy::RetryPolicy;
use crate::sync::session::Session;
use crate::sync::supervisor::IdleWaitSupervisor;
use async_trait::async_trait;
use jogkit_core::{Command, InputKey, TerminalStatus};
use jogkit_settings::{Config, MachineSettings};
use std::time::{Duration, Instant};

const KEY_HELP: &str = "Use the arrow keys to jog, 'S' for status, 'H' to home, 'X' to reset alarms, 'C' to move to center, 'Q' to quit.";

/// Delivers operator key presses
#[async_trait]
pub trait InputSource: Send {
    /// Wait for the next key. `None` means the source is exhausted.
    async fn next_key(&mut self) -> Option<InputKey>;

    /// Drop keys that were typed while a command was running
    fn discard_pending(&mut self) {}
}

/// Whether the pipeline keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Why [`Pipeline::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The operator asked to quit
    Quit,
    /// The input source ran out of events
    InputClosed,
}

pub struct Pipeline {
    connection: Connection,
    session: Session,
    gate: DebounceGate,
    dispatcher: CommandDispatcher,
    machine: MachineSettings,
}

impl Pipeline {
    pub fn new(
        connection: Connection,
        gate: DebounceGate,
        dispatcher: CommandDispatcher,
        machine: MachineSettings,
    ) -> Self {
        Self {
            connection,
            session: Session::new(),
            gate,
            dispatcher,
            machine,
        }
    }

    /// Build a pipeline with timing and machine settings taken from `config`
    pub fn from_config(connection: Connection, config: &Config) -> Self {
        let timing = &config.timing;
        let supervisor = IdleWaitSupervisor::new(
            StatusPoller::new(Duration::from_millis(timing.settle_ms)),
            RetryPolicy::idle_wait_from(timing),
        );
        let dispatcher = CommandDispatcher::new(RetryPolicy::write_from(timing), supervisor);
        let gate = DebounceGate::new(Duration::from_millis(timing.debounce_ms));

        Self::new(connection, gate, dispatcher, config.machine.clone())
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Bring the controller into a known state: soft reset, soft limits off,
    /// alarms cleared.
    pub async fn startup(&mut self) -> Vec<DispatchResult> {
        tracing::info!("Performing soft reset (Ctrl+X)...");
        let reset = self.dispatch(&commands::soft_reset()).await;
        tracing::info!("Soft reset {}", reset);

        let limits = self.dispatch(&commands::disable_soft_limits()).await;
        tracing::info!("Disable soft limits {}", limits);

        tracing::info!("Attempting to reset alarms...");
        let alarms = self.dispatch(&commands::reset_alarms()).await;
        match &alarms {
            DispatchResult::Sent {
                outcome: TerminalStatus::Ready,
                ..
            } => tracing::info!("Alarm reset successfully. System is now idle."),
            DispatchResult::Sent {
                outcome: TerminalStatus::Fault,
                ..
            } => tracing::warn!("Failed to reset alarms. System is still in an alarm state."),
            other => tracing::warn!("Unexpected result after attempting to reset alarms: {}", other),
        }

        vec![reset, limits, alarms]
    }

    /// Run `action` to completion. Returns `None` for actions without a command.
    pub async fn execute(&mut self, action: Action) -> Option<DispatchResult> {
        let command = action.command(&self.machine)?;
        let result = self.dispatch(&command).await;
        tracing::debug!("{} {}", action, result);
        Some(result)
    }

    /// Handle one key press observed at `now`. Quit is honoured even inside
    /// the debounce window.
    pub async fn handle_key(&mut self, key: InputKey, now: Instant) -> Flow {
        let action = action_for(key);
        if action == Some(Action::Quit) {
            tracing::info!("Exiting...");
            return Flow::Quit;
        }

        if !self.gate.admit(&mut self.session, now) {
            return Flow::Continue;
        }

        match action {
            Some(action) => {
                self.execute(action).await;
                Flow::Continue
            }
            None => {
                tracing::warn!("Invalid key {}. {}", key, KEY_HELP);
                Flow::Continue
            }
        }
    }

    /// Read keys from `input` until the operator quits or input ends
    pub async fn run(&mut self, input: &mut dyn InputSource) -> ExitReason {
        tracing::info!("{}", KEY_HELP);

        while let Some(key) = input.next_key().await {
            if self.handle_key(key, Instant::now()).await == Flow::Quit {
                return ExitReason::Quit;
            }
            input.discard_pending();
        }

        tracing::info!("Input closed");
        ExitReason::InputClosed
    }

    /// Close the connection. Dropping the pipeline does the same.
    pub fn close(&mut self) {
        self.connection.close();
    }

    async fn dispatch(&mut self, command: &Command) -> DispatchResult {
        self.dispatcher
            .dispatch(&mut self.connection, &mut self.session, command)
            .await
    }
}
