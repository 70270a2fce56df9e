//! Command dispatch
//!
//! The dispatcher is the only place that sets the session busy. It writes a
//! command with a bounded number of attempts and hands the session to the
//! idle-wait supervisor once the write succeeds.

use super::policy::RetryPolicy;
use super::session::Session;
use super::supervisor::IdleWaitSupervisor;
use crate::communication::connection::Connection;
use jogkit_core::{Command, CommandClass, DispatchFailure, MachineStatus, TerminalStatus};

/// What happened to a dispatched command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// Written after `attempts` tries; `outcome` is what the machine settled into
    Sent {
        attempts: u32,
        outcome: TerminalStatus,
    },
    /// Dropped without reaching the machine
    Failed(DispatchFailure),
}

impl DispatchResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchResult::Sent { .. })
    }

    /// `Sent` and the machine ended up idle
    pub fn is_ready(&self) -> bool {
        matches!(
            self,
            DispatchResult::Sent {
                outcome: TerminalStatus::Ready,
                ..
            }
        )
    }
}

impl std::fmt::Display for DispatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchResult::Sent { attempts: 1, outcome } => write!(f, "sent, machine {}", outcome),
            DispatchResult::Sent { attempts, outcome } => {
                write!(f, "sent after {} attempts, machine {}", attempts, outcome)
            }
            DispatchResult::Failed(failure) => write!(f, "failed: {}", failure),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommandDispatcher {
    write_policy: RetryPolicy,
    supervisor: IdleWaitSupervisor,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(RetryPolicy::write(), IdleWaitSupervisor::default())
    }
}

impl CommandDispatcher {
    pub fn new(write_policy: RetryPolicy, supervisor: IdleWaitSupervisor) -> Self {
        Self {
            write_policy,
            supervisor,
        }
    }

    pub fn write_policy(&self) -> RetryPolicy {
        self.write_policy
    }

    pub fn supervisor(&self) -> &IdleWaitSupervisor {
        &self.supervisor
    }

    /// Send `command` and wait for the machine to settle.
    ///
    /// Busy is set for the duration and is always clear again on return.
    /// Motion commands are only written when no fault is latched and a fresh
    /// poll reports the machine idle. If that poll's `?` cannot be written the
    /// command goes straight to the write attempts.
    pub async fn dispatch(
        &self,
        connection: &mut Connection,
        session: &mut Session,
        command: &Command,
    ) -> DispatchResult {
        if !connection.is_open() {
            tracing::error!(
                "Cannot send '{}': {} is not open",
                command.description(),
                connection.port()
            );
            return DispatchResult::Failed(DispatchFailure::NotConnected);
        }

        session.mark_busy();

        if command.class() == CommandClass::Motion {
            if let Err(failure) = self.preflight(connection, session, command).await {
                tracing::warn!("Not sending '{}': {}", command.description(), failure);
                session.clear_busy();
                return DispatchResult::Failed(failure);
            }
        }

        tracing::info!("{}...", command.description());
        tracing::debug!("Sending command: {}", command.payload());

        let bytes = command.to_bytes();
        let max_attempts = self.write_policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match connection.write(&bytes) {
                Ok(()) => {
                    if command.class() == CommandClass::Recovery {
                        session.clear_fault();
                    }
                    let outcome = self.supervisor.await_ready(connection, session).await;
                    return DispatchResult::Sent {
                        attempts: attempt,
                        outcome,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        "Attempt {}/{} to send '{}' failed: {}",
                        attempt,
                        max_attempts,
                        command.payload(),
                        e
                    );
                    if attempt < max_attempts {
                        tokio::time::sleep(self.write_policy.interval).await;
                    }
                }
            }
        }

        tracing::error!(
            "Failed to send '{}' after {} attempts",
            command.payload(),
            max_attempts
        );
        session.clear_busy();
        DispatchResult::Failed(DispatchFailure::WriteExhausted {
            attempts: max_attempts,
        })
    }

    async fn preflight(
        &self,
        connection: &mut Connection,
        session: &mut Session,
        command: &Command,
    ) -> Result<(), DispatchFailure> {
        if session.fault_latched() {
            return Err(DispatchFailure::DeviceFaulted);
        }

        match self.supervisor.poller().query(connection).await {
            Ok(MachineStatus::Ready) => Ok(()),
            Ok(MachineStatus::Fault) => {
                session.latch_fault();
                Err(DispatchFailure::DeviceFaulted)
            }
            Ok(status) => Err(DispatchFailure::DeviceBusy { status }),
            Err(e) => {
                tracing::warn!("Status check before '{}' failed: {}", command.payload(), e);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::{mock::MockLink, ConnectionParams};
    use crate::firmware::grbl::commands;
    use crate::sync::poller::StatusPoller;
    use std::time::Duration;

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new(
            RetryPolicy::new(Duration::from_millis(20), 3),
            IdleWaitSupervisor::new(
                StatusPoller::new(Duration::from_millis(1)),
                RetryPolicy::new(Duration::from_millis(5), 4),
            ),
        )
    }

    fn connection(link: &MockLink) -> Connection {
        Connection::new(&ConnectionParams::for_port("COM3"), link.transport())
    }

    #[tokio::test(start_paused = true)]
    async fn test_sent_and_ready() {
        let link = MockLink::new();
        link.set_fallback("<Idle|MPos:0,0,0>");
        let mut conn = connection(&link);
        let mut session = Session::new();

        let result = dispatcher()
            .dispatch(&mut conn, &mut session, &commands::home())
            .await;

        assert_eq!(
            result,
            DispatchResult::Sent {
                attempts: 1,
                outcome: TerminalStatus::Ready
            }
        );
        assert_eq!(link.commands(), vec!["$H\n".to_string()]);
        assert!(!session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovery_clears_fault_latch() {
        let link = MockLink::new();
        link.set_fallback("<Idle|MPos:0,0,0>");
        let mut conn = connection(&link);
        let mut session = Session::new();
        session.latch_fault();

        let result = dispatcher()
            .dispatch(&mut conn, &mut session, &commands::reset_alarms())
            .await;

        assert!(result.is_ready());
        assert!(!session.fault_latched());
    }

    #[tokio::test(start_paused = true)]
    async fn test_maintenance_does_not_clear_fault_latch() {
        let link = MockLink::new();
        link.set_fallback("<Idle|MPos:0,0,0>");
        let mut conn = connection(&link);
        let mut session = Session::new();
        session.latch_fault();

        let result = dispatcher()
            .dispatch(&mut conn, &mut session, &commands::disable_soft_limits())
            .await;

        assert_eq!(
            result,
            DispatchResult::Sent {
                attempts: 1,
                outcome: TerminalStatus::Fault
            }
        );
        assert!(session.fault_latched());
    }

    #[tokio::test(start_paused = true)]
    async fn test_motion_refused_while_latched() {
        let link = MockLink::new();
        link.set_fallback("<Idle|MPos:0,0,0>");
        let mut conn = connection(&link);
        let mut session = Session::new();
        session.latch_fault();

        let result = dispatcher()
            .dispatch(&mut conn, &mut session, &commands::move_to(395, 130, 20000))
            .await;

        assert_eq!(result, DispatchResult::Failed(DispatchFailure::DeviceFaulted));
        assert_eq!(link.write_attempts(), 0);
        assert!(!session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_status_check_still_sends_motion() {
        let link = MockLink::new();
        link.fail_next_writes(1).set_fallback("<Idle|MPos:0,0,0>");
        let mut conn = connection(&link);
        let mut session = Session::new();

        let result = dispatcher()
            .dispatch(&mut conn, &mut session, &commands::move_to(395, 130, 20000))
            .await;

        assert!(result.is_ready());
        assert_eq!(
            link.commands(),
            vec!["$J=G90 G21 X395 Y130 F20000\n".to_string()]
        );
    }

    #[test]
    fn test_display() {
        let sent = DispatchResult::Sent {
            attempts: 2,
            outcome: TerminalStatus::TimedOut,
        };
        assert!(sent.to_string().contains("2 attempts"));
        let failed = DispatchResult::Failed(DispatchFailure::NotConnected);
        assert!(failed.to_string().starts_with("failed"));
    }
}
