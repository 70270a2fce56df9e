//! Idle-wait supervision
//!
//! After a command is written the supervisor polls until the machine reports
//! idle or alarm, or the poll budget runs out. Whatever the outcome, the busy
//! flag is cleared before returning.

use super::poller::StatusPoller;
use super::policy::RetryPolicy;
use super::session::Session;
use crate::communication::connection::Connection;
use jogkit_core::{MachineStatus, TerminalStatus};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
pub struct IdleWaitSupervisor {
    poller: StatusPoller,
    policy: RetryPolicy,
}

impl IdleWaitSupervisor {
    pub fn new(poller: StatusPoller, policy: RetryPolicy) -> Self {
        Self { poller, policy }
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Poll until the machine is idle or in alarm.
    ///
    /// Polls start every `policy.interval`, measured from the first one, so the
    /// whole wait stays within [`RetryPolicy::worst_case`] as long as the
    /// poller's settle time is shorter than the interval. While the session's
    /// fault latch is set an idle report is still treated as a fault.
    pub async fn await_ready(
        &self,
        connection: &mut Connection,
        session: &mut Session,
    ) -> TerminalStatus {
        let max_attempts = self.policy.max_attempts;
        let start = Instant::now();

        for attempt in 1..=max_attempts {
            match self.poller.poll(connection).await {
                MachineStatus::Ready if session.fault_latched() => {
                    tracing::warn!(
                        "Machine reports idle but the alarm has not been cleared. Reset alarms or home first."
                    );
                    session.clear_busy();
                    return TerminalStatus::Fault;
                }
                MachineStatus::Ready => {
                    tracing::info!("Machine is idle");
                    session.clear_busy();
                    return TerminalStatus::Ready;
                }
                MachineStatus::Fault => {
                    tracing::error!("Machine is in alarm state. Reset alarms or home the machine.");
                    session.latch_fault();
                    session.clear_busy();
                    return TerminalStatus::Fault;
                }
                status => {
                    tracing::info!(
                        "Waiting for idle status ({}/{}), last status {}",
                        attempt,
                        max_attempts,
                        status
                    );
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep_until(start + self.policy.interval * attempt).await;
            }
        }

        tracing::warn!(
            "Timed out after {} polls waiting for the machine to become idle",
            max_attempts
        );
        session.clear_busy();
        TerminalStatus::TimedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::{mock::MockLink, ConnectionParams};
    use std::time::Duration;

    fn setup(link: &MockLink) -> (Connection, Session, IdleWaitSupervisor) {
        let conn = Connection::new(&ConnectionParams::for_port("COM3"), link.transport());
        let mut session = Session::new();
        session.mark_busy();
        let supervisor = IdleWaitSupervisor::new(
            StatusPoller::new(Duration::from_millis(10)),
            RetryPolicy::new(Duration::from_millis(50), 5),
        );
        (conn, session, supervisor)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_after_waiting() {
        let link = MockLink::new();
        link.push_response("<Home|MPos:0,0,0>").push_empty();
        link.set_fallback("<Idle|MPos:0,0,0>");
        let (mut conn, mut session, supervisor) = setup(&link);

        assert_eq!(
            supervisor.await_ready(&mut conn, &mut session).await,
            TerminalStatus::Ready
        );
        assert_eq!(link.status_queries(), 3);
        assert!(!session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_latches() {
        let link = MockLink::new();
        link.set_fallback("<Alarm|MPos:0,0,0>");
        let (mut conn, mut session, supervisor) = setup(&link);

        assert_eq!(
            supervisor.await_ready(&mut conn, &mut session).await,
            TerminalStatus::Fault
        );
        assert!(session.fault_latched());
        assert!(!session.is_busy());
        assert_eq!(link.status_queries(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latched_fault_masks_idle() {
        let link = MockLink::new();
        link.set_fallback("<Idle|MPos:0,0,0>");
        let (mut conn, mut session, supervisor) = setup(&link);
        session.latch_fault();

        assert_eq!(
            supervisor.await_ready(&mut conn, &mut session).await,
            TerminalStatus::Fault
        );
        assert!(!session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sleep_after_last_poll() {
        let link = MockLink::new();
        let (mut conn, mut session, supervisor) = setup(&link);

        let start = Instant::now();
        assert_eq!(
            supervisor.await_ready(&mut conn, &mut session).await,
            TerminalStatus::TimedOut
        );
        // four full intervals plus the settle time of the fifth poll
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(4 * 50 + 10));
        assert!(elapsed < Duration::from_millis(5 * 50));
        assert_eq!(link.status_queries(), 5);
        assert!(!session.is_busy());
    }
}
