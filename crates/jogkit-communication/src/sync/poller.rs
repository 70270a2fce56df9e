//! Status polling
//!
//! One poll writes the real-time `?`, lets the device answer for the settle
//! interval, then takes whatever bytes arrived. Failures are reported as
//! [`MachineStatus::Unknown`] and never retried here. [`StatusPoller::query`]
//! keeps a failed `?` write apart from an unreadable answer.

use crate::communication::connection::Connection;
use crate::firmware::grbl::{alarms_in, classify, StatusParser, STATUS_QUERY};
use jogkit_core::{ConnectionError, MachineStatus};
use std::io;
use std::time::Duration;

/// Default wait between writing `?` and reading the answer
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    settle: Duration,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE)
    }
}

impl StatusPoller {
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Query and classify the current machine status
    pub async fn poll(&self, connection: &mut Connection) -> MachineStatus {
        match self.query(connection).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Status query failed: {}", e);
                MachineStatus::Unknown
            }
        }
    }

    /// Like [`poll`](Self::poll), but a `?` that could not be written is an
    /// error rather than [`MachineStatus::Unknown`]
    pub async fn query(
        &self,
        connection: &mut Connection,
    ) -> Result<MachineStatus, ConnectionError> {
        connection.write(STATUS_QUERY)?;

        tokio::time::sleep(self.settle).await;

        let status = match connection.read_available() {
            Ok(bytes) if bytes.is_empty() => {
                tracing::debug!("No response received from controller");
                MachineStatus::Empty
            }
            Ok(bytes) => {
                let response = String::from_utf8_lossy(&bytes);
                let status = classify(&response);
                log_response(&response, status);
                status
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                tracing::warn!("Timed out reading status from {}", connection.port());
                MachineStatus::Unknown
            }
            Err(e) => {
                tracing::warn!("Error reading status from {}: {}", connection.port(), e);
                MachineStatus::Unknown
            }
        };
        Ok(status)
    }
}

fn log_response(response: &str, status: MachineStatus) {
    tracing::debug!("Status response: {}", response.trim());

    if let Some(state) = StatusParser::parse_machine_state(response) {
        match StatusParser::parse_mpos(response) {
            Some(mpos) => tracing::debug!("State {} at {} -> {}", state, mpos, status),
            None => tracing::debug!("State {} -> {}", state, status),
        }
    }

    for alarm in alarms_in(response) {
        tracing::warn!("{}", alarm);
    }
}
