//! Error handling for JogKit
//!
//! Provides error types for the layers of the synchronization engine:
//! - Connection errors (opening and writing the byte stream)
//! - Dispatch failures (commands that were dropped)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::data::MachineStatus;
use thiserror::Error;

/// Connection error type
///
/// Represents errors related to the serial link to the controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The operating system refused access to the port (usually held by
    /// another program or missing permissions)
    #[error("Access to {port} is denied: {reason}")]
    AccessDenied {
        /// The name of the port.
        port: String,
        /// The reason reported by the operating system.
        reason: String,
    },

    /// The operator chose not to retry after access was denied
    #[error("Retry declined for {port}")]
    RetryDeclined {
        /// The name of the port.
        port: String,
    },

    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// The connection has already been closed
    #[error("Connection to {port} is not open")]
    NotOpen {
        /// The name of the port.
        port: String,
    },

    /// Writing to the port failed
    #[error("Write to {port} failed: {reason}")]
    WriteFailed {
        /// The name of the port.
        port: String,
        /// The reason for the failure.
        reason: String,
    },

    /// Invalid connection parameters
    #[error("Invalid connection parameters: {reason}")]
    InvalidParameters {
        /// The reason the parameters are invalid.
        reason: String,
    },
}

impl ConnectionError {
    /// Check if the operator may retry this error interactively
    pub fn is_access_denied(&self) -> bool {
        matches!(self, ConnectionError::AccessDenied { .. })
    }
}

/// Why a command was dropped by the dispatcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchFailure {
    /// The connection was closed before the command was dispatched
    #[error("Connection is not open")]
    NotConnected,

    /// Every write attempt failed
    #[error("Write failed after {attempts} attempts")]
    WriteExhausted {
        /// Number of write attempts made.
        attempts: u32,
    },

    /// The machine is in an alarm state and needs a reset first
    #[error("Machine is in an alarm state, reset required")]
    DeviceFaulted,

    /// The machine did not report idle before a motion command
    #[error("Machine is busy ({status}), command not sent")]
    DeviceBusy {
        /// The status observed by the pre-flight poll.
        status: MachineStatus,
    },
}

/// Main error type for JogKit
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::AccessDenied {
            port: "COM3".to_string(),
            reason: "Access is denied.".to_string(),
        };
        assert_eq!(err.to_string(), "Access to COM3 is denied: Access is denied.");
        assert!(err.is_access_denied());

        let err = ConnectionError::RetryDeclined {
            port: "COM3".to_string(),
        };
        assert!(!err.is_access_denied());
    }

    #[test]
    fn test_dispatch_failure_display() {
        let err = DispatchFailure::WriteExhausted { attempts: 3 };
        assert_eq!(err.to_string(), "Write failed after 3 attempts");

        let err = DispatchFailure::DeviceBusy {
            status: MachineStatus::Empty,
        };
        assert_eq!(err.to_string(), "Machine is busy (Empty), command not sent");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ConnectionError::NotOpen {
            port: "/dev/ttyUSB0".to_string(),
        }
        .into();
        assert!(err.is_connection_error());

        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(!err.is_connection_error());
    }
}
