//! Byte-stream transport to the controller
//!
//! The link is reached through two seams: a [`TransportFactory`] that opens a
//! port from [`ConnectionParams`], and the [`Transport`] it returns. The
//! production factory talks to a real serial port; tests use the scripted
//! mock.

pub mod connection;
pub mod mock;
pub mod serial;

use jogkit_core::ConnectionError;
use jogkit_settings::{ConnectionSettings, Parity};
use std::io;
use std::time::Duration;

/// Parameters used to open the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Port identifier (e.g., "COM3", "/dev/ttyUSB0")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Parity
    pub parity: Parity,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Hardware flow control
    pub flow_control: bool,
    /// Read timeout
    pub read_timeout: Duration,
    /// Write timeout
    pub write_timeout: Duration,
}

impl ConnectionParams {
    /// Parameters for `port` with the default line settings
    pub fn for_port(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self::from(&ConnectionSettings::default())
    }
}

impl From<&ConnectionSettings> for ConnectionParams {
    fn from(settings: &ConnectionSettings) -> Self {
        Self {
            port: settings.port.clone(),
            baud_rate: settings.baud_rate,
            data_bits: settings.data_bits,
            parity: settings.parity,
            stop_bits: settings.stop_bits,
            flow_control: settings.flow_control,
            read_timeout: Duration::from_millis(settings.read_timeout_ms),
            write_timeout: Duration::from_millis(settings.write_timeout_ms),
        }
    }
}

/// An open byte stream
pub trait Transport: Send {
    /// Write the whole buffer or fail
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Return whatever bytes are buffered right now, without waiting for more.
    /// An empty vector means nothing has arrived yet.
    fn read_available(&mut self) -> io::Result<Vec<u8>>;

    /// Release the underlying handle
    fn close(&mut self) -> io::Result<()>;
}

/// Opens transports
pub trait TransportFactory {
    /// Open the port described by `params`.
    ///
    /// Permission failures must be reported as
    /// [`ConnectionError::AccessDenied`] so the caller can offer a retry;
    /// everything else is [`ConnectionError::FailedToOpen`].
    fn open(&mut self, params: &ConnectionParams) -> Result<Box<dyn Transport>, ConnectionError>;
}
