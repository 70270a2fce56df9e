//! Serial port communication implementation
//!
//! Provides low-level serial port operations for direct hardware connection
//! to GRBL controllers via USB or RS-232.
//!
//! Supports:
//! - Port enumeration and discovery
//! - Baud rate, data bits, parity, stop bits and flow control
//! - Separate read and write timeouts
//! - Non-blocking "read what is buffered" reads

use super::{ConnectionParams, Transport, TransportFactory};
use jogkit_core::{ConnectionError, Error, Result};
use jogkit_settings::Parity;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Information about an available serial port
#[derive(Debug, Clone)]
pub struct SerialPortInfo {
    /// Port name (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Port description (e.g., "USB Serial Port")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
        }
    }

    /// Set manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }
}

/// List available serial ports on the system
///
/// Filters ports to include only controller patterns:
/// - Windows: COM* (e.g., COM1, COM3)
/// - Linux: /dev/ttyUSB*, /dev/ttyACM*
/// - macOS: /dev/cu.usbserial-*, /dev/cu.usbmodem*
pub fn list_ports() -> Result<Vec<SerialPortInfo>> {
    match serialport::available_ports() {
        Ok(ports) => Ok(ports
            .iter()
            .filter(|port| is_valid_controller_port(&port.port_name))
            .map(|port| {
                let info = SerialPortInfo::new(&port.port_name, get_port_description(port));
                match &port.port_type {
                    serialport::SerialPortType::UsbPort(usb_info) => match &usb_info.manufacturer {
                        Some(mfg) => info.with_manufacturer(mfg),
                        None => info,
                    },
                    _ => info,
                }
            })
            .collect()),
        Err(e) => {
            tracing::error!("Failed to enumerate serial ports: {}", e);
            Err(Error::other(format!("Failed to enumerate ports: {}", e)))
        }
    }
}

/// Check if a port name matches controller patterns
fn is_valid_controller_port(port_name: &str) -> bool {
    if let Some(number) = port_name.strip_prefix("COM") {
        return !number.is_empty() && number.chars().all(|c| c.is_ascii_digit());
    }

    port_name.starts_with("/dev/ttyUSB")
        || port_name.starts_with("/dev/ttyACM")
        || port_name.starts_with("/dev/cu.usbserial-")
        || port_name.starts_with("/dev/cu.usbmodem")
}

/// Get a user-friendly description for a port
fn get_port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Convert a parity setting to serialport format
fn to_serialport_parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Even => serialport::Parity::Even,
        Parity::Odd => serialport::Parity::Odd,
    }
}

fn to_serialport_data_bits(port: &str, data_bits: u8) -> std::result::Result<serialport::DataBits, ConnectionError> {
    match data_bits {
        5 => Ok(serialport::DataBits::Five),
        6 => Ok(serialport::DataBits::Six),
        7 => Ok(serialport::DataBits::Seven),
        8 => Ok(serialport::DataBits::Eight),
        _ => Err(ConnectionError::InvalidParameters {
            reason: format!("{}: invalid data bits {}", port, data_bits),
        }),
    }
}

fn to_serialport_stop_bits(port: &str, stop_bits: u8) -> std::result::Result<serialport::StopBits, ConnectionError> {
    match stop_bits {
        1 => Ok(serialport::StopBits::One),
        2 => Ok(serialport::StopBits::Two),
        _ => Err(ConnectionError::InvalidParameters {
            reason: format!("{}: invalid stop bits {}", port, stop_bits),
        }),
    }
}

/// Map an open failure onto the connection error taxonomy.
///
/// Unix reports `EACCES` as an I/O permission error; Windows reports a busy
/// COM port as "Access is denied.".
pub(crate) fn classify_open_error(port: &str, err: &serialport::Error) -> ConnectionError {
    let denied = matches!(
        err.kind,
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied)
    ) || err.description.to_ascii_lowercase().contains("denied");

    if denied {
        ConnectionError::AccessDenied {
            port: port.to_string(),
            reason: err.description.clone(),
        }
    } else {
        ConnectionError::FailedToOpen {
            port: port.to_string(),
            reason: err.description.clone(),
        }
    }
}

/// Serial transport backed by the serialport crate
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
    read_timeout: Duration,
    write_timeout: Duration,
    active_timeout: Duration,
}

impl SerialTransport {
    /// Open a serial port with the given parameters
    pub fn open(params: &ConnectionParams) -> std::result::Result<Self, ConnectionError> {
        let port = serialport::new(&params.port, params.baud_rate)
            .timeout(params.read_timeout)
            .data_bits(to_serialport_data_bits(&params.port, params.data_bits)?)
            .stop_bits(to_serialport_stop_bits(&params.port, params.stop_bits)?)
            .parity(to_serialport_parity(params.parity))
            .flow_control(if params.flow_control {
                serialport::FlowControl::Hardware
            } else {
                serialport::FlowControl::None
            })
            .open()
            .map_err(|e| classify_open_error(&params.port, &e))?;

        Ok(Self {
            port,
            read_timeout: params.read_timeout,
            write_timeout: params.write_timeout,
            active_timeout: params.read_timeout,
        })
    }

    fn use_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        if self.active_timeout != timeout {
            self.port.set_timeout(timeout)?;
            self.active_timeout = timeout;
        }
        Ok(())
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.use_timeout(self.write_timeout)?;
        self.port.write_all(data)?;
        self.port.flush()
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        self.use_timeout(self.read_timeout)?;
        let pending = self.port.bytes_to_read()? as usize;
        if pending == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u8; pending];
        let read = self.port.read(&mut buffer)?;
        buffer.truncate(read);
        Ok(buffer)
    }

    fn close(&mut self) -> io::Result<()> {
        // serialport releases the handle on drop; flush what is still queued
        self.port.flush()
    }
}

/// Factory that opens real serial ports
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialTransportFactory;

impl TransportFactory for SerialTransportFactory {
    fn open(
        &mut self,
        params: &ConnectionParams,
    ) -> std::result::Result<Box<dyn Transport>, ConnectionError> {
        let transport = SerialTransport::open(params)?;
        Ok(Box::new(transport))
    }
}
