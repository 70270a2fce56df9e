//! Configuration and settings management for JogKit
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats.
//!
//! Configuration is organized into logical sections:
//! - Connection settings (port, line parameters, timeouts)
//! - Machine settings (jog and rapid speeds, work area)
//! - Timing settings (debounce, idle polling, write retries)
//! - Logging settings (level, optional log file)

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Serial parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

impl std::fmt::Display for Parity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Even => write!(f, "even"),
            Self::Odd => write!(f, "odd"),
        }
    }
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
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
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Write timeout in milliseconds
    pub write_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: "COM3".to_string(),
            baud_rate: 115200,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
            flow_control: false,
            read_timeout_ms: 500,
            write_timeout_ms: 500,
        }
    }
}

/// Machine preference settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Feed rate for relative jogs (units/min)
    pub jog_speed: u32,
    /// Feed rate for the move-to-center jog (units/min)
    pub rapid_speed: u32,
    /// Distance of one relative jog
    pub jog_step: u32,
    /// Work area size along X
    pub work_area_x: u32,
    /// Work area size along Y
    pub work_area_y: u32,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            jog_speed: 10000,
            rapid_speed: 20000,
            jog_step: 10,
            work_area_x: 790,
            work_area_y: 260,
        }
    }
}

impl MachineSettings {
    /// Center of the work area, using integer halves of each dimension
    pub fn work_area_center(&self) -> (u32, u32) {
        (self.work_area_x / 2, self.work_area_y / 2)
    }
}

/// Synchronization timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Minimum spacing between accepted key presses
    pub debounce_ms: u64,
    /// Interval between idle-wait status polls
    pub poll_interval_ms: u64,
    /// Maximum number of idle-wait polls
    pub max_polls: u32,
    /// Time the controller gets to answer a status query
    pub settle_ms: u64,
    /// Write attempts per command
    pub write_retries: u32,
    /// Pause between failed write attempts
    pub write_backoff_ms: u64,
    /// Pause before retrying a denied port
    pub connect_backoff_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 200,
            poll_interval_ms: 500,
            max_polls: 20,
            settle_ms: 100,
            write_retries: 3,
            write_backoff_ms: 500,
            connect_backoff_ms: 1000,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level directive (overridden by RUST_LOG)
    pub level: String,
    /// Append log output to this file as well as the console
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionSettings,
    /// Machine preferences
    pub machine: MachineSettings,
    /// Synchronization timing
    pub timing: TimingSettings,
    /// Logging
    pub logging: LoggingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config location (`<config dir>/jogkit/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("jogkit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let c = &self.connection;
        if c.port.trim().is_empty() {
            return Err(ConfigError::MissingKey("connection.port".to_string()));
        }
        if c.baud_rate == 0 {
            return Err(out_of_range("connection.baud_rate", c.baud_rate));
        }
        if !(5..=8).contains(&c.data_bits) {
            return Err(out_of_range("connection.data_bits", c.data_bits));
        }
        if !(1..=2).contains(&c.stop_bits) {
            return Err(out_of_range("connection.stop_bits", c.stop_bits));
        }
        if c.read_timeout_ms == 0 {
            return Err(out_of_range("connection.read_timeout_ms", c.read_timeout_ms));
        }
        if c.write_timeout_ms == 0 {
            return Err(out_of_range("connection.write_timeout_ms", c.write_timeout_ms));
        }

        let m = &self.machine;
        if m.jog_speed == 0 {
            return Err(out_of_range("machine.jog_speed", m.jog_speed));
        }
        if m.rapid_speed == 0 {
            return Err(out_of_range("machine.rapid_speed", m.rapid_speed));
        }
        if m.jog_step == 0 {
            return Err(out_of_range("machine.jog_step", m.jog_step));
        }
        if m.work_area_x == 0 || m.work_area_y == 0 {
            return Err(out_of_range(
                "machine.work_area",
                format!("{}x{}", m.work_area_x, m.work_area_y),
            ));
        }

        let t = &self.timing;
        if t.max_polls == 0 {
            return Err(out_of_range("timing.max_polls", t.max_polls));
        }
        if t.write_retries == 0 {
            return Err(out_of_range("timing.write_retries", t.write_retries));
        }

        Ok(())
    }

    /// Replace the configured port with one given on the command line
    pub fn apply_port_override(&mut self, port: &str) {
        if port.trim().is_empty() {
            return;
        }
        let normalized = normalize_port_name(port);
        if normalized != self.connection.port {
            tracing::info!(
                "Changing port from {} to {}",
                self.connection.port,
                normalized
            );
            self.connection.port = normalized;
        }
    }
}

/// Normalize a user-supplied port name
///
/// A bare number `n` becomes `COMn`, a `com` prefix is upper-cased, and
/// anything else (device paths) is kept verbatim.
pub fn normalize_port_name(port: &str) -> String {
    let port = port.trim();
    if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) {
        return format!("COM{}", port);
    }
    if port.get(..3).is_some_and(|prefix| prefix.eq_ignore_ascii_case("com")) {
        return port.to_ascii_uppercase();
    }
    port.to_string()
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}
