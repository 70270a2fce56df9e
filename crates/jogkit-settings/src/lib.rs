//! JogKit Settings Crate
//!
//! Handles application configuration: the serial link, the machine's jog and
//! work-area parameters, synchronization timing, and logging.

pub mod config;
pub mod error;

pub use config::{
    normalize_port_name, Config, ConnectionSettings, LoggingSettings, MachineSettings, Parity,
    TimingSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
