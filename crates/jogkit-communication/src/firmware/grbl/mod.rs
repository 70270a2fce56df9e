//! GRBL commands, status classification and alarm decoding

pub mod commands;
pub mod error_decoder;
pub mod status_parser;

pub use commands::{Axis, ALARM_MARKER, IDLE_MARKER, SOFT_RESET, STATUS_QUERY};
pub use error_decoder::{alarms_in, decode_alarm, format_alarm};
pub use status_parser::{classify, MachinePosition, StatusParser};
