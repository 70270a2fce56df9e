//! GRBL Status Report Parsing
//!
//! Classification is a plain marker search over the raw response. The field
//! extraction below is only used to make the poll log readable.

use super::commands::{ALARM_MARKER, IDLE_MARKER};
use jogkit_core::MachineStatus;

/// Classify a non-empty status response.
///
/// `Idle` wins over `Alarm` when both appear.
pub fn classify(response: &str) -> MachineStatus {
    if response.contains(IDLE_MARKER) {
        MachineStatus::Ready
    } else if response.contains(ALARM_MARKER) {
        MachineStatus::Fault
    } else {
        MachineStatus::Unknown
    }
}

/// Parsed machine position components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachinePosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl MachinePosition {
    /// Parse machine position from string
    pub fn parse(pos_str: &str) -> Option<Self> {
        let coords: Vec<f64> = pos_str
            .split(',')
            .filter_map(|s| s.trim().parse::<f64>().ok())
            .collect();

        if coords.len() < 3 {
            return None;
        }

        Some(Self {
            x: coords[0],
            y: coords[1],
            z: coords[2],
        })
    }
}

impl std::fmt::Display for MachinePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "X{:.3} Y{:.3} Z{:.3}", self.x, self.y, self.z)
    }
}

pub struct StatusParser;

impl StatusParser {
    /// Parse machine state from status report
    /// Extracts state from format: <Idle|...> or <Run|...>
    pub fn parse_machine_state(status_line: &str) -> Option<&str> {
        let start = status_line.find('<')?;
        let rest = &status_line[start + 1..];
        let end = rest.find(['|', '>'])?;
        Some(&rest[..end])
    }

    /// Parse machine position from status report
    pub fn parse_mpos(status_line: &str) -> Option<MachinePosition> {
        Self::extract_field(status_line, "MPos:").and_then(MachinePosition::parse)
    }

    /// Extract field value from status report
    fn extract_field<'a>(status_line: &'a str, field_prefix: &str) -> Option<&'a str> {
        let start = status_line.find(field_prefix)? + field_prefix.len();
        let rest = &status_line[start..];

        let end = rest.find(['|', '>']).unwrap_or(rest.len());
        Some(rest[..end].trim())
    }
}
