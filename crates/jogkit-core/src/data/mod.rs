//! Data models for commands and machine status
//!
//! This module provides:
//! - The command value object sent over the link
//! - The classified result of a single status query
//! - The terminal outcome of waiting for the machine to settle

use std::fmt;

/// Classified result of one status query
///
/// Never persisted; recomputed on every poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineStatus {
    /// Response contained the ready (idle) marker
    Ready,
    /// Response contained the fault (alarm) marker
    Fault,
    /// No bytes were received yet
    Empty,
    /// Read timed out or the content was not recognized
    Unknown,
}

impl MachineStatus {
    /// Whether this status ends an idle wait
    pub fn is_terminal(&self) -> bool {
        matches!(self, MachineStatus::Ready | MachineStatus::Fault)
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineStatus::Ready => write!(f, "Ready"),
            MachineStatus::Fault => write!(f, "Fault"),
            MachineStatus::Empty => write!(f, "Empty"),
            MachineStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// How an idle wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalStatus {
    /// The machine reported idle
    Ready,
    /// The machine reported an alarm
    Fault,
    /// No terminal status was seen within the poll budget
    TimedOut,
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalStatus::Ready => write!(f, "Ready"),
            TerminalStatus::Fault => write!(f, "Fault"),
            TerminalStatus::TimedOut => write!(f, "TimedOut"),
        }
    }
}

/// Role a command plays with respect to the machine's alarm state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandClass {
    /// Moves the machine; only sent when the machine reports idle
    Motion,
    /// Queries or settings; always allowed
    #[default]
    Maintenance,
    /// Clears an alarm (reset, unlock, homing)
    Recovery,
}

/// Bytes written to the link for a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A text line, terminated with `\n` on the wire
    Line(String),
    /// A single real-time byte, sent without a terminator
    Realtime(u8),
}

impl Payload {
    /// Encode the payload for transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Payload::Line(text) => {
                let mut bytes = Vec::with_capacity(text.len() + 1);
                bytes.extend_from_slice(text.as_bytes());
                bytes.push(b'\n');
                bytes
            }
            Payload::Realtime(byte) => vec![*byte],
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Line(text) => write!(f, "{}", text),
            Payload::Realtime(byte) => write!(f, "0x{:02X}", byte),
        }
    }
}

/// A transient request: literal payload plus a human-readable description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    payload: Payload,
    description: String,
    class: CommandClass,
}

impl Command {
    /// Create a line command
    pub fn line(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            payload: Payload::Line(text.into()),
            description: description.into(),
            class: CommandClass::default(),
        }
    }

    /// Create a real-time single-byte command
    pub fn realtime(byte: u8, description: impl Into<String>) -> Self {
        Self {
            payload: Payload::Realtime(byte),
            description: description.into(),
            class: CommandClass::default(),
        }
    }

    /// Set the command class
    pub fn with_class(mut self, class: CommandClass) -> Self {
        self.class = class;
        self
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn class(&self) -> CommandClass {
        self.class
    }

    /// Wire encoding of the payload
    pub fn to_bytes(&self) -> Vec<u8> {
        self.payload.to_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.payload, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_payload_is_newline_terminated() {
        let cmd = Command::line("$X", "Resetting alarms");
        assert_eq!(cmd.to_bytes(), b"$X\n".to_vec());
        assert_eq!(cmd.class(), CommandClass::Maintenance);
        assert_eq!(cmd.to_string(), "$X - Resetting alarms");
    }

    #[test]
    fn test_realtime_payload_has_no_terminator() {
        let cmd = Command::realtime(0x18, "Soft reset").with_class(CommandClass::Recovery);
        assert_eq!(cmd.to_bytes(), vec![0x18]);
        assert_eq!(cmd.payload().to_string(), "0x18");
        assert_eq!(cmd.class(), CommandClass::Recovery);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(MachineStatus::Ready.is_terminal());
        assert!(MachineStatus::Fault.is_terminal());
        assert!(!MachineStatus::Empty.is_terminal());
        assert!(!MachineStatus::Unknown.is_terminal());
    }
}
