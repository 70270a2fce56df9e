//! GRBL command vocabulary
//!
//! Commands are opaque to the pipeline; this module only knows how to spell
//! them and which [`CommandClass`] each one belongs to.

use jogkit_core::{Command, CommandClass};
use std::fmt;

/// Real-time soft reset (Ctrl-X)
pub const SOFT_RESET: u8 = 0x18;

/// Real-time status query, written without a terminator
pub const STATUS_QUERY: &[u8] = b"?";

/// Substring of a status report meaning the machine is idle
pub const IDLE_MARKER: &str = "Idle";

/// Substring of a response meaning the machine is in alarm
pub const ALARM_MARKER: &str = "Alarm";

/// Jog axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
        }
    }
}

/// Soft reset; aborts motion and clears the alarm on most firmware builds
pub fn soft_reset() -> Command {
    Command::realtime(SOFT_RESET, "Sending soft reset").with_class(CommandClass::Recovery)
}

/// `$20=0`
pub fn disable_soft_limits() -> Command {
    Command::line("$20=0", "Disabling soft limits temporarily")
}

/// `$X` alarm unlock
pub fn reset_alarms() -> Command {
    Command::line("$X", "Resetting alarms").with_class(CommandClass::Recovery)
}

/// `$H` homing cycle
pub fn home() -> Command {
    Command::line("$H", "Starting homing procedure").with_class(CommandClass::Recovery)
}

/// `?` sent as a line, for an operator-requested status check
pub fn status_query() -> Command {
    Command::line("?", "Checking machine status")
}

/// Relative rapid move along one axis
pub fn jog(axis: Axis, distance: i64, feed: u32) -> Command {
    Command::line(
        format!("G91 G0 {}{} F{}", axis, distance, feed),
        format!("Jogging {} by {}", axis, distance),
    )
    .with_class(CommandClass::Motion)
}

/// Absolute jog to a machine position in millimetres
pub fn move_to(x: u32, y: u32, feed: u32) -> Command {
    Command::line(
        format!("$J=G90 G21 X{} Y{} F{}", x, y, feed),
        format!("Moving to X{} Y{}", x, y),
    )
    .with_class(CommandClass::Motion)
}
