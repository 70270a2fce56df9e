//! # JogKit Core
//!
//! Core types and the error taxonomy shared by every JogKit crate.
//! Provides the command value object, the classified machine status,
//! and the discrete input keys delivered by an input source.

pub mod data;
pub mod error;
pub mod input;

pub use data::{Command, CommandClass, MachineStatus, Payload, TerminalStatus};
pub use error::{ConnectionError, DispatchFailure, Error, Result};
pub use input::InputKey;
