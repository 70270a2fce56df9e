//! # JogKit
//!
//! Keyboard jog console for GRBL controllers. Every command waits for the
//! machine to report idle (or alarm) before the next key is accepted.
//!
//! ## Architecture
//!
//! JogKit is organized as a workspace with multiple crates:
//!
//! 1. **jogkit-core** - Error taxonomy, status and command types, input keys
//! 2. **jogkit-settings** - Configuration file loading and validation
//! 3. **jogkit-communication** - Serial link, status polling, idle-wait
//!    supervision, dispatch and debouncing
//! 4. **jogkit** - This binary: CLI, logging, terminal input

pub mod app;
pub mod cli;
pub mod input;
pub mod logging;

pub use app::{run, RunOptions, RunOutcome};
pub use cli::Cli;
pub use logging::init_logging;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");
