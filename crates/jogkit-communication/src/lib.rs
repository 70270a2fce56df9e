//! # JogKit Communication
//!
//! The command/response synchronization engine for GRBL controllers:
//! the serial link and its lifecycle, the status poller, the idle-wait
//! supervisor, the command dispatcher, and the debounce gate that admits
//! keyboard input.
//!
//! Everything runs on one logical pipeline. A command is never written while
//! another one is still waiting for the machine to report idle or alarm.

pub mod communication;
pub mod control;
pub mod firmware;
pub mod sync;

pub use communication::{
    connection::{Connection, ConnectionManager, RetryPrompt},
    mock::{MockLink, MockTransportFactory},
    serial::{list_ports, SerialPortInfo, SerialTransportFactory},
    ConnectionParams, Transport, TransportFactory,
};
pub use control::{
    gate::DebounceGate,
    keymap::{action_for, Action, KEY_BINDINGS},
    pipeline::{ExitReason, Flow, InputSource, Pipeline},
};
pub use firmware::grbl::Axis;
pub use sync::{
    dispatcher::{CommandDispatcher, DispatchResult},
    poller::StatusPoller,
    policy::RetryPolicy,
    session::Session,
    supervisor::IdleWaitSupervisor,
};
