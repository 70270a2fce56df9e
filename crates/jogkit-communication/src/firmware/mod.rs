//! Firmware vocabulary
//!
//! Only GRBL is supported: the command set the pipeline sends and the status
//! reports it reads back.

pub mod grbl;
