//! Command/response synchronization
//!
//! - [`poller`]: one status query, classified
//! - [`supervisor`]: repeated polls until idle, alarm or timeout
//! - [`dispatcher`]: bounded write retries, then supervision
//! - [`session`]: busy flag, debounce timestamp and fault latch
//! - [`policy`]: interval and attempt caps shared by the above

pub mod dispatcher;
pub mod poller;
pub mod policy;
pub mod session;
pub mod supervisor;
