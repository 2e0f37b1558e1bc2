#![forbid(unsafe_code)]

//! Session state machine and the per-frame update entry point.

pub mod session;

pub use session::{MAX_PORTS, ReleaseTimer, Session};
