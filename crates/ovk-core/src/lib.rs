#![forbid(unsafe_code)]

//! Core: raw input sampling, edge detection, and the key-table data model.

pub mod edge;
pub mod event;
pub mod geometry;
pub mod keytable;
pub mod logging;
pub mod overlay;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};
