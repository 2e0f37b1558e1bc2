#![forbid(unsafe_code)]

//! Logging support.
//!
//! With the `tracing` feature enabled this module re-exports the tracing
//! macros used across the workspace. Without it, no-op replacements with the
//! same names are exported at the crate root, so call sites never need a
//! feature gate of their own.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

/// Install a JSON-formatted subscriber reading `RUST_LOG`, for hosts that
/// want structured frame logs without wiring tracing themselves.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
