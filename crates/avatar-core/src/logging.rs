#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! With the `tracing` feature the macros used by the avatar crates are
//! re-exported from `tracing`. Without it, the same names expand to nothing
//! so call sites compile unchanged and cost nothing.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, trace, trace_span};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op debug_span macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op trace_span macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// A no-op span for when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Enter the no-op span (does nothing).
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// A no-op span guard.
#[cfg(not(feature = "tracing"))]
pub struct NoopGuard;

/// Environment variable holding the log filter for [`init_json`].
#[cfg(feature = "tracing-json")]
pub const ENV_LOG_FILTER: &str = "AVATAR_LOG";

/// Install a global JSON subscriber filtered by `AVATAR_LOG`.
///
/// Falls back to `info` when the variable is unset or unparsable. Returns
/// `false` if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_env(ENV_LOG_FILTER).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(all(test, feature = "tracing-json"))]
mod tests {
    use super::*;

    #[test]
    fn init_json_installs_once() {
        assert!(init_json());
        assert!(!init_json());
        crate::debug!(listener = 7u64, "logged after init");
    }
}
