//! Opt-in log output for test runs
//!
//! The library only emits `tracing` events; nothing is printed unless a
//! subscriber is installed. Test binaries and demos call [`init_tracing`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable read before `RUST_LOG`
pub const LOG_ENV: &str = "PORTAL_PROBE_LOG";

/// Filter used when neither variable is set
pub const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a compact stderr subscriber.
///
/// Returns `false` when a global subscriber was already set, so calling this
/// from every test is fine.
pub fn init_tracing() -> bool {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_target(true)
                .with_test_writer()
                .compact(),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let _ = init_tracing();
        assert!(!init_tracing());
    }
}
