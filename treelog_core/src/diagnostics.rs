//! Internal diagnostics for the treelog crates.
//!
//! The framework never lets its own faults reach callers; sink failures
//! with no error hook and other internal conditions are reported through
//! `tracing`. Binaries embedding the framework call [`init`] once to make
//! those reports visible.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the diagnostic subscriber at the `info` level.
///
/// Equivalent to [`init_with_level`]`("info")`; `RUST_LOG` takes
/// precedence when set.
pub fn init() {
    init_with_level("info")
}

/// Install a compact-format `tracing` subscriber for the whole process.
///
/// `default_level` is any `tracing` filter directive (`"debug"`,
/// `"treelog_core=trace"`, ...) and only applies when `RUST_LOG` is
/// unset. Call once per process; a second call panics in
/// `tracing_subscriber::registry`.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Variant for unit tests: routes events through the test writer so they
/// show up in failing-test output, and tolerates repeat initialization
/// across tests in one binary.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
