//! Tracing infrastructure.
//!
//! Enable with `--features tracing`. The macros become no-ops when the
//! feature is disabled. Only cold paths log (construction, teardown,
//! reunite); push and pop never do.

/// Initialize the tracing subscriber with uptime timestamps.
///
/// Call this at the start of a binary or test to get trace output.
/// Filtering follows `RUST_LOG`, defaulting to debug for this crate
/// and info for the checksum driver.
/// Does nothing if the `tracing` feature is not enabled.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ringspsc_rs=debug,ringspsc_driver=info"));

    // A subscriber may already be installed (tests, embedding binaries).
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

#[cfg(feature = "tracing")]
pub(crate) use tracing::debug;

#[cfg(not(feature = "tracing"))]
macro_rules! debug_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use debug_noop as debug;
