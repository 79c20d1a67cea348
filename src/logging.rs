//! logging
//!
//! Diagnostic logging for the library and the CLI.
//!
//! Library code emits `tracing` events; nothing is printed unless a
//! subscriber is installed. The binary installs one with [`init`], writing to
//! stderr so command output on stdout stays clean.
//!
//! # Filter
//!
//! Priority order (highest to lowest):
//! 1. `REVFS_LOG` (an `EnvFilter` directive string, e.g. `revfs::fs=debug`)
//! 2. `RUST_LOG`
//! 3. The CLI verbosity (`--debug` → `debug`, `--quiet` → `error`, else `warn`)

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ui::output::Verbosity;

/// Environment variable holding a filter directive for revfs.
pub const LOG_ENV: &str = "REVFS_LOG";

/// Build the event filter for `verbosity`.
pub fn build_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)))
}

fn default_level(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Debug => "debug",
    }
}

/// Install the global stderr subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbosity: Verbosity) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity == Verbosity::Debug);
    let _ = tracing_subscriber::registry()
        .with(build_filter(verbosity))
        .with(layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_follow_verbosity() {
        assert_eq!(default_level(Verbosity::Quiet), "error");
        assert_eq!(default_level(Verbosity::Normal), "warn");
        assert_eq!(default_level(Verbosity::Debug), "debug");
    }

    #[test]
    fn init_twice_is_harmless() {
        init(Verbosity::Normal);
        init(Verbosity::Debug);
        tracing::debug!("after init");
    }
}
