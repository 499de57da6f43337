//! Tracing subscriber setup for binaries and long-running hosts.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to whoever embeds the engine.

use orderswap_types::{Result, SwapError};
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Install a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// `json = true` switches to one JSON object per line.
///
/// # Errors
/// Returns `Configuration` if the filter does not parse or a global
/// subscriber is already installed.
pub fn init_tracing(json: bool) -> Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => EnvFilter::try_new(DEFAULT_FILTER),
    }
    .map_err(|e| SwapError::Configuration(format!("log filter: {e}")))?;

    let builder = fmt().with_env_filter(filter).with_target(false);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| SwapError::Configuration(format!("tracing subscriber: {e}")))
}
