//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events. Binaries call [`init`] once at
//! startup to print them; `RUST_LOG` overrides the default `info` level.

use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `RUST_LOG`, falling back to `default`
///
/// # Errors
///
/// Returns error if `default` is not a valid filter directive
pub fn env_filter(default: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .map_err(|e| Error::Config(format!("Invalid log filter '{default}': {e}")))
}

/// Install a global stderr subscriber
///
/// # Errors
///
/// Returns error if the filter is invalid or a subscriber is already set
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(DEFAULT_FILTER)?)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| Error::Other(format!("Failed to initialize tracing: {e}")))
}
