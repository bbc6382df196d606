//! Logging setup.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber with `level` as the filter
/// directive (e.g. `"info"`, `"rehost=debug"`).
///
/// Fails if the directive is invalid or a subscriber is already installed.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log level directive: {level}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))
}
