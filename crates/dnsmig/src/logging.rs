//! Tracing subscriber setup
//!
//! `RUST_LOG` wins over `--log-level` when it is set.

use crate::cli::LogFormat;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Install the global subscriber
pub fn init(level: &str, format: LogFormat) -> Result<()> {
    let level = level.to_lowercase();
    if !LEVELS.contains(&level.as_str()) {
        anyhow::bail!(
            "Log level '{}' is not valid. Valid levels: {}",
            level,
            LEVELS.join(", ")
        );
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.compact().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}
