//! Structured logging setup.
//!
//! The library only emits `tracing` events; binaries and tests decide where
//! they go. `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install a global fmt subscriber for `config`.
///
/// Returns `false` if a subscriber was already installed, which makes it safe
/// to call from every test.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json_format {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(app = %config.app_name, level = %config.log_level, "Logging initialized");
    }
    installed
}
