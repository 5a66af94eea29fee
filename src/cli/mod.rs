//! Command-line modes
//!
//! `server` runs the HTTP façade; the default mode resolves a single query or
//! URL and prints the JSON body.

pub mod resolve;
pub mod server;

use crate::{Settings, config::ConfigLoader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    /// Keeps stdout clean for JSON output
    Stderr,
}

/// Load settings from `--config`, the environment or the default location
///
/// Runs before logging is initialized, so problems go to stderr directly.
pub fn load_settings(config: Option<&str>) -> Settings {
    let config_path = match config {
        Some(path) => Some(std::path::PathBuf::from(path)),
        None => ConfigLoader::get_config_path(),
    };

    ConfigLoader::new()
        .load(config_path.as_deref())
        .unwrap_or_else(|e| {
            eprintln!(
                "Warning: Failed to load configuration: {}. Using defaults.",
                e
            );
            Settings::default()
        })
}

/// Log filter precedence: `--verbose`, then `RUST_LOG`, then `logging.level`
pub fn log_filter(verbose: bool, configured_level: &str) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(configured_level)
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init_logging(settings: &Settings, target: LogTarget) {
    let filter = log_filter(settings.logging.verbose, &settings.logging.level);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match target {
        LogTarget::Stdout => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        LogTarget::Stderr => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
