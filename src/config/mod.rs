//! Configuration management for the gateway
//!
//! This module handles loading and managing configuration settings
//! for both HTTP server and one-shot resolve modes.

pub mod loader;
pub mod settings;

pub use loader::{CONFIG_ENV_VAR, ConfigLoader};
pub use settings::{
    CdnSettings, DirectSettings, LoggingSettings, NetworkSettings, PipelineSettings,
    SearchSettings, ServerSettings, Settings,
};

// Shared across modules so tests touching process env never interleave
#[cfg(test)]
pub(crate) static ENV_TEST_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
