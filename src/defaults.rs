//! Default values for envlink configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the local install directory.
pub const INSTALL_DIR_ENV: &str = "PUP_CUSTOM_DIR";

/// Install directory used when `PUP_CUSTOM_DIR` is unset.
pub const DEFAULT_INSTALL_DIR: &str = "/etc/puppetlabs/local";

/// Environment name every repository falls back to.
pub const DEFAULT_BASELINE_ENVIRONMENT: &str = "production";

/// Upper bound on each external inventory command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns the local install directory.
///
/// Reads `PUP_CUSTOM_DIR`, falling back to `/etc/puppetlabs/local`.
pub fn install_dir() -> PathBuf {
    env::var_os(INSTALL_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_DIR))
}

/// Returns the default configuration file path: `<install dir>/config/config.ini`.
///
/// This can be overridden by the `--config` CLI flag or the
/// `ENVLINK_CONFIG` environment variable.
pub fn default_config_path() -> PathBuf {
    install_dir().join("config").join("config.ini")
}
