//! # Error Handling
//!
//! This module defines the centralized error type for `envlink`. It uses the
//! `thiserror` library to describe every failure mode of a reconciliation pass
//! as a closed set of variants, each carrying the structured context (paths,
//! expected and actual targets) needed to act on it.
//!
//! ## Error Kinds
//!
//! - **`InventoryFetch`**: an external query failed, timed out, or returned
//!   data that could not be parsed. Fatal.
//! - **`Configuration`**: a required configuration key is missing or invalid,
//!   or the designated control repository is absent from the inventory. Fatal.
//! - **`Conflict`**: a planned link path is occupied by something that cannot
//!   be reconciled to the desired target. Reported per entry.
//! - **`MissingBaseline`**: neither the same-named environment nor the baseline
//!   environment exists in a sibling repository, so no link can be planned
//!   without dangling. Reported per entry.
//! - **`Filesystem`**: an unexpected I/O failure while creating or removing a
//!   path. Propagated, never retried.
//!
//! Per-entry kinds do not abort a pass; they are collected into the run
//! summary and turn the overall exit status non-zero.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::link_state::LinkState;

/// Main error type for envlink operations
#[derive(Error, Debug)]
pub enum Error {
    /// An external inventory command failed or produced unusable output.
    #[error("Inventory fetch failed for `{command}`: {message}")]
    InventoryFetch { command: String, message: String },

    /// Required configuration is missing or invalid.
    ///
    /// Includes an optional hint about how to fix it.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Configuration {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A link path is occupied by something that must not be replaced, or
    /// that still does not point at the expected target after a recreate.
    #[error("Link conflict at '{}': expected symlink to '{}', found {found}", link.display(), expected.display())]
    Conflict {
        link: PathBuf,
        expected: PathBuf,
        found: LinkState,
    },

    /// A sibling repository has neither the requested environment nor the
    /// baseline environment to fall back to.
    #[error("Repository '{repository}' has no baseline to link '{}' to (missing '{}')", link.display(), target.display())]
    MissingBaseline {
        repository: String,
        link: PathBuf,
        target: PathBuf,
    },

    /// A filesystem call failed.
    #[error("Failed to {operation} '{}': {source}", path.display())]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An INI parsing error, wrapped from `ini::Error`.
    #[error("INI parsing error: {0}")]
    Ini(#[from] ini::Error),
}

impl Error {
    /// Build a `Filesystem` error for `operation` on `path`.
    pub fn filesystem(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Build a `Configuration` error without a hint.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            hint: None,
        }
    }

    /// Whether this error is reported per entry rather than aborting the pass.
    pub fn is_per_entry(&self) -> bool {
        matches!(self, Error::Conflict { .. } | Error::MissingBaseline { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
