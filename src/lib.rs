//! # envlink
//!
//! After r10k deploys a Puppet control repository, each of its branches is a
//! directory under the environment root. Sibling repositories managed as
//! separate r10k sources are deployed under their own base directories, and
//! nothing links them into the control environments. This library fills that
//! gap: it makes sure every environment known to any repository exists, and
//! that every environment directory contains a symlink to the matching branch
//! of every sibling repository, or to the sibling's baseline (`production`)
//! when no such branch exists.
//!
//! ## Quick Example
//!
//! ```no_run
//! use envlink::config::Settings;
//! use envlink::inventory::StaticInventory;
//! use envlink::reconcile::{run, Context};
//!
//! let inventory = StaticInventory::new("/etc/puppetlabs/code/environments")
//!     .with_source("control", "/etc/puppetlabs/code/environments", ["production"])
//!     .with_source("site", "/etc/puppetlabs/code/site", ["production", "feature"]);
//! let settings = Settings::new("/opt/puppetlabs/bin/puppet".into(), "/usr/bin/r10k".into(), "control");
//!
//! let context = Context::load(settings, &inventory).unwrap();
//! let summary = run(&context).unwrap();
//! assert!(!summary.has_problems());
//! ```
//!
//! ## Modules
//!
//! - **`config`** / **`defaults`**: the INI settings file and its defaults.
//! - **`inventory`** / **`external`**: fetching the environment root and r10k
//!   sources from the external tools, with a timeout.
//! - **`link_state`**: the one primitive that classifies what occupies a path.
//! - **`bootstrap`**: creating and seeding missing environment directories.
//! - **`planner`**: computing the desired cross-repository links.
//! - **`applier`**: making the filesystem match the plan.
//! - **`reconcile`**: the driver tying the steps together.
//! - **`output`**: rendering plans and summaries.

pub mod applier;
pub mod bootstrap;
pub mod config;
pub mod defaults;
pub mod error;
pub mod external;
pub mod inventory;
pub mod link_state;
pub mod output;
pub mod planner;
pub mod reconcile;

#[cfg(test)]
mod reconcile_proptest;
