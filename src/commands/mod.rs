//! # CLI Command Implementations
//!
//! One file per subcommand. Each defines a clap `Args` struct and an
//! `execute` function that calls into the `envlink` library.

pub mod completions;
pub mod inventory;
pub mod plan;
pub mod run;
