//! CLI argument parsing and command dispatch

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};

use envlink::config::{self, Settings};
use envlink::defaults::default_config_path;
use envlink::inventory::CommandInventory;

use crate::commands;

/// envlink - Link r10k environments across sibling repositories
#[derive(Parser, Debug)]
#[command(name = "envlink")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG wins when set
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create missing environments and cross-repository links
    Run(commands::run::RunArgs),

    /// Show the environments and links a run would create
    Plan(commands::plan::PlanArgs),

    /// Show the fetched environment root and r10k sources
    Inventory(commands::inventory::InventoryArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Options shared by every command that reads the inventory.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Path to config.ini (defaults to $PUP_CUSTOM_DIR/config/config.ini)
    #[arg(short, long, value_name = "PATH", env = "ENVLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use this environment root instead of asking puppet
    #[arg(long, value_name = "PATH")]
    pub environment_root: Option<PathBuf>,

    /// Read `r10k deploy display` YAML from a file ("-" for stdin) instead of running r10k
    #[arg(long, value_name = "PATH")]
    pub inventory_file: Option<PathBuf>,
}

impl SourceArgs {
    /// Load settings and build the inventory provider they describe.
    pub fn load(&self) -> Result<(Settings, CommandInventory)> {
        let config_path = self.config.clone().unwrap_or_else(default_config_path);
        let settings = config::from_file(&config_path)?;

        let mut provider = CommandInventory::new(settings.clone());
        if let Some(root) = &self.environment_root {
            provider = provider.with_environment_root(root.clone());
        }
        if let Some(path) = &self.inventory_file {
            provider = provider.with_display_document(read_document(path)?);
        }
        Ok((settings, provider))
    }
}

fn read_document(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read inventory from stdin");
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read inventory file: {}", path.display()))
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Run(args) => commands::run::execute(args, &self.color),
            Commands::Plan(args) => commands::plan::execute(args, &self.color),
            Commands::Inventory(args) => commands::inventory::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let _ = builder.format_timestamp(None).try_init();
}
