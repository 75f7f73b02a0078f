//! Inventory command implementation
//!
//! Prints what the external tools report: the environment root and every
//! r10k source with its base directory and environments. Useful to check the
//! configuration before running.

use anyhow::Result;
use clap::Args;

use envlink::inventory::Inventory;

use crate::cli::SourceArgs;

/// Arguments for the inventory command
#[derive(Args, Debug)]
pub struct InventoryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print as JSON instead of YAML
    #[arg(long)]
    pub json: bool,
}

/// Execute the inventory command
pub fn execute(args: InventoryArgs) -> Result<()> {
    let (_settings, provider) = args.source.load()?;
    let inventory = Inventory::fetch(&provider)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
    } else {
        print!("{}", serde_yaml::to_string(&inventory)?);
    }
    Ok(())
}
