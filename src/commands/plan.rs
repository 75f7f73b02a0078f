//! Plan command implementation
//!
//! Read-only: fetches the inventory and prints the environments that would be
//! bootstrapped and the links that would be created or replaced.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use envlink::output::{format_plan, OutputConfig};
use envlink::planner::MissingBaseline;
use envlink::reconcile::Context;

use crate::cli::SourceArgs;

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PlanReport<'a> {
    bootstrap: Vec<String>,
    links: &'a BTreeMap<PathBuf, PathBuf>,
    missing: &'a [MissingBaseline],
}

/// Execute the plan command
pub fn execute(args: PlanArgs, color_flag: &str) -> Result<()> {
    let (settings, provider) = args.source.load()?;
    let context = Context::load(settings, &provider)?;

    let needed: Vec<String> = context.needed_environments()?.into_iter().collect();
    let plan = context.plan()?;

    if args.json {
        let report = PlanReport {
            bootstrap: needed,
            links: &plan.links,
            missing: &plan.missing,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let out = OutputConfig::from_env_and_flag(color_flag);
        print!("{}", format_plan(&out, &needed, &plan));
    }
    Ok(())
}
