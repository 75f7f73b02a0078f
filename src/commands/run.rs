//! Run command implementation
//!
//! Performs one full reconciliation pass:
//! 1. Fetch the environment root and r10k sources
//! 2. Bootstrap environments missing from the control repository
//! 3. Plan cross-repository links
//! 4. Apply the plan
//!
//! Per-entry problems are listed in the summary and make the command exit 1.

use anyhow::Result;
use clap::Args;

use envlink::output::{emoji, format_plan, format_summary, OutputConfig};
use envlink::reconcile::{self, Context};

use crate::cli::SourceArgs;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Show what would be done without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the run command
pub fn execute(args: RunArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let (settings, provider) = args.source.load()?;
    let context = Context::load(settings, &provider)?;

    if args.dry_run {
        let needed: Vec<String> = context.needed_environments()?.into_iter().collect();
        let plan = context.plan()?;
        if !args.quiet {
            println!("{} DRY RUN MODE - No changes will be made", emoji(&out, "🔎", "[DRY]"));
            print!("{}", format_plan(&out, &needed, &plan));
        }
        return Ok(());
    }

    let summary = reconcile::run(&context)?;
    if !args.quiet {
        print!("{}", format_summary(&out, &summary));
    }

    if summary.has_problems() {
        let problems = summary.problems();
        if args.quiet {
            for problem in &problems {
                eprintln!("{}", problem);
            }
        }
        anyhow::bail!("{} problem(s) during reconciliation", problems.len());
    }
    Ok(())
}
