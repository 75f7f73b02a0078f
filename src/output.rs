//! # Output
//!
//! Human-readable rendering of plans and run summaries, with color and symbol
//! selection that respects the terminal and user preferences:
//!
//! - `--color=never|always|auto`
//! - `NO_COLOR` (any value) disables symbols in auto mode
//! - `CLICOLOR=0` disables, `CLICOLOR_FORCE=1` forces
//! - `TERM=dumb` disables
//!
//! Rendering functions return `String`s; the binary decides where they go.

use std::env;
use std::fmt::Write as _;

use crate::planner::LinkPlan;
use crate::reconcile::Summary;

/// Output configuration for controlling colors and symbols.
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve from the `--color` flag value and the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_ascii_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => detect_color_support(),
        };
        Self { use_color }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

fn detect_color_support() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}

/// Pick the emoji when colors are on, the plain marker otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Render a plan as `link -> target` lines.
pub fn format_plan(out: &OutputConfig, needed: &[String], plan: &LinkPlan) -> String {
    let mut s = String::new();
    if needed.is_empty() {
        let _ = writeln!(s, "No environments need bootstrapping");
    } else {
        let _ = writeln!(s, "Environments to bootstrap: {}", needed.join(", "));
    }

    if plan.links.is_empty() {
        let _ = writeln!(s, "{} All links up to date", emoji(out, "✅", "[OK]"));
    } else {
        let _ = writeln!(s, "Links to create ({}):", plan.links.len());
        for (link, target) in &plan.links {
            let _ = writeln!(s, "  {} -> {}", link.display(), target.display());
        }
    }

    for missing in &plan.missing {
        let _ = writeln!(
            s,
            "{} {}: no target for {} (missing {})",
            emoji(out, "⚠️ ", "[WARN]"),
            missing.repository,
            missing.link.display(),
            missing.target.display()
        );
    }
    s
}

/// Render the final summary of a run.
pub fn format_summary(out: &OutputConfig, summary: &Summary) -> String {
    let mut s = String::new();
    let bootstrap = &summary.bootstrap;
    let apply = &summary.apply;

    let _ = writeln!(
        s,
        "Environments: {} needed, {} created, {} seed links",
        summary.needed.len(),
        bootstrap.created_dirs.len(),
        bootstrap.seeded_links.len()
    );
    if !bootstrap.collisions.is_empty() {
        let _ = writeln!(
            s,
            "  {} seed paths left in place (see warnings)",
            bootstrap.collisions.len()
        );
    }
    let _ = writeln!(
        s,
        "Links: {} created, {} replaced, {} unchanged",
        apply.created.len(),
        apply.replaced.len(),
        apply.unchanged.len()
    );

    let problems = summary.problems();
    if problems.is_empty() {
        let _ = writeln!(s, "{} Reconciled", emoji(out, "✅", "[OK]"));
    } else {
        let _ = writeln!(s, "{} {} problem(s):", emoji(out, "❌", "[ERR]"), problems.len());
        for problem in problems {
            let _ = writeln!(s, "  - {}", problem);
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::link_state::LinkState;
    use crate::planner::MissingBaseline;
    use std::path::PathBuf;

    #[test]
    fn test_color_flag_overrides() {
        assert!(OutputConfig::from_env_and_flag("always").use_color);
        assert!(!OutputConfig::from_env_and_flag("NEVER").use_color);
    }

    #[test]
    fn test_emoji_selection() {
        assert_eq!(emoji(&OutputConfig { use_color: true }, "✅", "[OK]"), "✅");
        assert_eq!(emoji(&OutputConfig::plain(), "✅", "[OK]"), "[OK]");
    }

    #[test]
    fn test_format_plan() {
        let mut plan = LinkPlan::default();
        plan.links.insert(PathBuf::from("/envs/e/m"), PathBuf::from("/m/production"));
        plan.missing.push(MissingBaseline {
            repository: "n".to_string(),
            link: PathBuf::from("/envs/e/n"),
            target: PathBuf::from("/n/production"),
        });

        let text = format_plan(&OutputConfig::plain(), &["e".to_string()], &plan);
        assert!(text.contains("Environments to bootstrap: e"));
        assert!(text.contains("/envs/e/m -> /m/production"));
        assert!(text.contains("[WARN] n: no target for /envs/e/n"));
    }

    #[test]
    fn test_format_empty_plan() {
        let text = format_plan(&OutputConfig::plain(), &[], &LinkPlan::default());
        assert!(text.contains("No environments need bootstrapping"));
        assert!(text.contains("[OK] All links up to date"));
    }

    #[test]
    fn test_format_summary_lists_conflicts() {
        let mut summary = Summary::default();
        summary.apply.created.push(PathBuf::from("/envs/a/m"));
        summary.apply.conflicts.push(Error::Conflict {
            link: PathBuf::from("/envs/b/m"),
            expected: PathBuf::from("/m/b"),
            found: LinkState::Directory,
        });

        let text = format_summary(&OutputConfig::plain(), &summary);
        assert!(text.contains("Links: 1 created, 0 replaced, 0 unchanged"));
        assert!(text.contains("[ERR] 1 problem(s):"));
        assert!(text.contains("/envs/b/m"));
        assert!(text.contains("a directory"));
    }

    #[test]
    fn test_format_summary_clean() {
        let text = format_summary(&OutputConfig::plain(), &Summary::default());
        assert!(text.contains("[OK] Reconciled"));
    }
}
