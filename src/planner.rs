//! Link planning
//!
//! For every environment and every non-control repository, the control
//! repository's environment directory should contain a symlink named after the
//! sibling repository's base directory. It points at the sibling's same-named
//! environment when that exists, otherwise at the sibling's baseline.
//!
//! The planner only reads the filesystem. It returns the links that still need
//! work, so planning an already reconciled tree yields an empty plan.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::inventory::RepositorySource;
use crate::link_state::check_link_state;

/// A link whose sibling repository has neither the environment nor the
/// baseline to point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingBaseline {
    pub repository: String,
    pub link: PathBuf,
    pub target: PathBuf,
}

impl From<MissingBaseline> for Error {
    fn from(m: MissingBaseline) -> Self {
        Error::MissingBaseline {
            repository: m.repository,
            link: m.link,
            target: m.target,
        }
    }
}

/// Desired links that are not yet satisfied on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkPlan {
    /// Link path -> target path.
    pub links: BTreeMap<PathBuf, PathBuf>,
    /// Links skipped because no target exists.
    pub missing: Vec<MissingBaseline>,
}

impl LinkPlan {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.missing.is_empty()
    }
}

/// Compute the plan for `environments`.
///
/// `control` is the repository whose environment directories receive the
/// links; every source in `sources` other than `control` is linked in.
pub fn plan_links<'a, I>(
    control: &RepositorySource,
    sources: I,
    environments: &BTreeSet<String>,
    baseline: &str,
) -> Result<LinkPlan>
where
    I: IntoIterator<Item = &'a RepositorySource>,
{
    let others: Vec<&RepositorySource> = sources
        .into_iter()
        .filter(|s| s.name != control.name)
        .collect();

    let mut plan = LinkPlan::default();
    for env in environments {
        for repo in &others {
            let Some(dir_name) = repo.dir_name() else {
                return Err(Error::configuration(format!(
                    "source '{}' basedir '{}' has no final component",
                    repo.name,
                    repo.base_dir.display()
                )));
            };
            let link = control.environment_dir(env).join(dir_name);

            let candidate = repo.environment_dir(env);
            let target = if candidate.exists() {
                candidate
            } else {
                let fallback = repo.environment_dir(baseline);
                if !fallback.exists() {
                    debug!(
                        "no '{}' or '{}' in '{}', skipping '{}'",
                        env,
                        baseline,
                        repo.name,
                        link.display()
                    );
                    plan.missing.push(MissingBaseline {
                        repository: repo.name.clone(),
                        link,
                        target: fallback,
                    });
                    continue;
                }
                fallback
            };

            if check_link_state(&link, &target)?.is_correct() {
                debug!("'{}' already points at '{}'", link.display(), target.display());
                continue;
            }

            debug!("link {} {}: '{}' -> '{}'", env, repo.name, link.display(), target.display());
            plan.links.insert(link, target);
        }
    }
    Ok(plan)
}
