//! Environment bootstrapping
//!
//! r10k only creates environment directories for branches of the control
//! repository. Branches that exist only in sibling repositories get their
//! directory here, seeded with symlinks to every non-symlink entry of the
//! baseline environment so the new environment behaves like the baseline
//! until something overrides it.
//!
//! Seeding is best-effort. A seed path that is already occupied is left alone;
//! if the occupant is not the expected symlink it is logged at warn level and
//! recorded in the report rather than treated as an error.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::link_state::{check_link_state, LinkState};

/// A seed path found occupied by something other than the expected symlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedCollision {
    pub link: PathBuf,
    pub target: PathBuf,
    pub found: LinkState,
}

/// What a bootstrap call did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Environment directories that did not exist before.
    pub created_dirs: Vec<PathBuf>,
    /// Seed symlinks created.
    pub seeded_links: Vec<PathBuf>,
    /// Seed paths left untouched because something else was there.
    pub collisions: Vec<SeedCollision>,
}

/// Create and seed the environment directories in `names` under
/// `environment_root`, mirroring `environment_root/<baseline>`.
pub fn ensure_environments(
    environment_root: &Path,
    baseline: &str,
    names: &BTreeSet<String>,
) -> Result<BootstrapReport> {
    let mut report = BootstrapReport::default();
    if names.is_empty() {
        return Ok(report);
    }

    let baseline_dir = environment_root.join(baseline);
    let seeds = baseline_entries(&baseline_dir)?;

    for name in names {
        let env_dir = environment_root.join(name);
        debug!("making environment '{}' at '{}'", name, env_dir.display());
        match fs::create_dir(&env_dir) {
            Ok(()) => {
                info!("created environment directory '{}'", env_dir.display());
                report.created_dirs.push(env_dir.clone());
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(Error::filesystem("create directory", &env_dir, e)),
        }

        if name == baseline {
            continue;
        }

        for entry in &seeds {
            let link = env_dir.join(entry);
            let target = baseline_dir.join(entry);
            seed_link(&link, &target, &mut report)?;
        }
    }

    Ok(report)
}

/// Names of the top-level baseline entries that are plain files or directories.
///
/// Symlinks in the baseline are cross-repository links owned by the planner
/// and are not mirrored.
fn baseline_entries(baseline_dir: &Path) -> Result<Vec<std::ffi::OsString>> {
    let read = fs::read_dir(baseline_dir)
        .map_err(|e| Error::filesystem("read baseline environment", baseline_dir, e))?;

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| Error::filesystem("read baseline environment", baseline_dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| Error::filesystem("inspect", entry.path(), e))?;
        if file_type.is_dir() || file_type.is_file() {
            entries.push(entry.file_name());
        }
    }
    entries.sort();
    Ok(entries)
}

fn seed_link(link: &Path, target: &Path, report: &mut BootstrapReport) -> Result<()> {
    match symlink(target, link) {
        Ok(()) => {
            debug!("seeded '{}' -> '{}'", link.display(), target.display());
            report.seeded_links.push(link.to_path_buf());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            let found = check_link_state(link, target)?;
            if !found.is_correct() {
                // TODO: decide whether a non-link occupant should be a
                // Conflict like in the applier instead of a warning.
                warn!(
                    "seed path '{}' is occupied by {}; leaving it in place",
                    link.display(),
                    found
                );
                report.collisions.push(SeedCollision {
                    link: link.to_path_buf(),
                    target: target.to_path_buf(),
                    found,
                });
            }
            Ok(())
        }
        Err(e) => Err(Error::filesystem("create symlink", link, e)),
    }
}
