//! Link application
//!
//! Makes the filesystem match a [`LinkPlan`]. Each entry is re-inspected right
//! before it is touched, since the tree may have changed since planning:
//!
//! | state found      | action                         |
//! |------------------|--------------------------------|
//! | absent           | create                         |
//! | correct symlink  | nothing                        |
//! | wrong symlink    | remove, recreate               |
//! | file             | remove, recreate               |
//! | directory        | conflict, left untouched       |
//!
//! If creation reports that the path already exists, someone else got there
//! first: the entry succeeds only when the new occupant is the desired link.
//! Conflicts are collected per entry; filesystem failures abort the batch.

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::link_state::{check_link_state, LinkState};
use crate::planner::LinkPlan;

/// What applying a plan did.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Links created where nothing existed.
    pub created: Vec<PathBuf>,
    /// Links that replaced a wrong symlink or a file.
    pub replaced: Vec<PathBuf>,
    /// Links found already correct at application time.
    pub unchanged: Vec<PathBuf>,
    /// Per-entry conflicts; always [`Error::Conflict`].
    pub conflicts: Vec<Error>,
}

impl ApplyReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Created,
    Replaced,
    Unchanged,
}

/// Apply every link in `plan`.
pub fn apply_links(plan: &LinkPlan) -> Result<ApplyReport> {
    let mut report = ApplyReport::default();
    for (link, target) in &plan.links {
        info!("attempting: '{}' -> '{}'", link.display(), target.display());
        match apply_one(link, target) {
            Ok(Outcome::Created) => report.created.push(link.clone()),
            Ok(Outcome::Replaced) => report.replaced.push(link.clone()),
            Ok(Outcome::Unchanged) => report.unchanged.push(link.clone()),
            Err(e) if e.is_per_entry() => {
                warn!("{}", e);
                report.conflicts.push(e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(report)
}

fn apply_one(link: &Path, target: &Path) -> Result<Outcome> {
    let outcome = match check_link_state(link, target)? {
        LinkState::Correct => return Ok(Outcome::Unchanged),
        LinkState::Absent => Outcome::Created,
        LinkState::Directory => {
            return Err(Error::Conflict {
                link: link.to_path_buf(),
                expected: target.to_path_buf(),
                found: LinkState::Directory,
            })
        }
        found @ (LinkState::WrongTarget { .. } | LinkState::File) => {
            debug!("removing '{}' ({})", link.display(), found);
            match fs::remove_file(link) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::filesystem("remove", link, e)),
            }
            Outcome::Replaced
        }
    };

    match symlink(target, link) {
        Ok(()) => Ok(outcome),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => recheck_existing(link, target),
        Err(e) => Err(Error::filesystem("create symlink", link, e)),
    }
}

/// Settle a create that lost a race: the path appeared after it was inspected.
/// The occupant is never removed at this point.
fn recheck_existing(link: &Path, target: &Path) -> Result<Outcome> {
    match check_link_state(link, target)? {
        LinkState::Correct => {
            debug!("'{}' was created concurrently with the right target", link.display());
            Ok(Outcome::Unchanged)
        }
        found => Err(Error::Conflict {
            link: link.to_path_buf(),
            expected: target.to_path_buf(),
            found,
        }),
    }
}
