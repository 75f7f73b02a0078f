//! Filesystem link state inspection
//!
//! `check_link_state` is the single resolve-and-compare primitive shared by
//! bootstrap seeding, link planning and link application. It never mutates the
//! filesystem and never caches: every call reads the current state of the path.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// What currently occupies a link path, relative to a desired target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum LinkState {
    /// Nothing exists at the path (not even a dangling symlink).
    Absent,
    /// A symlink that resolves to the desired target.
    Correct,
    /// A symlink that resolves somewhere else, or dangles.
    WrongTarget {
        /// The raw link contents as returned by `readlink`.
        actual: PathBuf,
    },
    /// A regular file, or any other non-directory, non-symlink entry.
    File,
    /// A real directory. Never removed.
    Directory,
}

impl LinkState {
    /// Whether the path already satisfies the desired link.
    pub fn is_correct(&self) -> bool {
        matches!(self, LinkState::Correct)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Absent => write!(f, "nothing"),
            LinkState::Correct => write!(f, "the expected symlink"),
            LinkState::WrongTarget { actual } => {
                write!(f, "a symlink to '{}'", actual.display())
            }
            LinkState::File => write!(f, "a regular file"),
            LinkState::Directory => write!(f, "a directory"),
        }
    }
}

/// Inspect `link` and classify it against `desired_target`.
///
/// Symlinks are compared by fully resolving both sides, so a link written with
/// a relative or non-canonical path still counts as correct. If either side
/// cannot be resolved the raw link contents are compared instead; a dangling
/// link only matches when it names the target verbatim.
pub fn check_link_state(link: &Path, desired_target: &Path) -> Result<LinkState> {
    let metadata = match fs::symlink_metadata(link) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LinkState::Absent),
        Err(e) => return Err(Error::filesystem("inspect", link, e)),
    };

    let file_type = metadata.file_type();
    if file_type.is_symlink() {
        let actual = fs::read_link(link).map_err(|e| Error::filesystem("read symlink", link, e))?;
        if resolves_to(link, &actual, desired_target) {
            Ok(LinkState::Correct)
        } else {
            Ok(LinkState::WrongTarget { actual })
        }
    } else if file_type.is_dir() {
        Ok(LinkState::Directory)
    } else {
        Ok(LinkState::File)
    }
}

fn resolves_to(link: &Path, raw: &Path, desired_target: &Path) -> bool {
    match (fs::canonicalize(link), fs::canonicalize(desired_target)) {
        (Ok(resolved), Ok(desired)) => resolved == desired,
        _ => raw == desired_target,
    }
}
