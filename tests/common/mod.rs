#![allow(dead_code)]

//! Shared test utilities for the CLI end-to-end tests.
//!
//! [`Deployment`] lays out a small r10k-style tree in a temp directory:
//!
//! ```text
//! environments/            control: production, feature_x
//!   production/{manifests/, environment.conf}
//!   feature_x/manifests/
//! modules/moduleA/         production, feature_x, feature_z
//! modules/moduleB/         production
//! ```
//!
//! and writes fake `puppet` and `r10k` scripts plus a `config.ini` pointing at
//! them, so the real binary can be run against it.

use assert_fs::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::Deployment;
}

/// A deployed tree plus fake tools and configuration.
pub struct Deployment {
    temp_dir: assert_fs::TempDir,
}

impl Deployment {
    /// Lay out the tree and a working configuration.
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };

        for dir in [
            "environments/production/manifests",
            "environments/feature_x/manifests",
            "modules/moduleA/production",
            "modules/moduleA/feature_x",
            "modules/moduleA/feature_z",
            "modules/moduleB/production",
        ] {
            fixture.temp_dir.child(dir).create_dir_all().unwrap();
        }
        fixture
            .temp_dir
            .child("environments/production/environment.conf")
            .write_str("modulepath = modules\n")
            .unwrap();

        let envs = fixture.envs();
        fixture.with_puppet(&format!("echo '{}'", envs.display()));
        fixture.with_r10k(&format!("cat <<'EOF'\n{}EOF", fixture.display_yaml()));
        fixture.with_config("");
        fixture
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn envs(&self) -> PathBuf {
        self.path().join("environments")
    }

    pub fn modules(&self) -> PathBuf {
        self.path().join("modules")
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.ini")
    }

    /// The YAML `r10k deploy display` would print for this tree.
    pub fn display_yaml(&self) -> String {
        format!(
            r#"---
:sources:
- :name: :control
  :basedir: {envs}
  :environments:
  - production
  - feature_x
- :name: :moduleA
  :basedir: {modules}/moduleA
  :environments:
  - production
  - feature_x
  - feature_z
- :name: :moduleB
  :basedir: {modules}/moduleB
  :environments:
  - production
"#,
            envs = self.envs().display(),
            modules = self.modules().display()
        )
    }

    /// Replace the body of the fake `puppet` script.
    pub fn with_puppet(&self, body: &str) -> &Self {
        self.write_script("bin/puppet", body);
        self
    }

    /// Replace the body of the fake `r10k` script.
    pub fn with_r10k(&self, body: &str) -> &Self {
        self.write_script("bin/r10k", body);
        self
    }

    /// Rewrite `config.ini`, appending `extra_r10k` lines to the [R10K] section.
    pub fn with_config(&self, extra_r10k: &str) -> &Self {
        let content = format!(
            "[PUPPET]\npuppet = {}\n\n[R10K]\nr10k = {}\ncontrol_repo_name = control\n{}",
            self.path().join("bin/puppet").display(),
            self.path().join("bin/r10k").display(),
            extra_r10k
        );
        fs::write(self.config_path(), content).unwrap();
        self
    }

    fn write_script(&self, rel: &str, body: &str) {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new()
    }
}
