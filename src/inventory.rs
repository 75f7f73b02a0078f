//! # Inventory
//!
//! This module fetches the two pieces of external state a reconciliation pass
//! needs: the environment root directory and the list of r10k sources with
//! their base directories and known environments.
//!
//! ## Design
//!
//! Fetching sits behind the [`InventoryProvider`] trait so the rest of the
//! crate never shells out directly. [`CommandInventory`] is the production
//! implementation: it runs `puppet config print environmentpath` and
//! `r10k deploy display`, each bounded by the configured timeout. Either query
//! can be replaced with a fixed value for offline use. [`StaticInventory`]
//! holds already-known data and is what tests use.
//!
//! The result of a fetch is an [`Inventory`] value; it is fetched once per
//! pass and passed by reference, never cached globally.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::external::run_captured;

/// One r10k source: a repository whose branches are deployed as directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySource {
    /// Source key as reported by r10k (leading `:` stripped).
    pub name: String,
    /// Directory under which each environment of this source is deployed.
    pub base_dir: PathBuf,
    /// Known environment (branch) names.
    pub environments: BTreeSet<String>,
}

impl RepositorySource {
    /// The final component of `base_dir`, used as the link name inside
    /// another repository's environment directory.
    pub fn dir_name(&self) -> Option<&std::ffi::OsStr> {
        self.base_dir.file_name()
    }

    /// Directory of one environment of this source.
    pub fn environment_dir(&self, environment: &str) -> PathBuf {
        self.base_dir.join(environment)
    }
}

/// Everything fetched from the external collaborators for one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inventory {
    /// Root directory under which environments live.
    pub environment_root: PathBuf,
    /// Sources keyed by name.
    pub sources: BTreeMap<String, RepositorySource>,
}

impl Inventory {
    /// Fetch both queries from `provider`.
    pub fn fetch(provider: &dyn InventoryProvider) -> Result<Self> {
        let environment_root = provider.fetch_environment_root()?;
        let sources = provider.fetch_sources()?;
        debug!(
            "inventory: root '{}', sources {:?}",
            environment_root.display(),
            sources.keys().collect::<Vec<_>>()
        );
        Ok(Self {
            environment_root,
            sources,
        })
    }

    /// Union of every source's known environments.
    pub fn all_environments(&self) -> BTreeSet<String> {
        self.sources
            .values()
            .flat_map(|s| s.environments.iter().cloned())
            .collect()
    }
}

/// Source of inventory data.
pub trait InventoryProvider {
    /// The directory under which environments are deployed.
    fn fetch_environment_root(&self) -> Result<PathBuf>;

    /// All sources keyed by name.
    fn fetch_sources(&self) -> Result<BTreeMap<String, RepositorySource>>;
}

/// Inventory backed by the `puppet` and `r10k` commands.
#[derive(Debug, Clone)]
pub struct CommandInventory {
    settings: Settings,
    environment_root: Option<PathBuf>,
    display_document: Option<String>,
}

impl CommandInventory {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            environment_root: None,
            display_document: None,
        }
    }

    /// Use `root` instead of asking `puppet`.
    pub fn with_environment_root(mut self, root: PathBuf) -> Self {
        self.environment_root = Some(root);
        self
    }

    /// Parse `document` instead of running `r10k deploy display`.
    pub fn with_display_document(mut self, document: String) -> Self {
        self.display_document = Some(document);
        self
    }
}

impl InventoryProvider for CommandInventory {
    fn fetch_environment_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.environment_root {
            return Ok(root.clone());
        }
        let args = ["config", "print", "environmentpath", "--section", "master"];
        let output = run_captured(&self.settings.puppet, &args, self.settings.command_timeout)?;
        parse_environment_root(&output).map_err(|message| Error::InventoryFetch {
            command: format!("{} {}", self.settings.puppet.display(), args.join(" ")),
            message,
        })
    }

    fn fetch_sources(&self) -> Result<BTreeMap<String, RepositorySource>> {
        let command = format!("{} deploy display", self.settings.r10k.display());
        let output = match &self.display_document {
            Some(document) => document.clone(),
            None => run_captured(
                &self.settings.r10k,
                &["deploy", "display"],
                self.settings.command_timeout,
            )?,
        };
        parse_deploy_display(&output).map_err(|message| Error::InventoryFetch { command, message })
    }
}

/// Inventory whose data is already known.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    pub environment_root: PathBuf,
    pub sources: BTreeMap<String, RepositorySource>,
}

impl StaticInventory {
    pub fn new(environment_root: impl Into<PathBuf>) -> Self {
        Self {
            environment_root: environment_root.into(),
            sources: BTreeMap::new(),
        }
    }

    /// Add a source; builder style.
    pub fn with_source<I, S>(mut self, name: &str, base_dir: impl Into<PathBuf>, environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources.insert(
            name.to_string(),
            RepositorySource {
                name: name.to_string(),
                base_dir: base_dir.into(),
                environments: environments.into_iter().map(Into::into).collect(),
            },
        );
        self
    }
}

impl InventoryProvider for StaticInventory {
    fn fetch_environment_root(&self) -> Result<PathBuf> {
        Ok(self.environment_root.clone())
    }

    fn fetch_sources(&self) -> Result<BTreeMap<String, RepositorySource>> {
        Ok(self.sources.clone())
    }
}

/// Parse the output of `puppet config print environmentpath`.
///
/// The setting may be a `:`-separated search path; the first entry is the one
/// r10k deploys into.
pub fn parse_environment_root(output: &str) -> std::result::Result<PathBuf, String> {
    let first = output.trim().split(':').next().unwrap_or_default().trim();
    if first.is_empty() {
        return Err("empty environmentpath".to_string());
    }
    let root = PathBuf::from(first);
    if !root.is_absolute() {
        return Err(format!("environmentpath '{}' is not absolute", first));
    }
    Ok(root)
}

#[derive(Debug, Deserialize)]
struct DeployDisplay {
    #[serde(rename = ":sources")]
    sources: Vec<DisplaySource>,
}

#[derive(Debug, Deserialize)]
struct DisplaySource {
    #[serde(rename = ":name")]
    name: String,
    #[serde(rename = ":basedir")]
    basedir: String,
    #[serde(rename = ":environments", default)]
    environments: Option<Vec<String>>,
}

/// Parse the YAML emitted by `r10k deploy display`.
///
/// r10k prints Ruby symbols, so keys look like `:name` and some values carry
/// a leading `:` as well; those are stripped. The `:sources` key is required:
/// an empty document means r10k printed nothing usable.
pub fn parse_deploy_display(
    output: &str,
) -> std::result::Result<BTreeMap<String, RepositorySource>, String> {
    let output = output.trim();
    if output.is_empty() {
        return Err("empty output".to_string());
    }
    let display: DeployDisplay =
        serde_yaml::from_str(output).map_err(|e| format!("unparsable YAML: {}", e))?;

    let mut sources = BTreeMap::new();
    for raw in display.sources {
        let name = raw.name.trim().trim_matches(':').to_string();
        let base_dir = PathBuf::from(raw.basedir.trim().trim_matches(':'));
        if name.is_empty() {
            return Err("source with an empty name".to_string());
        }
        if !base_dir.is_absolute() {
            return Err(format!(
                "source '{}' has a non-absolute basedir '{}'",
                name,
                base_dir.display()
            ));
        }

        let mut environments = BTreeSet::new();
        for env in raw.environments.unwrap_or_default() {
            validate_environment_name(&env)
                .map_err(|reason| format!("source '{}': environment '{}' {}", name, env, reason))?;
            environments.insert(env);
        }

        let source = RepositorySource {
            name: name.clone(),
            base_dir,
            environments,
        };
        if sources.insert(name.clone(), source).is_some() {
            return Err(format!("duplicate source '{}'", name));
        }
    }
    Ok(sources)
}

/// Environment names become directory names; they must be one plain component.
fn validate_environment_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("is empty");
    }
    if name.contains('\0') {
        return Err("contains a NUL byte");
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(c)), None) if c == name => Ok(()),
        _ => Err("is not a single path component"),
    }
}
