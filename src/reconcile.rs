//! Reconciliation driver
//!
//! A pass runs four steps in order:
//!
//! 1.  **Inventory**: fetch the environment root and r10k sources once into a
//!     [`Context`].
//! 2.  **Bootstrap**: create the environments that exist in some repository
//!     but not in the control repository.
//! 3.  **Plan**: compute the cross-repository links still missing for the full
//!     set of environments.
//! 4.  **Apply**: make the filesystem match the plan.
//!
//! Fatal errors abort the remaining steps without rolling back; every step is
//! idempotent, so running again is the recovery path. Per-entry problems
//! (conflicts, missing baselines) are collected in the [`Summary`].

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::applier::{apply_links, ApplyReport};
use crate::bootstrap::{ensure_environments, BootstrapReport};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::inventory::{Inventory, InventoryProvider, RepositorySource};
use crate::planner::{plan_links, LinkPlan};

/// Settings plus the inventory fetched for this pass.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub inventory: Inventory,
}

impl Context {
    /// Fetch the inventory once and check that the control repository is in it.
    pub fn load(settings: Settings, provider: &dyn InventoryProvider) -> Result<Self> {
        let inventory = Inventory::fetch(provider)?;
        let context = Self {
            settings,
            inventory,
        };
        let control = context.control()?;
        if control.base_dir != context.inventory.environment_root {
            warn!(
                "environment root '{}' differs from control repository basedir '{}'",
                context.inventory.environment_root.display(),
                control.base_dir.display()
            );
        }
        Ok(context)
    }

    /// The control repository source.
    pub fn control(&self) -> Result<&RepositorySource> {
        let name = &self.settings.control_repo_name;
        self.inventory.sources.get(name).ok_or_else(|| Error::Configuration {
            message: format!("control repository '{}' not found in r10k sources", name),
            hint: Some(format!(
                "Known sources: {}",
                self.inventory
                    .sources
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        })
    }

    /// Every environment known to any repository.
    pub fn all_environments(&self) -> BTreeSet<String> {
        self.inventory.all_environments()
    }

    /// Environments known somewhere but not deployed by the control repository.
    pub fn needed_environments(&self) -> Result<BTreeSet<String>> {
        let control = self.control()?;
        Ok(self
            .all_environments()
            .difference(&control.environments)
            .cloned()
            .collect())
    }

    /// Plan links for every known environment.
    pub fn plan(&self) -> Result<LinkPlan> {
        plan_links(
            self.control()?,
            self.inventory.sources.values(),
            &self.all_environments(),
            &self.settings.baseline_environment,
        )
    }
}

/// Result of a full pass.
#[derive(Debug, Default)]
pub struct Summary {
    /// Environments that needed bootstrapping.
    pub needed: BTreeSet<String>,
    pub bootstrap: BootstrapReport,
    pub plan: LinkPlan,
    pub apply: ApplyReport,
}

impl Summary {
    /// Per-entry errors: missing baselines followed by apply conflicts.
    pub fn problems(&self) -> Vec<String> {
        self.plan
            .missing
            .iter()
            .map(|m| Error::from(m.clone()).to_string())
            .chain(self.apply.conflicts.iter().map(|e| e.to_string()))
            .collect()
    }

    /// Whether the pass should exit non-zero.
    pub fn has_problems(&self) -> bool {
        !self.plan.missing.is_empty() || self.apply.has_conflicts()
    }
}

/// Run bootstrap, plan and apply against an already loaded context.
pub fn run(context: &Context) -> Result<Summary> {
    let needed = context.needed_environments()?;
    debug!("environments needing bootstrap: {:?}", needed);

    let bootstrap = ensure_environments(
        &context.inventory.environment_root,
        &context.settings.baseline_environment,
        &needed,
    )?;

    let plan = context.plan()?;
    debug!("links to create: {:?}", plan.links);

    let apply = apply_links(&plan)?;

    Ok(Summary {
        needed,
        bootstrap,
        plan,
        apply,
    })
}
