//! Cascading deletion of a fanned-out build.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::{DynamicBuild, Error, Result, SubBuild};

/// Deletes a parent build together with the sub-builds it fanned out into.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubBuildLifecycle;

impl SubBuildLifecycle {
    pub fn new() -> Self {
        Self
    }

    /// Every sub-build sharing the parent's number, in sub-project order.
    ///
    /// Axes without a run for this number are skipped.
    pub async fn exact_runs(&self, build: &dyn DynamicBuild) -> Result<Vec<Arc<dyn SubBuild>>> {
        let number = build.number();
        let mut runs = Vec::new();
        for project in build.sub_projects() {
            match project.build_by_number(number).await? {
                Some(run) => runs.push(run),
                None => debug!(project = %project.name(), build = %number, "No run for this build"),
            }
        }
        Ok(runs)
    }

    /// Delete every child run, then the parent.
    ///
    /// The first failure stops the cascade. Children already deleted stay
    /// deleted; later children and the parent are untouched. The returned
    /// `Error::PartialDeletion` names both sets.
    pub async fn delete_build(&self, build: &dyn DynamicBuild) -> Result<()> {
        let number = build.number();
        let runs = self.exact_runs(build).await?;
        info!(build = %number, children = runs.len(), "Deleting build");

        let mut deleted = Vec::with_capacity(runs.len());
        for run in &runs {
            let name = format!("{} #{}", run.combination(), run.number());
            if let Err(e) = run.delete().await {
                error!(build = %number, child = %name, error = %e, "Child deletion failed, stopping");
                return Err(Error::PartialDeletion {
                    number,
                    deleted,
                    failed: name,
                    source: Box::new(e),
                });
            }
            debug!(build = %number, child = %name, "Deleted child build");
            deleted.push(name);
        }

        if let Err(e) = build.delete().await {
            error!(build = %number, error = %e, "Parent deletion failed after children were removed");
            return Err(Error::PartialDeletion {
                number,
                deleted,
                failed: format!("parent #{}", number),
                source: Box::new(e),
            });
        }

        info!(build = %number, "Build deleted");
        Ok(())
    }
}
