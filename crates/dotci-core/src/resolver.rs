//! Attaches a cause to builds the source-control hook did not start.

use std::sync::Arc;
use tracing::{debug, info};

use crate::{BranchResolver, Cause, DynamicBuild, Error, GitBranch, Result, TriggerCause};

/// Environment variable holding the branch a build runs against.
pub const BRANCH_VAR: &str = "BRANCH";

/// Decides which cause a build gets and attaches it.
pub struct CauseResolver {
    branches: Arc<dyn BranchResolver>,
}

impl CauseResolver {
    pub fn new(branches: Arc<dyn BranchResolver>) -> Self {
        Self { branches }
    }

    /// Attach a cause to a freshly created build.
    ///
    /// Two independent checks, in order:
    /// 1. A user trigger attaches a `Manual` cause.
    /// 2. A build still without a cause gets an `Unknown` cause.
    ///
    /// On error the build keeps whatever cause it had.
    pub async fn resolve(&self, build: &mut dyn DynamicBuild) -> Result<()> {
        let user_id = build
            .trigger_causes()
            .iter()
            .find_map(TriggerCause::user_id)
            .map(str::to_string);

        if let Some(user_id) = user_id {
            let (branch, sha) = self.resolve_branch(&*build).await?;
            info!(build = %build.number(), %branch, %sha, user = %user_id, "Attaching manual cause");
            build.attach_cause(Cause::Manual {
                branch,
                sha,
                user_id,
            });
        }

        if build.cause().is_null() {
            let (branch, sha) = self.resolve_branch(&*build).await?;
            info!(build = %build.number(), %branch, %sha, "Attaching unknown cause");
            build.attach_cause(Cause::Unknown { branch, sha });
        } else {
            debug!(build = %build.number(), cause = %build.cause().short_description(), "Build already has a cause");
        }

        Ok(())
    }

    async fn resolve_branch(&self, build: &dyn DynamicBuild) -> Result<(GitBranch, String)> {
        let branch = build
            .env_var(BRANCH_VAR)
            .filter(|b| !b.trim().is_empty())
            .map(GitBranch::new)
            .ok_or_else(|| Error::ResolutionFailure {
                branch: String::new(),
                message: format!("{} is not set in the build environment", BRANCH_VAR),
            })?;

        let sha = self
            .branches
            .resolve_sha_for_branch(&branch)
            .await
            .map_err(|e| match e {
                Error::ResolutionFailure { .. } => e,
                other => Error::ResolutionFailure {
                    branch: branch.to_string(),
                    message: other.to_string(),
                },
            })?;

        Ok((branch, sha))
    }

    /// The cause attached to a build, `Cause::Null` when there is none.
    pub fn build_cause(build: &dyn DynamicBuild) -> &Cause {
        build.cause()
    }
}
