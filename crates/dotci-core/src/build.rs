//! Collaborator traits for the host build system.
//!
//! The core never schedules builds or talks to the source-control host
//! itself. Everything it needs from the outside goes through these traits.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{BuildNumber, Cause, Combination, GitBranch, GitSshUrl, Result, TriggerCause};

/// Resolves a branch name to its current commit.
#[async_trait]
pub trait BranchResolver: Send + Sync {
    async fn resolve_sha_for_branch(&self, branch: &GitBranch) -> Result<String>;
}

/// A child build produced by one axis of a fanned-out parent build.
#[async_trait]
pub trait SubBuild: Send + Sync {
    fn number(&self) -> BuildNumber;

    fn combination(&self) -> &Combination;

    /// Remove the sub-build and everything it stored.
    async fn delete(&self) -> Result<()>;
}

/// One axis project under a parent build's container.
#[async_trait]
pub trait SubProject: Send + Sync {
    fn name(&self) -> &str;

    /// The run of this axis for the given build number, if one was produced.
    async fn build_by_number(&self, number: BuildNumber) -> Result<Option<Arc<dyn SubBuild>>>;
}

/// A parent build as exposed by the host build system.
#[async_trait]
pub trait DynamicBuild: Send + Sync {
    fn number(&self) -> BuildNumber;

    /// Repository URL of the project this build belongs to.
    fn repository_url(&self) -> &str;

    fn env_var(&self, key: &str) -> Option<String>;

    /// Trigger markers the host put on this build.
    fn trigger_causes(&self) -> &[TriggerCause];

    /// The attached cause; `Cause::Null` when none has been attached.
    fn cause(&self) -> &Cause;

    /// Replace the attached cause.
    fn attach_cause(&mut self, cause: Cause);

    /// Every axis project in this build's parent container.
    fn sub_projects(&self) -> Vec<Arc<dyn SubProject>>;

    async fn delete(&self) -> Result<()>;

    fn sha(&self) -> Option<&str> {
        self.cause().sha()
    }
}

/// Environment variables exported to every build: `SHA` and `GIT_URL`.
pub fn dotci_env_vars(build: &dyn DynamicBuild) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if let Some(sha) = build.sha() {
        vars.insert("SHA".to_string(), sha.to_string());
    }
    let git_url = GitSshUrl::new(build.repository_url())?;
    vars.insert("GIT_URL".to_string(), git_url.url().to_string());
    Ok(vars)
}
