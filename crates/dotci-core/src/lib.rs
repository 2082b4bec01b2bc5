//! Core domain types and traits for DotCi builds.
//!
//! This crate contains:
//! - Build causes and the resolver that attaches them
//! - Collaborator traits for the host build system
//! - Cascading deletion of fanned-out builds
//! - Combination (axis) classification
//! - Git value objects and change logs
//! - Access token encryption

pub mod build;
pub mod cause;
pub mod changelog;
pub mod combination;
pub mod error;
pub mod git;
pub mod id;
pub mod lifecycle;
pub mod resolver;
pub mod secret;

#[cfg(test)]
pub(crate) mod testing;

pub use build::{BranchResolver, DynamicBuild, SubBuild, SubProject, dotci_env_vars};
pub use cause::{Cause, TriggerCause};
pub use changelog::{ChangeLogSet, LogEntry};
pub use combination::{Combination, main_run_combinations, post_build_combination};
pub use error::{Error, Result};
pub use git::{GitBranch, GitSshUrl};
pub use id::BuildNumber;
pub use lifecycle::SubBuildLifecycle;
pub use resolver::CauseResolver;
pub use secret::TokenCipher;
