//! Build causes: why a build exists.

use serde::{Deserialize, Serialize};

use crate::{BuildNumber, GitBranch};

/// The provenance record attached to a build.
///
/// A build carries exactly one cause. `Null` is the default and is replaced
/// wholesale when a real cause is attached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cause {
    /// No cause recorded yet.
    #[default]
    Null,
    /// Built for a branch without any recognisable trigger.
    Unknown { branch: GitBranch, sha: String },
    /// Started by a user.
    Manual {
        branch: GitBranch,
        sha: String,
        user_id: String,
    },
    /// Started by a push or pull request on the source-control host.
    SourceControl {
        branch: GitBranch,
        sha: String,
        pusher: Option<String>,
    },
}

impl Cause {
    pub fn is_null(&self) -> bool {
        matches!(self, Cause::Null)
    }

    pub fn branch(&self) -> Option<&GitBranch> {
        match self {
            Cause::Null => None,
            Cause::Unknown { branch, .. }
            | Cause::Manual { branch, .. }
            | Cause::SourceControl { branch, .. } => Some(branch),
        }
    }

    pub fn sha(&self) -> Option<&str> {
        match self {
            Cause::Null => None,
            Cause::Unknown { sha, .. }
            | Cause::Manual { sha, .. }
            | Cause::SourceControl { sha, .. } => Some(sha),
        }
    }

    /// One-line description for build history listings.
    pub fn short_description(&self) -> String {
        match self {
            Cause::Null => "No cause recorded".to_string(),
            Cause::Unknown { .. } => "Unknown cause".to_string(),
            Cause::Manual { user_id, .. } => format!("Started by user {}", user_id),
            Cause::SourceControl {
                pusher: Some(pusher),
                ..
            } => format!("Started by push from {}", pusher),
            Cause::SourceControl { pusher: None, .. } => "Started by source control".to_string(),
        }
    }
}

/// Trigger markers the host build system puts on a build.
///
/// A build may carry several of these at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerCause {
    /// Started from the UI or API by a user.
    UserId { user_id: String },
    /// Started by the completion of another build.
    Upstream { project: String, number: BuildNumber },
    /// Started on a schedule.
    Timer,
    /// Started by a remote trigger.
    Remote { address: String },
}

impl TriggerCause {
    /// The user id when this is a user-initiated trigger.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            TriggerCause::UserId { user_id } => Some(user_id),
            _ => None,
        }
    }
}
