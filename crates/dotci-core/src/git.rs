//! Git value objects: branches and repository URLs.

use derive_more::Display;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

use crate::{Error, Result};

// refs/pull/123/head, refs/pull/123/merge, pull/123
static PULL_REQUEST_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:refs/)?pull/(\d+)(?:/.*)?$").unwrap());

/// A branch name as seen by the build, normalised without `refs/heads/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(from = "String", into = "String")]
#[display("{name}")]
pub struct GitBranch {
    name: String,
}

impl GitBranch {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = match name.strip_prefix("refs/heads/") {
            Some(short) => short.to_string(),
            None => name,
        };
        Self { name }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_pull_request(&self) -> bool {
        PULL_REQUEST_REF.is_match(&self.name)
    }

    /// The pull request number for `pull/<n>` style refs.
    pub fn pull_request_number(&self) -> Option<u64> {
        PULL_REQUEST_REF
            .captures(&self.name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

impl From<&str> for GitBranch {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for GitBranch {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<GitBranch> for String {
    fn from(branch: GitBranch) -> Self {
        branch.name
    }
}

/// SSH clone form of a repository URL (`git@host:owner/repo.git`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[display("{url}")]
pub struct GitSshUrl {
    url: String,
}

impl GitSshUrl {
    /// Convert an `https://`, `ssh://` or scp-style repository URL.
    pub fn new(repository_url: &str) -> Result<Self> {
        let trimmed = repository_url.trim();

        // scp-style URLs are already in the right shape
        if let Some(rest) = trimmed.strip_prefix("git@") {
            let (host, path) = rest.split_once(':').ok_or_else(|| {
                Error::InvalidInput(format!("malformed ssh repository url: {}", repository_url))
            })?;
            return Self::from_parts(repository_url, host, path);
        }

        let parsed = Url::parse(trimmed).map_err(|e| {
            Error::InvalidInput(format!("invalid repository url {}: {}", repository_url, e))
        })?;
        let host = parsed.host_str().ok_or_else(|| {
            Error::InvalidInput(format!("repository url has no host: {}", repository_url))
        })?;
        Self::from_parts(repository_url, host, parsed.path())
    }

    fn from_parts(original: &str, host: &str, path: &str) -> Result<Self> {
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "repository url must name an owner and a repository: {}",
                original
            )));
        }

        Ok(Self {
            url: format!("git@{}:{}.git", host, segments.join("/")),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_strips_heads_prefix() {
        assert_eq!(GitBranch::new("refs/heads/main").as_str(), "main");
        assert_eq!(GitBranch::new("feature/x").as_str(), "feature/x");
    }

    #[test]
    fn test_deserialized_branch_is_normalised() {
        let branch: GitBranch = serde_json::from_str("\"refs/heads/main\"").unwrap();
        assert_eq!(branch.as_str(), "main");
        assert_eq!(branch, GitBranch::new("main"));
        assert_eq!(serde_json::to_string(&branch).unwrap(), "\"main\"");
    }

    #[test]
    fn test_pull_request_branches() {
        let pr = GitBranch::new("refs/pull/42/head");
        assert!(pr.is_pull_request());
        assert_eq!(pr.pull_request_number(), Some(42));

        assert_eq!(GitBranch::new("pull/7").pull_request_number(), Some(7));

        let plain = GitBranch::new("main");
        assert!(!plain.is_pull_request());
        assert_eq!(plain.pull_request_number(), None);
    }

    #[test]
    fn test_https_to_ssh() {
        let url = GitSshUrl::new("https://github.com/groupon/DotCi").unwrap();
        assert_eq!(url.url(), "git@github.com:groupon/DotCi.git");

        let url = GitSshUrl::new("https://github.com/groupon/DotCi.git/").unwrap();
        assert_eq!(url.url(), "git@github.com:groupon/DotCi.git");
    }

    #[test]
    fn test_ssh_forms_pass_through() {
        let url = GitSshUrl::new("git@github.com:groupon/DotCi.git").unwrap();
        assert_eq!(url.url(), "git@github.com:groupon/DotCi.git");

        let url = GitSshUrl::new("ssh://git@ghe.example.com/team/repo.git").unwrap();
        assert_eq!(url.url(), "git@ghe.example.com:team/repo.git");
    }

    #[test]
    fn test_invalid_urls() {
        assert!(matches!(
            GitSshUrl::new("not a url"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            GitSshUrl::new("https://github.com/"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            GitSshUrl::new("git@github.com"),
            Err(Error::InvalidInput(_))
        ));
    }
}
