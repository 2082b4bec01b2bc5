//! Change logs attached to a build.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single commit in a build's change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub commit_id: String,
    pub author: String,
    pub message: String,
    /// Link to the commit on the source-control host.
    pub url: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub affected_paths: Vec<String>,
}

impl LogEntry {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// The commits that went into a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLogSet {
    entries: Vec<LogEntry>,
}

impl ChangeLogSet {
    pub fn new(entries: Vec<LogEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }
}

impl FromIterator<LogEntry> for ChangeLogSet {
    fn from_iter<I: IntoIterator<Item = LogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for ChangeLogSet {
    type Item = LogEntry;
    type IntoIter = std::vec::IntoIter<LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeLogSet {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
