//! In-memory collaborators for unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{
    BranchResolver, BuildNumber, Cause, Combination, DynamicBuild, Error, GitBranch, Result,
    SubBuild, SubProject, TriggerCause,
};

/// Shared record of deletions, in the order they happened.
pub(crate) type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
pub(crate) struct MockResolver {
    shas: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, branch: &str, sha: &str) -> Self {
        self.shas.insert(branch.to_string(), sha.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BranchResolver for MockResolver {
    async fn resolve_sha_for_branch(&self, branch: &GitBranch) -> Result<String> {
        self.calls.lock().unwrap().push(branch.to_string());
        self.shas
            .get(branch.as_str())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("branch {}", branch)))
    }
}

pub(crate) struct MockSubBuild {
    pub name: String,
    pub number: BuildNumber,
    pub combination: Combination,
    pub journal: Journal,
    pub fails: bool,
}

#[async_trait]
impl SubBuild for MockSubBuild {
    fn number(&self) -> BuildNumber {
        self.number
    }

    fn combination(&self) -> &Combination {
        &self.combination
    }

    async fn delete(&self) -> Result<()> {
        if self.fails {
            return Err(Error::Internal(format!("disk error deleting {}", self.name)));
        }
        self.journal.lock().unwrap().push(self.name.clone());
        Ok(())
    }
}

pub(crate) struct MockSubProject {
    pub name: String,
    pub builds: HashMap<BuildNumber, Arc<MockSubBuild>>,
    pub lookup_fails: bool,
}

impl MockSubProject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            builds: HashMap::new(),
            lookup_fails: false,
        }
    }

    pub fn with_build(mut self, number: u64, journal: &Journal, fails: bool) -> Self {
        let number = BuildNumber::new(number);
        self.builds.insert(
            number,
            Arc::new(MockSubBuild {
                name: format!("{}#{}", self.name, number),
                number,
                combination: Combination::new().with("script", self.name.clone()),
                journal: journal.clone(),
                fails,
            }),
        );
        self
    }
}

#[async_trait]
impl SubProject for MockSubProject {
    fn name(&self) -> &str {
        &self.name
    }

    async fn build_by_number(&self, number: BuildNumber) -> Result<Option<Arc<dyn SubBuild>>> {
        if self.lookup_fails {
            return Err(Error::Internal(format!("cannot read {}", self.name)));
        }
        Ok(self
            .builds
            .get(&number)
            .map(|b| b.clone() as Arc<dyn SubBuild>))
    }
}

pub(crate) struct MockBuild {
    pub number: BuildNumber,
    pub repository_url: String,
    pub env: HashMap<String, String>,
    pub triggers: Vec<TriggerCause>,
    pub cause: Cause,
    pub sub_projects: Vec<Arc<dyn SubProject>>,
    pub journal: Journal,
    pub fails: bool,
}

impl MockBuild {
    pub fn new(number: u64) -> Self {
        Self {
            number: BuildNumber::new(number),
            repository_url: "https://github.com/groupon/DotCi".to_string(),
            env: HashMap::new(),
            triggers: Vec::new(),
            cause: Cause::Null,
            sub_projects: Vec::new(),
            journal: Journal::default(),
            fails: false,
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = journal.clone();
        self
    }

    pub fn with_trigger(mut self, trigger: TriggerCause) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_sub_project(mut self, project: MockSubProject) -> Self {
        self.sub_projects.push(Arc::new(project));
        self
    }

    pub fn deleted(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }
}

#[async_trait]
impl DynamicBuild for MockBuild {
    fn number(&self) -> BuildNumber {
        self.number
    }

    fn repository_url(&self) -> &str {
        &self.repository_url
    }

    fn env_var(&self, key: &str) -> Option<String> {
        self.env.get(key).cloned()
    }

    fn trigger_causes(&self) -> &[TriggerCause] {
        &self.triggers
    }

    fn cause(&self) -> &Cause {
        &self.cause
    }

    fn attach_cause(&mut self, cause: Cause) {
        self.cause = cause;
    }

    fn sub_projects(&self) -> Vec<Arc<dyn SubProject>> {
        self.sub_projects.clone()
    }

    async fn delete(&self) -> Result<()> {
        if self.fails {
            return Err(Error::Internal("disk error deleting parent".to_string()));
        }
        self.journal.lock().unwrap().push(format!("parent#{}", self.number));
        Ok(())
    }
}
