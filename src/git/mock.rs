use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::path::Path;

/// A git operation as seen by [MockRepository].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Checkout(String),
    Pull(String),
    Add(Vec<String>),
    Commit(String),
    Push(String),
    Merge { from: String, into: String },
    CreateTag(String),
    PushTag(String),
}

/// Mock repository for testing without actual git operations.
///
/// Tracks the checked-out branch and records each call together with the
/// branch it ran on.
pub struct MockRepository {
    current: RefCell<String>,
    calls: RefCell<Vec<GitCall>>,
    fail_pull: bool,
}

impl MockRepository {
    /// Create a mock checked out on `branch`
    pub fn new(branch: impl Into<String>) -> Self {
        MockRepository {
            current: RefCell::new(branch.into()),
            calls: RefCell::new(Vec::new()),
            fail_pull: false,
        }
    }

    /// Make every pull fail, as when the remote is unreachable
    pub fn with_failing_pull(mut self) -> Self {
        self.fail_pull = true;
        self
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.borrow().clone()
    }

    /// Branches switched to, in order, skipping no-op checkouts
    pub fn checkouts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                GitCall::Checkout(branch) => Some(branch.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn branch(&self) -> String {
        self.current.borrow().clone()
    }

    fn record(&self, call: GitCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.branch())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        if *self.current.borrow() != branch {
            *self.current.borrow_mut() = branch.to_string();
            self.record(GitCall::Checkout(branch.to_string()));
        }
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        if self.fail_pull {
            return Err(ReleaseError::pull("Cannot pull from remote"));
        }
        self.record(GitCall::Pull(self.branch()));
        Ok(())
    }

    fn add(&self, paths: &[&Path]) -> Result<()> {
        let files = paths.iter().map(|p| p.display().to_string()).collect();
        self.record(GitCall::Add(files));
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record(GitCall::Commit(message.to_string()));
        Ok(())
    }

    fn push(&self) -> Result<()> {
        self.record(GitCall::Push(self.branch()));
        Ok(())
    }

    fn merge(&self, from: &str, into: &str) -> Result<()> {
        self.record(GitCall::Merge {
            from: from.to_string(),
            into: into.to_string(),
        });
        Ok(())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        self.record(GitCall::CreateTag(name.to_string()));
        Ok(())
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        self.record(GitCall::PushTag(name.to_string()));
        Ok(())
    }
}
