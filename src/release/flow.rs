//! Branch choreography of a release as an explicit list of steps.
//!
//! A [GitFlowPlan] is chosen once per run from the checked-out branch, then
//! rendered into [Step]s that a [FlowRunner] executes in order. The runner
//! stops at the first failure and keeps the steps that completed.

use crate::config::BranchesConfig;
use crate::domain::BranchContext;
use crate::error::Result;
use crate::git::Repository;
use log::{error, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the release commit lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitFlowPlan {
    /// Maintenance branch or prerelease: commit and tag the current branch
    InPlace { branch: String },
    /// Commit on the development branch, merge it into main and tag main
    GitFlow { development: String, main: String },
}

/// Everything the release commit contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCommit {
    /// Files to write then stage, paths relative to the work tree
    pub files: Vec<(PathBuf, String)>,
    pub message: String,
    /// Tag to create, `None` for unversioned releases
    pub tag: Option<String>,
}

impl GitFlowPlan {
    /// Release in place when on a `v4`-style branch or cutting a prerelease.
    pub fn choose(
        current: &BranchContext,
        prerelease_tag: Option<&str>,
        branches: &BranchesConfig,
    ) -> Self {
        if prerelease_tag.is_some() || current.is_release_branch() {
            GitFlowPlan::InPlace {
                branch: current.name.clone(),
            }
        } else {
            GitFlowPlan::GitFlow {
                development: branches.development.clone(),
                main: branches.main.clone(),
            }
        }
    }

    pub fn steps(&self, commit: &ReleaseCommit) -> Vec<Step> {
        let mut steps = Vec::new();

        if let GitFlowPlan::GitFlow { development, .. } = self {
            steps.push(Step::Checkout(development.clone()));
        }

        steps.push(Step::Pull);
        for (path, contents) in &commit.files {
            steps.push(Step::WriteFile {
                path: path.clone(),
                contents: contents.clone(),
            });
        }
        steps.push(Step::Add(
            commit.files.iter().map(|(path, _)| path.clone()).collect(),
        ));
        steps.push(Step::Commit(commit.message.clone()));
        steps.push(Step::Push);

        if let GitFlowPlan::GitFlow { development, main } = self {
            steps.push(Step::Checkout(main.clone()));
            steps.push(Step::Pull);
            steps.push(Step::Merge {
                from: development.clone(),
                into: main.clone(),
            });
            steps.push(Step::Push);
        }

        if let Some(tag) = &commit.tag {
            steps.push(Step::Tag(tag.clone()));
            steps.push(Step::PushTag(tag.clone()));
        }

        if let GitFlowPlan::GitFlow { development, .. } = self {
            steps.push(Step::Checkout(development.clone()));
        }

        steps
    }
}

/// A single release action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Checkout(String),
    Pull,
    WriteFile { path: PathBuf, contents: String },
    Add(Vec<PathBuf>),
    Commit(String),
    Push,
    Merge { from: String, into: String },
    Tag(String),
    PushTag(String),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Checkout(branch) => write!(f, "checkout {}", branch),
            Step::Pull => write!(f, "pull"),
            Step::WriteFile { path, .. } => write!(f, "write {}", path.display()),
            Step::Add(paths) => {
                let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                write!(f, "add {}", names.join(" "))
            }
            Step::Commit(message) => write!(f, "commit '{}'", message),
            Step::Push => write!(f, "push"),
            Step::Merge { from, into } => write!(f, "merge {} into {}", from, into),
            Step::Tag(tag) => write!(f, "tag {}", tag),
            Step::PushTag(tag) => write!(f, "push tag {}", tag),
        }
    }
}

/// Executes steps against a repository rooted at `root`.
pub struct FlowRunner<'a, R: Repository> {
    repo: &'a R,
    root: PathBuf,
    completed: Vec<Step>,
}

impl<'a, R: Repository> FlowRunner<'a, R> {
    pub fn new(repo: &'a R, root: impl Into<PathBuf>) -> Self {
        FlowRunner {
            repo,
            root: root.into(),
            completed: Vec::new(),
        }
    }

    /// Steps that finished, in execution order
    pub fn completed(&self) -> &[Step] {
        &self.completed
    }

    /// Run `steps` in order, halting on the first failure.
    ///
    /// Nothing is rolled back: the work tree is assumed disposable.
    pub fn run(&mut self, steps: Vec<Step>) -> Result<()> {
        for step in steps {
            info!("{}", step);
            if let Err(e) = self.execute(&step) {
                error!(
                    "Release stopped at '{}' after {} completed step(s): {}",
                    step,
                    self.completed.len(),
                    e
                );
                for done in &self.completed {
                    error!("  done: {}", done);
                }
                return Err(e);
            }
            self.completed.push(step);
        }
        Ok(())
    }

    fn execute(&self, step: &Step) -> Result<()> {
        match step {
            Step::Checkout(branch) => self.repo.checkout(branch),
            Step::Pull => self.repo.pull(),
            Step::WriteFile { path, contents } => {
                fs::write(self.root.join(path), contents)?;
                Ok(())
            }
            Step::Add(paths) => {
                let paths: Vec<&Path> = paths.iter().map(PathBuf::as_path).collect();
                self.repo.add(&paths)
            }
            Step::Commit(message) => self.repo.commit(message),
            Step::Push => self.repo.push(),
            Step::Merge { from, into } => self.repo.merge(from, into),
            Step::Tag(tag) => self.repo.create_tag(tag),
            Step::PushTag(tag) => self.repo.push_tag(tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use crate::git::{GitCall, MockRepository};

    fn commit(tag: Option<&str>) -> ReleaseCommit {
        ReleaseCommit {
            files: vec![(PathBuf::from("CHANGELOG.md"), "# Changelog\n".to_string())],
            message: "chore(release): 1.2.4".to_string(),
            tag: tag.map(str::to_string),
        }
    }

    #[test]
    fn test_plan_for_development_branch() {
        let plan = GitFlowPlan::choose(
            &BranchContext::new("devel"),
            None,
            &BranchesConfig::default(),
        );
        assert_eq!(
            plan,
            GitFlowPlan::GitFlow {
                development: "devel".to_string(),
                main: "master".to_string()
            }
        );
    }

    #[test]
    fn test_plan_for_release_branch_or_prerelease() {
        let branches = BranchesConfig::default();
        assert_eq!(
            GitFlowPlan::choose(&BranchContext::new("v4"), None, &branches),
            GitFlowPlan::InPlace {
                branch: "v4".to_string()
            }
        );
        assert_eq!(
            GitFlowPlan::choose(&BranchContext::new("devel"), Some("beta"), &branches),
            GitFlowPlan::InPlace {
                branch: "devel".to_string()
            }
        );
    }

    #[test]
    fn test_in_place_steps() {
        let plan = GitFlowPlan::InPlace {
            branch: "v4".to_string(),
        };
        let steps = plan.steps(&commit(Some("v4.1.0")));
        assert_eq!(steps.first(), Some(&Step::Pull));
        assert!(!steps.iter().any(|s| matches!(s, Step::Checkout(_) | Step::Merge { .. })));
        assert_eq!(steps.last(), Some(&Step::PushTag("v4.1.0".to_string())));
    }

    #[test]
    fn test_git_flow_steps_without_tag() {
        let plan = GitFlowPlan::GitFlow {
            development: "devel".to_string(),
            main: "master".to_string(),
        };
        let steps = plan.steps(&commit(None));
        let rendered: Vec<String> = steps.iter().map(Step::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "checkout devel",
                "pull",
                "write CHANGELOG.md",
                "add CHANGELOG.md",
                "commit 'chore(release): 1.2.4'",
                "push",
                "checkout master",
                "pull",
                "merge devel into master",
                "push",
                "checkout devel",
            ]
        );
    }

    #[test]
    fn test_runner_writes_files_and_records_steps() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MockRepository::new("v4");
        let plan = GitFlowPlan::InPlace {
            branch: "v4".to_string(),
        };

        let mut runner = FlowRunner::new(&repo, dir.path());
        runner.run(plan.steps(&commit(Some("v4.1.0")))).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap(),
            "# Changelog\n"
        );
        assert_eq!(runner.completed().len(), 7);
        assert!(repo.calls().contains(&GitCall::CreateTag("v4.1.0".to_string())));
    }

    #[test]
    fn test_runner_halts_on_pull_failure() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MockRepository::new("feature/login").with_failing_pull();
        let plan = GitFlowPlan::GitFlow {
            development: "devel".to_string(),
            main: "master".to_string(),
        };

        let mut runner = FlowRunner::new(&repo, dir.path());
        let err = runner.run(plan.steps(&commit(None))).unwrap_err();

        assert!(matches!(err, ReleaseError::GitPull(_)));
        assert_eq!(runner.completed(), &[Step::Checkout("devel".to_string())]);
        assert!(!dir.path().join("CHANGELOG.md").exists());
    }
}
