//! Release creation: version bump, changelog header and git choreography.

pub mod flow;

pub use flow::{FlowRunner, GitFlowPlan, ReleaseCommit, Step};

use crate::config::Config;
use crate::domain::{next_version, BranchContext, ChangelogDocument, PackageManifest, ReleaseDescriptor};
use crate::error::Result;
use crate::git::Repository;
use log::info;
use semver::Version;
use std::path::PathBuf;

/// Result of a successful release run
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseOutcome {
    /// The new version, `None` for date-only releases
    pub version: Option<Version>,
    pub tag: Option<String>,
    pub plan: GitFlowPlan,
    pub steps: Vec<Step>,
}

/// Prepares and commits a release in the repository rooted at `root`.
pub struct ReleaseCreator<'a, R: Repository> {
    repo: &'a R,
    config: &'a Config,
    root: PathBuf,
    today: String,
}

impl<'a, R: Repository> ReleaseCreator<'a, R> {
    pub fn new(repo: &'a R, config: &'a Config, root: impl Into<PathBuf>) -> Self {
        ReleaseCreator {
            repo,
            config,
            root: root.into(),
            today: chrono::Local::now().format("%Y-%m-%d").to_string(),
        }
    }

    /// Override the release date (`YYYY-MM-DD`)
    pub fn with_date(mut self, today: impl Into<String>) -> Self {
        self.today = today.into();
        self
    }

    /// Run the whole release.
    ///
    /// Changelog and manifest are read before any git operation, so a
    /// missing or malformed document aborts the run without touching the
    /// repository.
    pub fn perform(&self, descriptor: &ReleaseDescriptor) -> Result<ReleaseOutcome> {
        let files = &self.config.files;
        let mut commit_files = Vec::new();

        let mut changelog = ChangelogDocument::load(&self.root.join(&files.changelog))?;

        let version = if descriptor.with_version {
            let mut manifest = PackageManifest::load(&self.root.join(&files.manifest))?;
            let current = manifest.version()?;
            let next = next_version(
                &current,
                descriptor.release_type,
                descriptor.prerelease_tag.as_deref(),
            )?;
            info!("Bumping {} from {} to {}", manifest.name()?, current, next);

            manifest.set_version(&next);
            commit_files.push((files.manifest.clone(), manifest.render()?));
            Some(next)
        } else {
            None
        };

        let version_label = version.as_ref().map(Version::to_string);
        changelog.insert_release_header(version_label.as_deref(), &self.today)?;
        commit_files.insert(0, (files.changelog.clone(), changelog.render()));

        let commit = ReleaseCommit {
            files: commit_files,
            message: format!(
                "chore(release): {}",
                version_label.as_deref().unwrap_or(&self.today)
            ),
            tag: version_label.as_ref().map(|v| format!("v{}", v)),
        };

        let branch = BranchContext::new(self.repo.current_branch()?);
        let plan = GitFlowPlan::choose(
            &branch,
            descriptor.prerelease_tag.as_deref(),
            &self.config.branches,
        );
        info!("Releasing from '{}' with {:?}", branch.name, plan);

        let mut runner = FlowRunner::new(self.repo, &self.root);
        runner.run(plan.steps(&commit))?;

        Ok(ReleaseOutcome {
            version,
            tag: commit.tag,
            plan,
            steps: runner.completed().to_vec(),
        })
    }
}
