use crate::error::{ReleaseError, Result};
use git2::build::CheckoutBuilder;
use git2::{BranchType, Cred, CredentialType, RemoteCallbacks, Repository as Git2Repo};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Work tree root of the repository containing `start`, or `start` itself
/// outside of any repository.
///
/// Every project file (changelog, manifest, README, coverage report) is
/// resolved against this root.
pub fn project_root(start: &Path) -> PathBuf {
    match Git2Repo::discover(start) {
        Ok(repo) => repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| start.to_path_buf()),
        Err(e) => {
            debug!("{} is not inside a git work tree: {}", start.display(), e.message());
            start.to_path_buf()
        }
    }
}

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    remote: String,
}

impl Git2Repository {
    /// Open or discover a git repository, pushing to and pulling from `remote`
    pub fn open<P: AsRef<Path>>(path: P, remote: impl Into<String>) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository {
            repo,
            remote: remote.into(),
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo, remote: impl Into<String>) -> Self {
        Git2Repository {
            repo,
            remote: remote.into(),
        }
    }

    /// Credentials: SSH keys from ~/.ssh, then the SSH agent, then the
    /// configured credential helper for HTTPS remotes.
    fn remote_callbacks(&self) -> Result<RemoteCallbacks<'static>> {
        let config = self.repo.config()?;
        let mut callbacks = RemoteCallbacks::new();

        callbacks.credentials(move |url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");

            if allowed_types.contains(CredentialType::SSH_KEY) {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = Path::new(&home).join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }

                if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }

            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Ok(cred) = Cred::credential_helper(&config, url, username_from_url) {
                    return Ok(cred);
                }
            }

            Cred::default()
        });

        Ok(callbacks)
    }

    fn push_refspec(&self, refspec: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(&self.remote)?;

        let mut callbacks = self.remote_callbacks()?;
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => {
                warn!("Could not update reference {}: {}", refname, status);
                Err(git2::Error::from_str(&format!("Push failed for {}", refname)))
            }
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        remote.push(&[refspec], Some(&mut push_options)).map_err(|e| {
            if e.class() == git2::ErrorClass::Net {
                git2::Error::from_str(&format!("Network error during push: {}", e))
            } else {
                e
            }
        })?;

        debug!("pushed {} to {}", refspec, self.remote);
        Ok(())
    }

    fn fetch_branch(&self, branch: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(&self.remote)?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(self.remote_callbacks()?);

        let refspec = format!("+refs/heads/{0}:refs/remotes/{1}/{0}", branch, self.remote);
        remote.fetch(&[refspec.as_str()], Some(&mut fetch_options), None)?;
        Ok(())
    }

    /// `git pull --ff-only` for the checked-out branch.
    fn fast_forward_current(&self) -> Result<()> {
        let branch = self.current_branch_name()?;
        self.fetch_branch(&branch)?;

        let tracking = format!("refs/remotes/{}/{}", self.remote, branch);
        let remote_ref = match self.repo.find_reference(&tracking) {
            Ok(r) => r,
            Err(_) => {
                debug!("{} has no remote counterpart, nothing to pull", branch);
                return Ok(());
            }
        };

        let incoming = self.repo.reference_to_annotated_commit(&remote_ref)?;
        let (analysis, _) = self.repo.merge_analysis(&[&incoming])?;

        if analysis.is_up_to_date() {
            return Ok(());
        }

        if analysis.is_fast_forward() {
            let mut local = self.repo.find_reference(&format!("refs/heads/{}", branch))?;
            local.set_target(incoming.id(), &format!("pull: fast-forward from {}", tracking))?;
            self.repo
                .checkout_head(Some(CheckoutBuilder::default().force()))?;
            return Ok(());
        }

        Err(ReleaseError::pull(format!(
            "'{}' has diverged from '{}/{}'",
            branch, self.remote, branch
        )))
    }

    fn current_branch_name(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(git2::Error::from_str("HEAD is detached").into());
        }
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| git2::Error::from_str("branch name is not valid UTF-8").into())
    }
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        self.current_branch_name()
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        if self.repo.find_branch(branch, BranchType::Local).is_err() {
            let upstream = format!("{}/{}", self.remote, branch);
            if self.repo.find_branch(&upstream, BranchType::Remote).is_err() {
                if let Err(e) = self.fetch_branch(branch) {
                    debug!("cannot fetch '{}' from {}: {}", branch, self.remote, e);
                }
            }
            let remote_branch = self
                .repo
                .find_branch(&upstream, BranchType::Remote)
                .map_err(|_| git2::Error::from_str(&format!("Cannot find branch '{}'", branch)))?;
            let commit = remote_branch.get().peel_to_commit()?;
            let mut local = self.repo.branch(branch, &commit, false)?;
            local.set_upstream(Some(upstream.as_str()))?;
        }

        let refname = format!("refs/heads/{}", branch);
        let target = self.repo.revparse_single(&refname)?;
        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head(&refname)?;
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        self.fast_forward_current().map_err(|e| match e {
            ReleaseError::GitPull(_) => e,
            other => ReleaseError::pull(other.to_string()),
        })
    }

    fn add(&self, paths: &[&Path]) -> Result<()> {
        let mut index = self.repo.index()?;
        for path in paths {
            index.add_path(path)?;
        }
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;
        Ok(())
    }

    fn push(&self) -> Result<()> {
        let branch = self.current_branch_name()?;
        self.push_refspec(&format!("refs/heads/{0}:refs/heads/{0}", branch))
    }

    fn merge(&self, from: &str, into: &str) -> Result<()> {
        if self.current_branch_name()? != into {
            return Err(git2::Error::from_str(&format!(
                "Cannot merge into '{}': it is not checked out",
                into
            ))
            .into());
        }

        let source = self.repo.find_reference(&format!("refs/heads/{}", from))?;
        let incoming = self.repo.reference_to_annotated_commit(&source)?;
        let (analysis, _) = self.repo.merge_analysis(&[&incoming])?;

        if analysis.is_up_to_date() {
            return Ok(());
        }

        if analysis.is_fast_forward() {
            let mut target = self.repo.find_reference(&format!("refs/heads/{}", into))?;
            target.set_target(incoming.id(), &format!("merge {}: fast-forward", from))?;
            self.repo
                .checkout_head(Some(CheckoutBuilder::default().force()))?;
            return Ok(());
        }

        self.repo.merge(&[&incoming], None, None)?;
        let mut index = self.repo.index()?;
        if index.has_conflicts() {
            self.repo.cleanup_state()?;
            return Err(git2::Error::from_str(&format!(
                "Merge of '{}' into '{}' has conflicts",
                from, into
            ))
            .into());
        }

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let ours = self.repo.head()?.peel_to_commit()?;
        let theirs = self.repo.find_commit(incoming.id())?;
        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &format!("Merge branch '{}' into {}", from, into),
            &tree,
            &[&ours, &theirs],
        )?;
        self.repo.cleanup_state()?;
        Ok(())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo.tag_lightweight(name, head.as_object(), false)?;
        Ok(())
    }

    fn push_tag(&self, name: &str) -> Result<()> {
        self.push_refspec(&format!("refs/tags/{0}:refs/tags/{0}", name))
    }
}
