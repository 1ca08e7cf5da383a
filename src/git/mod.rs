//! Git operations abstraction layer
//!
//! The release workflow only talks to git through the [Repository] trait so
//! the branch choreography can be exercised without a remote.
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: Records every call, for testing
//!
//! ```rust
//! # use release_keeper::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> release_keeper::Result<()> {
//! let branch = repo.current_branch()?;
//! repo.pull()?;
//! println!("{} is up to date", branch);
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{GitCall, MockRepository};
pub use repository::{project_root, Git2Repository};

use crate::error::Result;
use std::path::Path;

/// Porcelain-level git operations needed to cut a release.
///
/// All operations act on the checked-out branch unless a branch is named.
/// Implementations map their failures to [crate::error::ReleaseError];
/// `pull` failures must surface as [crate::error::ReleaseError::GitPull].
pub trait Repository {
    /// Name of the checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// Switch the working tree to `branch`, creating it from the remote
    /// tracking branch when it only exists there.
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Fetch and fast-forward the current branch from its remote.
    fn pull(&self) -> Result<()>;

    /// Stage files, paths relative to the work tree
    fn add(&self, paths: &[&Path]) -> Result<()>;

    /// Commit the index on the current branch
    fn commit(&self, message: &str) -> Result<()>;

    /// Push the current branch
    fn push(&self) -> Result<()>;

    /// Merge `from` into `into`; `into` must be checked out.
    fn merge(&self, from: &str, into: &str) -> Result<()>;

    /// Create a lightweight tag on HEAD
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Push a single tag to the remote
    fn push_tag(&self, name: &str) -> Result<()>;
}
