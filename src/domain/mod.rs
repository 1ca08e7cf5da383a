//! Domain logic - pure release rules independent of git, Slack or the tracker

pub mod branch;
pub mod changelog;
pub mod manifest;
pub mod release;
pub mod status;
pub mod version;

pub use branch::BranchContext;
pub use changelog::ChangelogDocument;
pub use manifest::PackageManifest;
pub use release::{ReleaseDescriptor, ReleaseType};
pub use status::{StatusLabels, TaskStatus};
pub use version::next_version;
