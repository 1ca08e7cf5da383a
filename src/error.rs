use thiserror::Error;

/// Unified error type for release-keeper operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Slack token is missing")]
    SlackTokenMissing,

    #[error("Project icon is missing")]
    ProjectIconMissing,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Changelog is missing: {0}")]
    ChangelogMissing(String),

    #[error("Wrongly formatted changelog: {0}")]
    WronglyFormattedChangelog(String),

    #[error("Package manifest error: {0}")]
    Manifest(String),

    #[error("Version parsing error: {0}")]
    Version(#[from] semver::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git pull failed: {0}")]
    GitPull(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Slack connection error: {0}")]
    SlackConnection(String),

    #[error("Task tracker error: {0}")]
    Tracker(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad failure category used to decide whether a run can go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing token, icon or invalid settings. Raised at construction.
    Configuration,
    /// Missing or malformed changelog / manifest.
    DocumentFormat,
    /// Network side: git pull, Slack upload, tracker calls.
    Transport,
    Git,
    Io,
}

/// Convenience type alias for Results in release-keeper
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a malformed changelog error with context
    pub fn changelog_format(msg: impl Into<String>) -> Self {
        ReleaseError::WronglyFormattedChangelog(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ReleaseError::Manifest(msg.into())
    }

    /// Create a pull error with context
    pub fn pull(msg: impl Into<String>) -> Self {
        ReleaseError::GitPull(msg.into())
    }

    /// Create a Slack connection error with context
    pub fn slack(msg: impl Into<String>) -> Self {
        ReleaseError::SlackConnection(msg.into())
    }

    /// Create a tracker error with context
    pub fn tracker(msg: impl Into<String>) -> Self {
        ReleaseError::Tracker(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReleaseError::SlackTokenMissing
            | ReleaseError::ProjectIconMissing
            | ReleaseError::Config(_) => ErrorKind::Configuration,
            ReleaseError::ChangelogMissing(_)
            | ReleaseError::WronglyFormattedChangelog(_)
            | ReleaseError::Manifest(_)
            | ReleaseError::Version(_)
            | ReleaseError::Json(_) => ErrorKind::DocumentFormat,
            ReleaseError::GitPull(_)
            | ReleaseError::SlackConnection(_)
            | ReleaseError::Tracker(_) => ErrorKind::Transport,
            ReleaseError::Git(_) => ErrorKind::Git,
            ReleaseError::Io(_) => ErrorKind::Io,
        }
    }
}
