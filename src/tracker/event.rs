//! GitHub webhook payloads and ticket tag extraction.

use crate::error::{ReleaseError, Result};
use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
struct RawEvent {
    #[serde(default)]
    pull_request: Option<RawPullRequest>,
    #[serde(default)]
    review: Option<RawReview>,
    #[serde(default)]
    pusher: Option<Value>,
    #[serde(default)]
    commits: Option<Vec<Option<RawCommit>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawPullRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    requested_reviewers: Option<Vec<Option<RawUser>>>,
    #[serde(default)]
    assignees: Option<Vec<Option<RawUser>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawUser {
    #[serde(default)]
    login: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawReview {
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawCommit {
    #[serde(default)]
    message: Option<String>,
}

/// A submitted pull request review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub state: Option<String>,
}

impl Review {
    pub fn is_approved(&self) -> bool {
        self.state.as_deref() == Some("APPROVED")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub title: String,
    pub requested_reviewers: Vec<String>,
    pub assignees: Vec<String>,
    pub review: Option<Review>,
}

impl PullRequestEvent {
    /// True when someone assigned to the pull request is also asked to review it.
    pub fn has_assigned_reviewer(&self) -> bool {
        self.assignees
            .iter()
            .any(|assignee| self.requested_reviewers.contains(assignee))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    pub commit_messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    PullRequest(PullRequestEvent),
    Push(PushEvent),
    Unrecognized,
}

impl WebhookEvent {
    /// Read and classify the event payload stored at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let payload: Value = serde_json::from_str(&content)?;
        Ok(classify(&payload))
    }
}

/// Pull request when the payload has a non-empty pull request title,
/// otherwise push when it has a pusher and at least one commit.
pub fn classify(payload: &Value) -> WebhookEvent {
    let raw: RawEvent = match serde_json::from_value(payload.clone()) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Ignoring event payload with an unexpected shape: {}", e);
            return WebhookEvent::Unrecognized;
        }
    };

    if let Some(pr) = raw.pull_request {
        if let Some(title) = pr.title.filter(|t| !t.is_empty()) {
            let logins = |users: Option<Vec<Option<RawUser>>>| -> Vec<String> {
                users
                    .into_iter()
                    .flatten()
                    .flatten()
                    .filter_map(|u| u.login)
                    .collect()
            };
            return WebhookEvent::PullRequest(PullRequestEvent {
                title,
                requested_reviewers: logins(pr.requested_reviewers),
                assignees: logins(pr.assignees),
                review: raw.review.map(|r| Review { state: r.state }),
            });
        }
    }

    let has_pusher = raw.pusher.as_ref().is_some_and(|p| !p.is_null());
    match raw.commits {
        Some(commits) if has_pusher && !commits.is_empty() => {
            let total = commits.len();
            let commit_messages: Vec<String> = commits
                .into_iter()
                .flatten()
                .filter_map(|c| c.message)
                .collect();
            if commit_messages.len() < total {
                debug!("{} commit(s) without a message skipped", total - commit_messages.len());
            }
            WebhookEvent::Push(PushEvent { commit_messages })
        }
        _ => WebhookEvent::Unrecognized,
    }
}

/// Matches `(PREFIX-xxxxxx)` ticket tags in titles and commit messages.
#[derive(Debug, Clone)]
pub struct TicketTag {
    pattern: Regex,
}

impl TicketTag {
    /// # Returns
    /// * `Err(Config)` - If the prefix is empty or yields no valid pattern
    pub fn new(prefix: &str) -> Result<Self> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(ReleaseError::config("ticket tag prefix is empty"));
        }

        let pattern = Regex::new(&format!(r"\({}-(\w{{6,}})\)", regex::escape(prefix)))
            .map_err(|e| {
                ReleaseError::config(format!("invalid ticket tag prefix '{}': {}", prefix, e))
            })?;
        Ok(TicketTag { pattern })
    }

    /// Id of the first tag in `text`.
    ///
    /// The id must be at least six word characters; anything else is ignored.
    pub fn find(&self, text: &str) -> Option<String> {
        self.pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }
}
