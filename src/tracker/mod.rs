//! Ticket status reconciliation from GitHub webhook events.
//!
//! An event is classified, each tagged pull request title or commit message
//! yields a ticket id, and the ticket is advanced to the status the event
//! implies. Tracker failures are logged per ticket and never abort the run.

pub mod clickup;
pub mod event;
pub mod resolver;
pub mod syncer;

pub use clickup::{ClickUpClient, Task, TaskTracker};
pub use event::{classify, PullRequestEvent, PushEvent, TicketTag, WebhookEvent};
pub use resolver::pull_request_status;
pub use syncer::TaskSyncer;

use crate::config::{Config, Credentials, TrackerConfig};
use crate::domain::{StatusLabels, TaskStatus};
use crate::error::{ReleaseError, Result};
use log::info;
use std::path::Path;

/// What happened to one ticket referenced by an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub ticket: String,
    pub target: TaskStatus,
    pub advanced: bool,
}

pub struct StatusReconciler<T: TaskTracker> {
    syncer: TaskSyncer<T>,
    tag: TicketTag,
}

impl StatusReconciler<ClickUpClient> {
    /// Reconciler talking to ClickUp with the key from `credentials`.
    pub fn clickup(credentials: &Credentials, config: &Config) -> Result<Self> {
        let client = ClickUpClient::new(
            credentials.tracker_api_key.as_deref(),
            config.tracker.base_url.clone(),
        )?;
        Self::new(client, &config.tracker)
    }
}

impl<T: TaskTracker> StatusReconciler<T> {
    /// # Returns
    /// * `Err(Config)` - If the tag prefix or a status label key is invalid
    pub fn new(tracker: T, config: &TrackerConfig) -> Result<Self> {
        let labels = StatusLabels::with_overrides(&config.status_labels)?;
        Ok(StatusReconciler {
            syncer: TaskSyncer::new(tracker).with_labels(labels),
            tag: TicketTag::new(&config.tag_prefix)?,
        })
    }

    /// Load the event stored at `path` and reconcile it.
    pub fn handle_event_file(&self, path: &Path) -> Result<Vec<SyncOutcome>> {
        let event = WebhookEvent::load(path).map_err(|e| match e {
            ReleaseError::Io(io) => {
                ReleaseError::config(format!("cannot read event file {}: {}", path.display(), io))
            }
            other => other,
        })?;
        Ok(self.handle_event(&event))
    }

    /// Advance every ticket tagged in `event`.
    ///
    /// Untagged titles and commit messages are skipped; each commit of a push
    /// is handled on its own.
    pub fn handle_event(&self, event: &WebhookEvent) -> Vec<SyncOutcome> {
        match event {
            WebhookEvent::PullRequest(pr) => {
                let Some(ticket) = self.tag.find(&pr.title) else {
                    info!("Pull request '{}' carries no ticket tag", pr.title);
                    return Vec::new();
                };
                let target = pull_request_status(pr);
                let advanced = self.syncer.sync(&ticket, target);
                vec![SyncOutcome {
                    ticket,
                    target,
                    advanced,
                }]
            }
            WebhookEvent::Push(push) => push
                .commit_messages
                .iter()
                .filter_map(|message| self.tag.find(message))
                .map(|ticket| {
                    let advanced = self.syncer.release(&ticket);
                    SyncOutcome {
                        ticket,
                        target: TaskStatus::Released,
                        advanced,
                    }
                })
                .collect(),
            WebhookEvent::Unrecognized => {
                info!("Event is neither a pull request nor a push, nothing to do");
                Vec::new()
            }
        }
    }
}
