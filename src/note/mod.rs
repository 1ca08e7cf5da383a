//! Release note built from the latest changelog entry and posted to chat.

pub mod slack;

pub use slack::{ChatClient, FileUpload, SlackClient};

use crate::config::{Config, Credentials};
use crate::domain::{ChangelogDocument, PackageManifest};
use crate::error::{ReleaseError, Result};
use log::{error, info};

/// Changelog subsection headers and their decorated replacements.
const SECTION_MARKERS: [(&str, &str); 3] = [
    ("### Added", "## ⭐ Added"),
    ("### Changed", "## 🍿 Changed"),
    ("### Fixed", "## 💉 Fixed"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNote {
    pub title: String,
    pub body: String,
}

impl ReleaseNote {
    pub fn filename(&self) -> String {
        format!("{}.md", self.title)
    }
}

/// Formats the latest release and uploads it through a [ChatClient].
pub struct ReleaseNotePublisher<C: ChatClient> {
    chat: C,
    icon: String,
    channel: String,
    with_version: bool,
}

impl ReleaseNotePublisher<SlackClient> {
    /// Publisher posting to Slack with the token from `credentials`.
    pub fn slack(
        credentials: &Credentials,
        config: &Config,
        icon: Option<&str>,
        channel: Option<&str>,
        with_version: bool,
    ) -> Result<Self> {
        let chat = SlackClient::new(credentials.slack_token.as_deref())?;
        let channel = channel.unwrap_or(&config.slack.channel);
        Self::new(chat, icon, channel, with_version)
    }
}

impl<C: ChatClient> ReleaseNotePublisher<C> {
    /// # Returns
    /// * `Err(ProjectIconMissing)` - If no icon, or an empty one, is given
    pub fn new(chat: C, icon: Option<&str>, channel: &str, with_version: bool) -> Result<Self> {
        let icon = icon
            .filter(|i| !i.trim().is_empty())
            .ok_or(ReleaseError::ProjectIconMissing)?;

        Ok(ReleaseNotePublisher {
            chat,
            icon: icon.to_string(),
            channel: channel.to_string(),
            with_version,
        })
    }

    /// Build the note for the most recent release of `changelog`.
    ///
    /// `manifest` is required when publishing with the version heading.
    pub fn build(
        &self,
        changelog: &ChangelogDocument,
        manifest: Option<&PackageManifest>,
    ) -> Result<ReleaseNote> {
        let section = changelog.latest_release()?;

        let date = section
            .header
            .split_once(" - ")
            .map(|(_, date)| date)
            .unwrap_or_default();
        let title = format!("RELEASE {} {}", self.icon, date);

        let mut body = section
            .changes
            .iter()
            .map(|line| decorate(line))
            .collect::<Vec<_>>()
            .join("\n");

        if self.with_version {
            let manifest = manifest.ok_or_else(|| {
                ReleaseError::config("a package manifest is needed to publish with version")
            })?;
            body = format!(
                "# {} v{}\n\n{}",
                manifest.name()?,
                manifest.version()?,
                body
            );
        }

        Ok(ReleaseNote { title, body })
    }

    /// Build and upload the note in a single attempt.
    pub fn publish(
        &self,
        changelog: &ChangelogDocument,
        manifest: Option<&PackageManifest>,
    ) -> Result<ReleaseNote> {
        let note = self.build(changelog, manifest)?;

        let upload = FileUpload {
            channels: self.channel.clone(),
            content: note.body.clone(),
            filename: note.filename(),
            filetype: "post".to_string(),
        };

        match self.chat.upload(&upload) {
            Ok(()) => {
                info!("📮 Release note posted to {}", self.channel);
                Ok(note)
            }
            Err(e) => {
                error!("Cannot upload the release note, check the Slack token: {}", e);
                Err(match e {
                    ReleaseError::SlackConnection(_) => e,
                    other => ReleaseError::slack(other.to_string()),
                })
            }
        }
    }
}

fn decorate(line: &str) -> &str {
    SECTION_MARKERS
        .iter()
        .find(|(marker, _)| line.trim_end() == *marker)
        .map(|(_, decorated)| *decorated)
        .unwrap_or(line)
}
