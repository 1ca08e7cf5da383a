//! `CHANGELOG.md` handling: release header insertion and latest release lookup.

use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

/// Anchor line that release headers are inserted under.
pub const UNRELEASED_HEADER: &str = "## [Unreleased]";

fn release_header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^## RELEASE (\d+\.\d+\.\d+(-\w+\.\d+)? )?- .*$")
            .expect("valid release header regex")
    })
}

/// Whether `line` is a `## RELEASE <version?> - <date>` header.
pub fn is_release_header(line: &str) -> bool {
    release_header_pattern().is_match(line)
}

/// Most recent release block of a changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSection {
    /// The full header line, e.g. `## RELEASE 2.3.9 - 2019-08-29`
    pub header: String,
    /// Lines up to the next release header, trailing blank lines removed
    pub changes: Vec<String>,
}

/// A changelog held as lines.
///
/// Lines are split on `\n` only, so a trailing newline survives a
/// load/save round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogDocument {
    lines: Vec<String>,
}

impl ChangelogDocument {
    pub fn parse(content: &str) -> Self {
        ChangelogDocument {
            lines: content.split('\n').map(str::to_string).collect(),
        }
    }

    /// Read the changelog at `path`.
    ///
    /// # Returns
    /// * `Err(ChangelogMissing)` - If the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ReleaseError::ChangelogMissing(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    /// True for a document with no lines or a single empty one.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.is_empty()) && self.lines.len() <= 1
    }

    /// Insert `## RELEASE {version }- {date}` directly below `## [Unreleased]`.
    ///
    /// The version segment is omitted when `version` is `None`.
    ///
    /// # Returns
    /// * `Err(WronglyFormattedChangelog)` - If there is no `[Unreleased]` line
    ///   or only blank lines follow it
    pub fn insert_release_header(&mut self, version: Option<&str>, date: &str) -> Result<()> {
        let anchor = self
            .lines
            .iter()
            .position(|line| line.trim_end() == UNRELEASED_HEADER)
            .ok_or_else(|| {
                ReleaseError::changelog_format(format!("no '{}' section", UNRELEASED_HEADER))
            })?;

        if self.lines[anchor + 1..].iter().all(|line| line.trim().is_empty()) {
            return Err(ReleaseError::changelog_format(format!(
                "nothing after '{}'",
                UNRELEASED_HEADER
            )));
        }

        let header = match version {
            Some(version) => format!("## RELEASE {} - {}", version, date),
            None => format!("## RELEASE - {}", date),
        };
        self.lines.insert(anchor + 1, header);
        Ok(())
    }

    /// Isolate the first release block of the document.
    ///
    /// Lines before the first release header are skipped.
    ///
    /// # Returns
    /// * `Err(WronglyFormattedChangelog)` - If the document is empty, has no
    ///   release header, or ends right after it
    pub fn latest_release(&self) -> Result<ReleaseSection> {
        if self.is_empty() {
            return Err(ReleaseError::changelog_format("changelog is empty"));
        }

        let mut remaining = self
            .lines
            .iter()
            .skip_while(|line| !is_release_header(line));

        let header = remaining
            .next()
            .ok_or_else(|| ReleaseError::changelog_format("no release header found"))?
            .clone();

        let rest: Vec<&String> = remaining.collect();
        if rest.is_empty() {
            return Err(ReleaseError::changelog_format(format!(
                "no changes after '{}'",
                header
            )));
        }

        let mut changes: Vec<String> = rest
            .into_iter()
            .take_while(|line| !is_release_header(line))
            .cloned()
            .collect();

        while changes.last().is_some_and(|line| line.trim().is_empty()) {
            changes.pop();
        }

        Ok(ReleaseSection { header, changes })
    }
}
