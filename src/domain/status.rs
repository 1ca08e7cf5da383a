use crate::error::{ReleaseError, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Task workflow status, declared in priority order.
///
/// A ticket is only ever moved to a status of strictly higher rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskStatus {
    ToDo,
    Doing,
    WaitingForReview,
    InFunctionalTest,
    InCodeReview,
    ToRelease,
    Released,
    Closed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 8] = [
        TaskStatus::ToDo,
        TaskStatus::Doing,
        TaskStatus::WaitingForReview,
        TaskStatus::InFunctionalTest,
        TaskStatus::InCodeReview,
        TaskStatus::ToRelease,
        TaskStatus::Released,
        TaskStatus::Closed,
    ];

    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Label the tracker expects in status updates.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to do",
            TaskStatus::Doing => "doing",
            TaskStatus::WaitingForReview => "waiting for review",
            TaskStatus::InFunctionalTest => "in functional test",
            TaskStatus::InCodeReview => "in code review",
            TaskStatus::ToRelease => "to release",
            TaskStatus::Released => "released",
            TaskStatus::Closed => "closed",
        }
    }

    /// Snake-case name used as a configuration key, e.g. `in_code_review`
    pub fn key(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to_do",
            TaskStatus::Doing => "doing",
            TaskStatus::WaitingForReview => "waiting_for_review",
            TaskStatus::InFunctionalTest => "in_functional_test",
            TaskStatus::InCodeReview => "in_code_review",
            TaskStatus::ToRelease => "to_release",
            TaskStatus::Released => "released",
            TaskStatus::Closed => "closed",
        }
    }

    /// Parse a tracker label.
    ///
    /// Case-insensitive, and decorations before the first letter are ignored
    /// so `"✍️DOING"` reads as [`TaskStatus::Doing`]. Unknown labels give `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let start = label
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| i)?;
        let normalized = label[start..].trim().to_lowercase();

        match normalized.as_str() {
            "to do" | "todo" => Some(TaskStatus::ToDo),
            "doing" => Some(TaskStatus::Doing),
            "waiting for review" => Some(TaskStatus::WaitingForReview),
            "in functional test" | "in functionnal test" => Some(TaskStatus::InFunctionalTest),
            "in code review" => Some(TaskStatus::InCodeReview),
            "to release" => Some(TaskStatus::ToRelease),
            "released" => Some(TaskStatus::Released),
            "closed" => Some(TaskStatus::Closed),
            _ => None,
        }
    }

    /// Whether moving from `current` to `self` is an advance.
    ///
    /// An unknown current status ranks below every known one.
    pub fn advances(&self, current: Option<TaskStatus>) -> bool {
        current.map_or(true, |current| self.rank() > current.rank())
    }
}

/// Labels a tracker workspace uses for each status.
///
/// Statuses are written with these labels and read back through them before
/// falling back to [`TaskStatus::from_label`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLabels {
    labels: [String; 8],
}

impl Default for StatusLabels {
    fn default() -> Self {
        StatusLabels {
            labels: TaskStatus::ALL.map(|status| status.label().to_string()),
        }
    }
}

impl StatusLabels {
    /// Default labels with `overrides` applied, keyed by [`TaskStatus::key`].
    ///
    /// # Returns
    /// * `Err(Config)` - If a key names no known status
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self> {
        let mut labels = StatusLabels::default();
        for (key, label) in overrides {
            let status = TaskStatus::ALL
                .into_iter()
                .find(|status| status.key() == key.trim())
                .ok_or_else(|| {
                    ReleaseError::config(format!("unknown task status '{}' in status_labels", key))
                })?;
            labels.labels[status.rank() as usize] = label.clone();
        }
        Ok(labels)
    }

    pub fn label(&self, status: TaskStatus) -> &str {
        &self.labels[status.rank() as usize]
    }

    pub fn parse(&self, label: &str) -> Option<TaskStatus> {
        let label = label.trim();
        TaskStatus::ALL
            .into_iter()
            .find(|status| self.label(*status).eq_ignore_ascii_case(label))
            .or_else(|| TaskStatus::from_label(label))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_follow_declaration_order() {
        let ranks: Vec<u8> = TaskStatus::ALL.iter().map(TaskStatus::rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(TaskStatus::ToRelease > TaskStatus::InCodeReview);
    }

    #[test]
    fn test_labels_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_label(status.label()), Some(status));
        }
    }

    #[test]
    fn test_decorated_labels() {
        assert_eq!(TaskStatus::from_label("✍️DOING"), Some(TaskStatus::Doing));
        assert_eq!(TaskStatus::from_label("🚀TO RELEASE"), Some(TaskStatus::ToRelease));
        assert_eq!(
            TaskStatus::from_label("👮🏻‍♂️IN CODE REVIEW"),
            Some(TaskStatus::InCodeReview)
        );
        assert_eq!(
            TaskStatus::from_label("in functionnal test"),
            Some(TaskStatus::InFunctionalTest)
        );
    }

    #[test]
    fn test_unknown_labels() {
        assert_eq!(TaskStatus::from_label("blocked"), None);
        assert_eq!(TaskStatus::from_label("🚀"), None);
    }

    #[test]
    fn test_never_downgrades() {
        assert!(!TaskStatus::InCodeReview.advances(Some(TaskStatus::ToRelease)));
        assert!(!TaskStatus::Doing.advances(Some(TaskStatus::Doing)));
        assert!(TaskStatus::Released.advances(Some(TaskStatus::ToRelease)));
        assert!(TaskStatus::ToDo.advances(None));
    }

    #[test]
    fn test_default_labels() {
        let labels = StatusLabels::default();
        assert_eq!(labels.label(TaskStatus::InCodeReview), "in code review");
        assert_eq!(labels.parse("IN CODE REVIEW"), Some(TaskStatus::InCodeReview));
        assert_eq!(labels.parse("in functionnal test"), Some(TaskStatus::InFunctionalTest));
    }

    #[test]
    fn test_label_overrides() {
        let overrides = BTreeMap::from([
            ("doing".to_string(), "✍️DOING".to_string()),
            ("in_functional_test".to_string(), "QA".to_string()),
        ]);
        let labels = StatusLabels::with_overrides(&overrides).unwrap();

        assert_eq!(labels.label(TaskStatus::Doing), "✍️DOING");
        assert_eq!(labels.label(TaskStatus::InFunctionalTest), "QA");
        assert_eq!(labels.label(TaskStatus::Released), "released");
        assert_eq!(labels.parse("qa"), Some(TaskStatus::InFunctionalTest));
        assert_eq!(labels.parse("✍️DOING"), Some(TaskStatus::Doing));
    }

    #[test]
    fn test_unknown_override_key() {
        let overrides = BTreeMap::from([("shipping".to_string(), "🚢".to_string())]);
        let err = StatusLabels::with_overrides(&overrides).unwrap_err();
        assert!(matches!(err, ReleaseError::Config(_)));
    }
}
