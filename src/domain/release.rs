use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// Prerelease identifier used when a `pre*` release is asked for without one.
pub const DEFAULT_PRERELEASE_TAG: &str = "beta";

/// Kind of version increment requested for a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseType {
    Major,
    Minor,
    #[default]
    Patch,
    PreMajor,
    PreMinor,
    PrePatch,
    PreRelease,
}

impl ReleaseType {
    /// Whether this increment produces a prerelease version.
    pub fn is_prerelease(&self) -> bool {
        matches!(
            self,
            ReleaseType::PreMajor
                | ReleaseType::PreMinor
                | ReleaseType::PrePatch
                | ReleaseType::PreRelease
        )
    }
}

impl FromStr for ReleaseType {
    type Err = ReleaseError;

    /// Accepts both `minor` and the `--minor` flag form.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim_start_matches("--").to_lowercase().as_str() {
            "major" => Ok(ReleaseType::Major),
            "minor" => Ok(ReleaseType::Minor),
            "patch" => Ok(ReleaseType::Patch),
            "premajor" => Ok(ReleaseType::PreMajor),
            "preminor" => Ok(ReleaseType::PreMinor),
            "prepatch" => Ok(ReleaseType::PrePatch),
            "prerelease" => Ok(ReleaseType::PreRelease),
            other => Err(ReleaseError::config(format!(
                "Unknown release type: '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
            ReleaseType::PreMajor => "premajor",
            ReleaseType::PreMinor => "preminor",
            ReleaseType::PrePatch => "prepatch",
            ReleaseType::PreRelease => "prerelease",
        };
        write!(f, "{}", name)
    }
}

/// What kind of release to cut, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    pub release_type: ReleaseType,
    pub prerelease_tag: Option<String>,
    pub with_version: bool,
}

impl ReleaseDescriptor {
    /// Build a descriptor, defaulting the prerelease tag to `beta` for `pre*` types.
    ///
    /// An explicit tag may be given as `alpha` or `--alpha`. Without versioning
    /// there is nothing to tag, so any prerelease tag is dropped.
    pub fn new(
        release_type: ReleaseType,
        prerelease_tag: Option<&str>,
        with_version: bool,
    ) -> Self {
        let prerelease_tag = prerelease_tag
            .map(|tag| tag.trim_start_matches("--").to_string())
            .filter(|tag| !tag.is_empty())
            .or_else(|| {
                release_type
                    .is_prerelease()
                    .then(|| DEFAULT_PRERELEASE_TAG.to_string())
            })
            .filter(|_| with_version);

        ReleaseDescriptor {
            release_type,
            prerelease_tag,
            with_version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_types() {
        assert_eq!("major".parse::<ReleaseType>().unwrap(), ReleaseType::Major);
        assert_eq!("--minor".parse::<ReleaseType>().unwrap(), ReleaseType::Minor);
        assert_eq!(
            "PreRelease".parse::<ReleaseType>().unwrap(),
            ReleaseType::PreRelease
        );
        assert!("hotfix".parse::<ReleaseType>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for t in [
            ReleaseType::Major,
            ReleaseType::PreMinor,
            ReleaseType::PreRelease,
        ] {
            assert_eq!(t.to_string().parse::<ReleaseType>().unwrap(), t);
        }
    }

    #[test]
    fn test_prerelease_tag_defaults_to_beta() {
        let desc = ReleaseDescriptor::new(ReleaseType::PrePatch, None, true);
        assert_eq!(desc.prerelease_tag.as_deref(), Some("beta"));
    }

    #[test]
    fn test_explicit_prerelease_tag_is_kept() {
        let desc = ReleaseDescriptor::new(ReleaseType::PreRelease, Some("--alpha"), true);
        assert_eq!(desc.prerelease_tag.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_plain_release_has_no_tag() {
        let desc = ReleaseDescriptor::new(ReleaseType::Minor, None, true);
        assert_eq!(desc.prerelease_tag, None);
    }

    #[test]
    fn test_unversioned_release_ignores_prerelease_tag() {
        let desc = ReleaseDescriptor::new(ReleaseType::PrePatch, None, false);
        assert_eq!(desc.prerelease_tag, None);

        let desc = ReleaseDescriptor::new(ReleaseType::PreRelease, Some("--alpha"), false);
        assert_eq!(desc.prerelease_tag, None);
        assert!(!desc.with_version);
    }
}
