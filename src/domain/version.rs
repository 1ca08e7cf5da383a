use crate::domain::release::ReleaseType;
use crate::error::Result;
use semver::{BuildMetadata, Prerelease, Version};

/// Compute the version that follows `current` for the given release type.
///
/// Follows npm `semver.inc` rules:
/// - **Major / Minor / Patch**: bump the component and zero the lower ones,
///   except that a prerelease of that exact component is simply finalized
///   (`2.0.0-beta.1` + major = `2.0.0`)
/// - **PreMajor / PreMinor / PrePatch**: bump the component, then start a
///   `{tag}.0` prerelease
/// - **PreRelease**: increment the trailing number of an existing prerelease,
///   or bump patch and start `{tag}.0`
///
/// Build metadata is always dropped.
pub fn next_version(
    current: &Version,
    release_type: ReleaseType,
    prerelease_tag: Option<&str>,
) -> Result<Version> {
    let mut next = current.clone();
    next.build = BuildMetadata::EMPTY;

    match release_type {
        ReleaseType::Major => {
            if next.minor != 0 || next.patch != 0 || next.pre.is_empty() {
                next.major += 1;
            }
            next.minor = 0;
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::Minor => {
            if next.patch != 0 || next.pre.is_empty() {
                next.minor += 1;
            }
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::Patch => {
            if next.pre.is_empty() {
                next.patch += 1;
            }
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::PreMajor => {
            next.major += 1;
            next.minor = 0;
            next.patch = 0;
            next.pre = bump_prerelease(&Prerelease::EMPTY, prerelease_tag)?;
        }
        ReleaseType::PreMinor => {
            next.minor += 1;
            next.patch = 0;
            next.pre = bump_prerelease(&Prerelease::EMPTY, prerelease_tag)?;
        }
        ReleaseType::PrePatch => {
            next.patch += 1;
            next.pre = bump_prerelease(&Prerelease::EMPTY, prerelease_tag)?;
        }
        ReleaseType::PreRelease => {
            if next.pre.is_empty() {
                next.patch += 1;
            }
            next.pre = bump_prerelease(&next.pre, prerelease_tag)?;
        }
    }

    Ok(next)
}

fn bump_prerelease(pre: &Prerelease, tag: Option<&str>) -> Result<Prerelease> {
    let mut ids: Vec<String> = if pre.is_empty() {
        Vec::new()
    } else {
        pre.as_str().split('.').map(str::to_string).collect()
    };

    let last_number = ids
        .iter_mut()
        .rev()
        .find_map(|id| id.parse::<u64>().ok().map(move |n| (id, n)));
    match last_number {
        Some((id, n)) => *id = (n + 1).to_string(),
        None => ids.push("0".to_string()),
    }

    if let Some(tag) = tag {
        let keeps_counter = ids.first().map(String::as_str) == Some(tag)
            && ids.get(1).is_some_and(|id| id.parse::<u64>().is_ok());
        if !keeps_counter {
            ids = vec![tag.to_string(), "0".to_string()];
        }
    }

    Ok(Prerelease::new(&ids.join("."))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bump(current: &str, release_type: ReleaseType, tag: Option<&str>) -> String {
        let current = Version::parse(current).unwrap();
        next_version(&current, release_type, tag).unwrap().to_string()
    }

    #[test]
    fn test_plain_bumps() {
        assert_eq!(bump("2.3.9", ReleaseType::Patch, None), "2.3.10");
        assert_eq!(bump("2.3.9", ReleaseType::Minor, None), "2.4.0");
        assert_eq!(bump("2.3.9", ReleaseType::Major, None), "3.0.0");
    }

    #[test]
    fn test_pre_bumps_with_default_tag() {
        assert_eq!(bump("2.3.9", ReleaseType::PrePatch, Some("beta")), "2.3.10-beta.0");
        assert_eq!(bump("2.3.9", ReleaseType::PreMinor, Some("beta")), "2.4.0-beta.0");
        assert_eq!(bump("2.3.9", ReleaseType::PreMajor, Some("beta")), "3.0.0-beta.0");
    }

    #[test]
    fn test_prerelease_increments_counter() {
        assert_eq!(bump("2.3.9-beta.0", ReleaseType::PreRelease, Some("beta")), "2.3.9-beta.1");
        assert_eq!(bump("2.3.9-beta.7", ReleaseType::PreRelease, None), "2.3.9-beta.8");
    }

    #[test]
    fn test_prerelease_switches_tag() {
        assert_eq!(bump("2.3.9-beta.3", ReleaseType::PreRelease, Some("alpha")), "2.3.9-alpha.0");
    }

    #[test]
    fn test_prerelease_from_final_version_bumps_patch() {
        assert_eq!(bump("2.3.9", ReleaseType::PreRelease, Some("beta")), "2.3.10-beta.0");
        assert_eq!(bump("2.3.9", ReleaseType::PreRelease, None), "2.3.10-0");
    }

    #[test]
    fn test_finalizing_prereleases() {
        assert_eq!(bump("2.3.10-beta.2", ReleaseType::Patch, None), "2.3.10");
        assert_eq!(bump("2.4.0-beta.2", ReleaseType::Minor, None), "2.4.0");
        assert_eq!(bump("3.0.0-beta.2", ReleaseType::Major, None), "3.0.0");
        assert_eq!(bump("2.4.1-beta.2", ReleaseType::Minor, None), "2.5.0");
    }

    #[test]
    fn test_build_metadata_dropped() {
        assert_eq!(bump("1.0.0+build.5", ReleaseType::Patch, None), "1.0.1");
    }

    #[test]
    fn test_invalid_tag_is_an_error() {
        let current = Version::parse("1.0.0").unwrap();
        assert!(next_version(&current, ReleaseType::PrePatch, Some("not valid")).is_err());
    }
}
