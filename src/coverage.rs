//! Coverage badge in the README, computed from an LCOV report.

use crate::error::Result;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

const BADGE_BASE: &str = "https://img.shields.io/badge/coverage-";

fn badge_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"!\[Coverage\]\(https://img\.shields\.io/badge/coverage-[^)]*\)")
            .expect("valid coverage badge regex")
    })
}

/// Line totals summed over every record of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCoverage {
    pub hit: u64,
    pub found: u64,
}

impl LineCoverage {
    /// Sum the `LH` and `LF` entries of an LCOV report.
    ///
    /// Unparseable counts are ignored.
    pub fn parse_lcov(report: &str) -> Self {
        report
            .lines()
            .map(str::trim)
            .fold(LineCoverage::default(), |mut total, line| {
                if let Some(hit) = line.strip_prefix("LH:") {
                    total.hit += hit.trim().parse::<u64>().unwrap_or(0);
                } else if let Some(found) = line.strip_prefix("LF:") {
                    total.found += found.trim().parse::<u64>().unwrap_or(0);
                }
                total
            })
    }

    /// Floored percentage, `None` when no line was instrumented
    pub fn percentage(&self) -> Option<u64> {
        (self.found > 0).then(|| self.hit * 100 / self.found)
    }

    /// `success` above 99%, `important` from 90%, measured on the exact ratio
    fn color(&self) -> &'static str {
        let percent = self.hit * 100;
        if percent > 99 * self.found {
            "success"
        } else if percent >= 90 * self.found {
            "important"
        } else {
            "critical"
        }
    }
}

/// Badge URL for an LCOV report, or the "unknown" badge without one.
pub fn badge_url(report: Option<&str>) -> String {
    let coverage = report.map(LineCoverage::parse_lcov);
    match coverage.and_then(|c| c.percentage().map(|pct| (pct, c.color()))) {
        Some((pct, color)) => format!("{}{}%25-{}", BADGE_BASE, pct, color),
        None => format!("{}unknown-critical", BADGE_BASE),
    }
}

/// Replace the coverage image in `readme` with `badge`.
///
/// Content without a coverage image is returned unchanged.
pub fn update_readme(readme: &str, badge: &str) -> String {
    let image = format!("![Coverage]({})", badge);
    badge_pattern()
        .replace_all(readme, regex::NoExpand(&image))
        .into_owned()
}

/// Read the report at `report_path` and rewrite the badge in `readme_path`.
///
/// A missing report yields the "unknown" badge.
///
/// # Returns
/// The badge URL written to the README
pub fn refresh_badge(report_path: &Path, readme_path: &Path) -> Result<String> {
    let report = match fs::read_to_string(report_path) {
        Ok(report) => Some(report),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let badge = badge_url(report.as_deref());
    let readme = fs::read_to_string(readme_path)?;
    fs::write(readme_path, update_readme(&readme, &badge))?;
    Ok(badge)
}
