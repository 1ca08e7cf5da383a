use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, Result};

/// Slack channel release notes are posted to when none is configured.
pub const DEFAULT_CHANNEL: &str = "G501BDD5W";

/// Represents the complete configuration for release-keeper.
///
/// Secrets never live here; see [`Credentials`].
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub tracker: TrackerConfig,
}

fn default_development_branch() -> String {
    "devel".to_string()
}

fn default_main_branch() -> String {
    "master".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Branch names used by the git-flow release path.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_development_branch")]
    pub development: String,

    #[serde(default = "default_main_branch")]
    pub main: String,

    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            development: default_development_branch(),
            main: default_main_branch(),
            remote: default_remote(),
        }
    }
}

fn default_changelog() -> PathBuf {
    PathBuf::from("CHANGELOG.md")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

fn default_readme() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_coverage_report() -> PathBuf {
    PathBuf::from("coverage/lcov.info")
}

/// Project files, relative to the repository root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilesConfig {
    #[serde(default = "default_changelog")]
    pub changelog: PathBuf,

    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    #[serde(default = "default_readme")]
    pub readme: PathBuf,

    #[serde(default = "default_coverage_report")]
    pub coverage_report: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            changelog: default_changelog(),
            manifest: default_manifest(),
            readme: default_readme(),
            coverage_report: default_coverage_report(),
        }
    }
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SlackConfig {
    #[serde(default = "default_channel")]
    pub channel: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        SlackConfig {
            channel: default_channel(),
        }
    }
}

fn default_tracker_url() -> String {
    "https://api.clickup.com/api/v2".to_string()
}

fn default_tag_prefix() -> String {
    "CU".to_string()
}

/// Task tracker endpoint and the prefix of ticket tags in titles, e.g. `(CU-abc123)`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrackerConfig {
    #[serde(default = "default_tracker_url")]
    pub base_url: String,

    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    /// Workspace labels keyed by status, e.g. `doing = "✍️DOING"`
    #[serde(default)]
    pub status_labels: BTreeMap<String, String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            base_url: default_tracker_url(),
            tag_prefix: default_tag_prefix(),
            status_labels: BTreeMap::new(),
        }
    }
}

/// Secrets and per-run inputs, built once at process entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub slack_token: Option<String>,
    pub tracker_api_key: Option<String>,
    pub event_path: Option<PathBuf>,
}

impl Credentials {
    /// Reads `SLACK_TOKEN`, `CLICKUP_API_KEY` and `GITHUB_EVENT_PATH`.
    ///
    /// Empty values are treated as absent.
    pub fn from_env() -> Self {
        fn non_empty(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|v| !v.trim().is_empty())
        }

        Credentials {
            slack_token: non_empty("SLACK_TOKEN"),
            tracker_api_key: non_empty("CLICKUP_API_KEY"),
            event_path: non_empty("GITHUB_EVENT_PATH").map(PathBuf::from),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release.toml` in current directory
/// 3. `~/.config/.release-keeper.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./release.toml").exists() {
        fs::read_to_string("./release.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".release-keeper.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str).map_err(|e| ReleaseError::config(e.to_string()))
}
