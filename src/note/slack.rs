use crate::error::{ReleaseError, Result};
use log::debug;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;

const FILES_UPLOAD_URL: &str = "https://slack.com/api/files.upload";

/// A `files.upload` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub channels: String,
    pub content: String,
    pub filename: String,
    pub filetype: String,
}

/// Anything that can receive a release note.
pub trait ChatClient {
    fn upload(&self, file: &FileUpload) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack Web API client
pub struct SlackClient {
    client: HttpClient,
    token: String,
}

impl SlackClient {
    /// # Returns
    /// * `Err(SlackTokenMissing)` - If no token, or an empty one, is given
    pub fn new(token: Option<&str>) -> Result<Self> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ReleaseError::SlackTokenMissing)?;

        Ok(SlackClient {
            client: HttpClient::new(),
            token: token.to_string(),
        })
    }
}

impl ChatClient for SlackClient {
    fn upload(&self, file: &FileUpload) -> Result<()> {
        let form = [
            ("channels", file.channels.as_str()),
            ("content", file.content.as_str()),
            ("filename", file.filename.as_str()),
            ("filetype", file.filetype.as_str()),
        ];

        let response = self
            .client
            .post(FILES_UPLOAD_URL)
            .bearer_auth(&self.token)
            .form(&form)
            .send()
            .map_err(|e| ReleaseError::slack(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReleaseError::slack(format!("HTTP {}", status)));
        }

        let body: SlackResponse = response
            .json()
            .map_err(|e| ReleaseError::slack(format!("unexpected response: {}", e)))?;
        if !body.ok {
            return Err(ReleaseError::slack(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        debug!("uploaded {} to {}", file.filename, file.channels);
        Ok(())
    }
}
