use crate::error::{ReleaseError, Result};
use log::debug;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

/// Ticket as returned by the tracker
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Task {
    pub id: String,
    pub status: TaskState,
    #[serde(default)]
    pub parent: Option<String>,
    /// Present only when fetched with subtasks
    #[serde(default)]
    pub subtasks: Option<Vec<Task>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskState {
    pub status: String,
}

/// Read and advance tickets in the task tracker.
pub trait TaskTracker {
    fn fetch_task(&self, id: &str, with_subtasks: bool) -> Result<Task>;

    /// Set the status by its workspace label, e.g. `"in code review"` or `"✍️DOING"`
    fn update_status(&self, id: &str, label: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    err: Option<String>,
}

/// ClickUp REST API v2 client
pub struct ClickUpClient {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

impl ClickUpClient {
    /// # Returns
    /// * `Err(Config)` - If the API key is absent or empty
    pub fn new(api_key: Option<&str>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ReleaseError::config("CLICKUP_API_KEY is not set"))?;

        Ok(ClickUpClient {
            client: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.api_key)
                .map_err(|_| ReleaseError::config("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn task_url(&self, id: &str) -> String {
        format!("{}/task/{}", self.base_url, id)
    }

    /// Surface the tracker's own `err` message when the call failed.
    fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let cause = response
            .json::<ErrorResponse>()
            .ok()
            .and_then(|body| body.err)
            .unwrap_or_else(|| "no details".to_string());
        Err(ReleaseError::tracker(format!("HTTP {}: {}", status, cause)))
    }
}

impl TaskTracker for ClickUpClient {
    fn fetch_task(&self, id: &str, with_subtasks: bool) -> Result<Task> {
        let mut request = self.client.get(self.task_url(id)).headers(self.build_headers()?);
        if with_subtasks {
            request = request.query(&[("subtasks", "true")]);
        }

        let response = request
            .send()
            .map_err(|e| ReleaseError::tracker(e.to_string()))?;
        let task = Self::check(response)?
            .json::<Task>()
            .map_err(|e| ReleaseError::tracker(format!("unexpected task payload: {}", e)))?;

        debug!("fetched task {} ({})", task.id, task.status.status);
        Ok(task)
    }

    fn update_status(&self, id: &str, label: &str) -> Result<()> {
        let response = self
            .client
            .put(self.task_url(id))
            .headers(self.build_headers()?)
            .json(&json!({ "status": label }))
            .send()
            .map_err(|e| ReleaseError::tracker(e.to_string()))?;

        Self::check(response)?;
        Ok(())
    }
}
