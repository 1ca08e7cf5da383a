// tests/reconciler_test.rs
use release_keeper::config::TrackerConfig;
use release_keeper::error::{ReleaseError, Result};
use release_keeper::tracker::{StatusReconciler, Task, TaskTracker};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

/// Tracker holding tasks as JSON, the way the API returns them.
struct JsonTracker {
    tasks: RefCell<HashMap<String, serde_json::Value>>,
    updates: RefCell<Vec<(String, String)>>,
}

impl JsonTracker {
    fn new(tasks: serde_json::Value) -> Self {
        let tasks = tasks
            .as_array()
            .unwrap()
            .iter()
            .map(|task| (task["id"].as_str().unwrap().to_string(), task.clone()))
            .collect();
        JsonTracker {
            tasks: RefCell::new(tasks),
            updates: RefCell::new(Vec::new()),
        }
    }
}

impl TaskTracker for &JsonTracker {
    fn fetch_task(&self, id: &str, with_subtasks: bool) -> Result<Task> {
        let tasks = self.tasks.borrow();
        let mut task = tasks
            .get(id)
            .cloned()
            .ok_or_else(|| ReleaseError::tracker("HTTP 404 Not Found: Task not found"))?;
        if with_subtasks {
            let subtasks: Vec<serde_json::Value> = tasks
                .values()
                .filter(|t| t["parent"].as_str() == Some(id))
                .cloned()
                .collect();
            task["subtasks"] = serde_json::Value::Array(subtasks);
        }
        Ok(serde_json::from_value(task)?)
    }

    fn update_status(&self, id: &str, label: &str) -> Result<()> {
        self.updates.borrow_mut().push((id.to_string(), label.to_string()));
        if let Some(task) = self.tasks.borrow_mut().get_mut(id) {
            task["status"]["status"] = serde_json::json!(label);
        }
        Ok(())
    }
}

fn event_file(payload: serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(payload.to_string().as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_approved_pull_request_moves_ticket_to_release() {
    let tracker = JsonTracker::new(serde_json::json!([
        {"id": "8677xy1", "status": {"status": "🔍 IN CODE REVIEW"}, "parent": null}
    ]));
    let reconciler = StatusReconciler::new(&tracker, &TrackerConfig::default()).unwrap();

    let event = event_file(serde_json::json!({
        "action": "submitted",
        "pull_request": {
            "title": "feat: export to csv (CU-8677xy1)",
            "assignees": [{"login": "ana"}],
            "requested_reviewers": []
        },
        "review": {"state": "APPROVED"}
    }));

    let outcomes = reconciler.handle_event_file(event.path()).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].advanced);
    assert_eq!(
        *tracker.updates.borrow(),
        vec![("8677xy1".to_string(), "to release".to_string())]
    );
}

#[test]
fn test_downgrade_is_never_sent() {
    let tracker = JsonTracker::new(serde_json::json!([
        {"id": "8677xy1", "status": {"status": "to release"}}
    ]));
    let reconciler = StatusReconciler::new(&tracker, &TrackerConfig::default()).unwrap();

    let event = event_file(serde_json::json!({
        "pull_request": {
            "title": "feat: export to csv (CU-8677xy1)",
            "assignees": [{"login": "ana"}],
            "requested_reviewers": [{"login": "ana"}]
        }
    }));

    let outcomes = reconciler.handle_event_file(event.path()).unwrap();
    assert!(!outcomes[0].advanced);
    assert!(tracker.updates.borrow().is_empty());
}

#[test]
fn test_push_releases_ticket_subtasks_and_parent() {
    let tracker = JsonTracker::new(serde_json::json!([
        {"id": "epic001", "status": {"status": "doing"}},
        {"id": "story01", "status": {"status": "to release"}, "parent": "epic001"},
        {"id": "check01", "status": {"status": "in code review"}, "parent": "story01"}
    ]));
    let reconciler = StatusReconciler::new(&tracker, &TrackerConfig::default()).unwrap();

    let event = event_file(serde_json::json!({
        "ref": "refs/heads/master",
        "pusher": {"name": "johanna"},
        "commits": [{"message": "Merge pull request #12 (CU-story01)"}]
    }));

    reconciler.handle_event_file(event.path()).unwrap();
    assert_eq!(
        *tracker.updates.borrow(),
        vec![
            ("story01".to_string(), "released".to_string()),
            ("check01".to_string(), "released".to_string()),
            ("epic001".to_string(), "released".to_string()),
        ]
    );
}

#[test]
fn test_unrecognized_event_does_nothing() {
    let tracker = JsonTracker::new(serde_json::json!([]));
    let reconciler = StatusReconciler::new(&tracker, &TrackerConfig::default()).unwrap();

    let event = event_file(serde_json::json!({"zen": "Keep it logically awesome."}));
    assert!(reconciler.handle_event_file(event.path()).unwrap().is_empty());
}

#[test]
fn test_malformed_event_file_is_an_error() {
    let tracker = JsonTracker::new(serde_json::json!([]));
    let reconciler = StatusReconciler::new(&tracker, &TrackerConfig::default()).unwrap();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"{not json").unwrap();
    file.flush().unwrap();

    let err = reconciler.handle_event_file(file.path()).unwrap_err();
    assert!(matches!(err, ReleaseError::Json(_)));
}

#[test]
fn test_workspace_labels_from_config() {
    let config: TrackerConfig = toml::from_str(
        r#"
        [status_labels]
        waiting_for_review = "👀 WAITING FOR REVIEW"
        "#,
    )
    .unwrap();
    let tracker = JsonTracker::new(serde_json::json!([
        {"id": "parent1", "status": {"status": "doing"}},
        {"id": "8677xy1", "status": {"status": "✍️DOING"}, "parent": "parent1"},
        {"id": "8677xy2", "status": {"status": "in functionnal test"}, "parent": "parent1"}
    ]));
    let reconciler = StatusReconciler::new(&tracker, &config).unwrap();

    let event = event_file(serde_json::json!({
        "pull_request": {
            "title": "feat: export to csv (CU-8677xy1)",
            "assignees": [{"login": "ana"}],
            "requested_reviewers": [null, {"login": "ana"}],
            "labels": null
        }
    }));

    let outcomes = reconciler.handle_event_file(event.path()).unwrap();
    assert!(outcomes[0].advanced);
    assert_eq!(
        *tracker.updates.borrow(),
        vec![
            ("8677xy1".to_string(), "👀 WAITING FOR REVIEW".to_string()),
            ("parent1".to_string(), "👀 WAITING FOR REVIEW".to_string()),
        ]
    );
}
