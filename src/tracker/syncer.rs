use crate::domain::{StatusLabels, TaskStatus};
use crate::tracker::clickup::{Task, TaskTracker};
use log::{debug, error, info, warn};

/// Moves tickets forward, never backward.
///
/// Tracker failures are logged and reported as `false`; they never abort the
/// caller.
pub struct TaskSyncer<T: TaskTracker> {
    tracker: T,
    labels: StatusLabels,
}

impl<T: TaskTracker> TaskSyncer<T> {
    pub fn new(tracker: T) -> Self {
        TaskSyncer {
            tracker,
            labels: StatusLabels::default(),
        }
    }

    /// Read and write statuses with the workspace's own labels.
    pub fn with_labels(mut self, labels: StatusLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Advance `ticket_id` to `target` and then its parent when possible.
    ///
    /// # Returns
    /// `true` only if the ticket itself was updated
    pub fn sync(&self, ticket_id: &str, target: TaskStatus) -> bool {
        let Some(task) = self.fetch(ticket_id, false) else {
            return false;
        };

        if !self.advance(&task, target, self.labels.label(target)) {
            return false;
        }

        if let Some(parent) = &task.parent {
            self.propagate_to_parent(parent);
        }
        true
    }

    /// Mark a ticket and all of its subtasks as released.
    pub fn release(&self, ticket_id: &str) -> bool {
        let Some(task) = self.fetch(ticket_id, true) else {
            return false;
        };

        let label = self.labels.label(TaskStatus::Released);
        let released = self.advance(&task, TaskStatus::Released, label);
        for subtask in task.subtasks.iter().flatten() {
            self.advance(subtask, TaskStatus::Released, label);
        }

        if let Some(parent) = &task.parent {
            self.propagate_to_parent(parent);
        }
        released
    }

    /// A parent follows its least advanced subtask, under that subtask's label.
    fn propagate_to_parent(&self, parent_id: &str) -> bool {
        let Some(parent) = self.fetch(parent_id, true) else {
            return false;
        };

        let subtasks = match parent.subtasks.as_deref() {
            Some(subtasks) if !subtasks.is_empty() => subtasks,
            _ => {
                warn!("Parent task {} came back without subtasks, left as is", parent_id);
                return false;
            }
        };

        let statuses: Option<Vec<(TaskStatus, &str)>> = subtasks
            .iter()
            .map(|subtask| {
                let label = subtask.status.status.as_str();
                self.labels.parse(label).map(|status| (status, label))
            })
            .collect();
        let lowest = statuses
            .and_then(|statuses| statuses.into_iter().min_by_key(|(status, _)| *status));
        match lowest {
            Some((lowest, label)) => self.advance(&parent, lowest, label),
            None => {
                warn!("Parent task {} has a subtask in an unknown status, left as is", parent_id);
                false
            }
        }
    }

    fn fetch(&self, id: &str, with_subtasks: bool) -> Option<Task> {
        match self.tracker.fetch_task(id, with_subtasks) {
            Ok(task) => Some(task),
            Err(e) => {
                error!("Cannot read task {}", id);
                error!("Cause: {}", e);
                None
            }
        }
    }

    fn advance(&self, task: &Task, target: TaskStatus, label: &str) -> bool {
        if !target.advances(self.labels.parse(&task.status.status)) {
            debug!(
                "Task {} is already '{}', not moving it to '{}'",
                task.id, task.status.status, target
            );
            return false;
        }

        match self.tracker.update_status(&task.id, label) {
            Ok(()) => {
                info!("Task {} moved to '{}'", task.id, label);
                true
            }
            Err(e) => {
                error!("Cannot move task {} to '{}'", task.id, label);
                error!("Cause: {}", e);
                false
            }
        }
    }
}
