use crate::domain::TaskStatus;
use crate::tracker::event::PullRequestEvent;

/// Status a pull request moves its ticket towards.
///
/// `Doing` by default, `WaitingForReview` once an assignee is also a requested
/// reviewer, `InCodeReview` when that is the case and a review was submitted.
/// An approval always means `ToRelease`.
pub fn pull_request_status(pr: &PullRequestEvent) -> TaskStatus {
    if pr.review.as_ref().is_some_and(|review| review.is_approved()) {
        return TaskStatus::ToRelease;
    }

    if pr.has_assigned_reviewer() {
        if pr.review.is_some() {
            TaskStatus::InCodeReview
        } else {
            TaskStatus::WaitingForReview
        }
    } else {
        TaskStatus::Doing
    }
}
