//! Board columns, archive, filters and reference resolution.

use crate::model::filter::Filter;
use crate::model::label::Label;
use crate::model::notification::Notification;
use crate::model::task::{Task, TaskStatus};
use crate::model::user::User;
use crate::model::workspace::Workspace;
use crate::model::UserId;

/// One kanban column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardColumn<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

/// Groups the workspace's tasks into todo, in-progress and completed
/// columns, in that order.
pub fn board_columns(workspace: &Workspace) -> Vec<BoardColumn<'_>> {
    TaskStatus::ALL
        .iter()
        .map(|status| BoardColumn {
            status: *status,
            tasks: workspace
                .tasks
                .iter()
                .filter(|task| task.status == *status)
                .collect(),
        })
        .collect()
}

/// Completed tasks, which double as the archive.
pub fn archived_tasks(workspace: &Workspace) -> Vec<&Task> {
    workspace
        .tasks
        .iter()
        .filter(|task| task.is_archived())
        .collect()
}

pub fn apply_filter<'a>(tasks: &'a [Task], filter: &Filter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// Unread notifications for `user_id`, newest first.
pub fn unread_notifications(notifications: &[Notification], user_id: UserId) -> Vec<&Notification> {
    let mut unread = notifications
        .iter()
        .rev()
        .filter(|notification| notification.user_id == user_id && !notification.read)
        .collect::<Vec<_>>();
    unread.sort_by(|left, right| right.created_at.cmp(&left.created_at));
    unread
}

/// Returns the assignee, or `None` when unassigned or the user is gone.
pub fn resolve_assignee<'a>(task: &Task, users: &'a [User]) -> Option<&'a User> {
    let user_id = task.assigned_to?;
    users.iter().find(|user| user.id == user_id)
}

/// Resolves the task's label ids in task order, skipping dangling ids.
pub fn resolve_labels<'a>(task: &Task, labels: &'a [Label]) -> Vec<&'a Label> {
    task.labels
        .iter()
        .filter_map(|label_id| labels.iter().find(|label| label.id == *label_id))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistProgress {
    pub completed: usize,
    pub total: usize,
}

impl ChecklistProgress {
    /// Whole percent complete; 0 for an empty checklist.
    pub fn percent(self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let percent = self.completed.saturating_mul(100) / self.total;
        u8::try_from(percent.min(100)).unwrap_or(100)
    }
}

pub fn checklist_progress(task: &Task) -> ChecklistProgress {
    let (completed, total) = task.checklist_progress();
    ChecklistProgress { completed, total }
}
