//! Workspace report.

use crate::model::task::{Task, TaskPriority, TaskStatus};
use crate::model::workspace::Workspace;
use crate::model::UserId;
use std::collections::BTreeMap;

pub const UPCOMING_DEADLINES: usize = 3;
pub const RECENT_TASKS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceReport<'a> {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// 0.0 for an empty workspace.
    pub completion_percent: f64,
    /// Every priority is present, zero counts included.
    pub by_priority: BTreeMap<TaskPriority, usize>,
    /// Task count per assignee id; unassigned tasks are not counted.
    pub workload: BTreeMap<UserId, usize>,
    /// Earliest-due open tasks.
    pub upcoming_deadlines: Vec<&'a Task>,
    /// Last inserted tasks, newest first.
    pub recent: Vec<&'a Task>,
    pub estimated_minutes: u64,
    pub spent_minutes: u64,
}

pub fn workspace_report(workspace: &Workspace) -> WorkspaceReport<'_> {
    let tasks = &workspace.tasks;
    let count = |status: TaskStatus| tasks.iter().filter(|task| task.status == status).count();
    let total = tasks.len();
    let completed = count(TaskStatus::Completed);

    let mut by_priority = TaskPriority::ALL
        .iter()
        .map(|priority| (*priority, 0usize))
        .collect::<BTreeMap<_, _>>();
    let mut workload: BTreeMap<UserId, usize> = BTreeMap::new();
    for task in tasks {
        *by_priority.entry(task.priority).or_default() += 1;
        if let Some(user_id) = task.assigned_to {
            *workload.entry(user_id).or_default() += 1;
        }
    }

    let mut upcoming_deadlines = tasks
        .iter()
        .filter(|task| task.status != TaskStatus::Completed)
        .collect::<Vec<_>>();
    upcoming_deadlines.sort_by_key(|task| task.due_date);
    upcoming_deadlines.truncate(UPCOMING_DEADLINES);

    let recent = tasks.iter().rev().take(RECENT_TASKS).collect();

    WorkspaceReport {
        total,
        todo: count(TaskStatus::Todo),
        in_progress: count(TaskStatus::InProgress),
        completed,
        completion_percent: if total == 0 {
            0.0
        } else {
            completed as f64 * 100.0 / total as f64
        },
        by_priority,
        workload,
        upcoming_deadlines,
        recent,
        estimated_minutes: tasks.iter().map(|task| u64::from(task.time_estimate)).sum(),
        spent_minutes: tasks.iter().map(|task| u64::from(task.time_spent)).sum(),
    }
}
