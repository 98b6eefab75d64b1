//! Task domain model.
//!
//! # Responsibility
//! - Define the task record owned by a workspace.
//! - Provide the partial-task draft used by creation and templates.
//!
//! # Invariants
//! - `labels` and `watchers` behave as sets: helpers never insert duplicates.
//! - Time estimate and time spent are whole minutes and never negative.
//! - Archiving a task is a transition to `TaskStatus::Completed`.

use super::{LabelId, TaskId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Board column a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Board column order.
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::InProgress, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Document,
    Link,
}

/// File or link attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, url: impl Into<String>, kind: AttachmentKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            url: url.into(),
            kind,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub content: String,
    pub completed: bool,
}

impl ChecklistItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            completed: false,
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Dangling ids are tolerated and resolve to no user at read time.
    #[serde(default, deserialize_with = "crate::model::optional_id::deserialize")]
    pub assigned_to: Option<UserId>,
    pub labels: Vec<LabelId>,
    pub attachments: Vec<Attachment>,
    pub checklist: Vec<ChecklistItem>,
    /// Minutes.
    pub time_estimate: u32,
    /// Minutes.
    pub time_spent: u32,
    pub watchers: Vec<UserId>,
}

/// Partial task used by creation requests and templates.
///
/// Fields left as `None` take the factory defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::model::optional_id::deserialize"
    )]
    pub assigned_to: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<LabelId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_estimate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watchers: Option<Vec<UserId>>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl Task {
    /// Creates a todo task with medium priority, due now.
    pub fn new(title: impl Into<String>) -> Self {
        Self::from_draft(TaskDraft::titled(title))
    }

    /// Creates a task from a draft overlay on top of the defaults.
    ///
    /// # Invariants
    /// - A fresh id and creation timestamp are always generated.
    /// - No field is validated: empty titles, past due dates and unknown
    ///   assignees are accepted.
    pub fn from_draft(draft: TaskDraft) -> Self {
        let now = Utc::now();
        let mut task = Self {
            id: Uuid::new_v4(),
            title: draft.title.unwrap_or_default(),
            description: draft.description.unwrap_or_default(),
            status: draft.status.unwrap_or(TaskStatus::Todo),
            priority: draft.priority.unwrap_or(TaskPriority::Medium),
            due_date: draft.due_date.unwrap_or(now),
            created_at: now,
            assigned_to: draft.assigned_to,
            labels: Vec::new(),
            attachments: draft.attachments.unwrap_or_default(),
            checklist: draft.checklist.unwrap_or_default(),
            time_estimate: draft.time_estimate.unwrap_or(0),
            time_spent: 0,
            watchers: Vec::new(),
        };
        for label_id in draft.labels.unwrap_or_default() {
            task.add_label(label_id);
        }
        for user_id in draft.watchers.unwrap_or_default() {
            task.add_watcher(user_id);
        }
        task
    }

    /// Adds a label id; returns `false` when it was already present.
    pub fn add_label(&mut self, label_id: LabelId) -> bool {
        if self.labels.contains(&label_id) {
            return false;
        }
        self.labels.push(label_id);
        true
    }

    pub fn remove_label(&mut self, label_id: LabelId) -> bool {
        let before = self.labels.len();
        self.labels.retain(|id| *id != label_id);
        before != self.labels.len()
    }

    /// Adds a watcher id; returns `false` when it was already present.
    pub fn add_watcher(&mut self, user_id: UserId) -> bool {
        if self.watchers.contains(&user_id) {
            return false;
        }
        self.watchers.push(user_id);
        true
    }

    /// Flips one checklist item; returns `None` when the item is unknown.
    pub fn toggle_checklist_item(&mut self, item_id: Uuid) -> Option<bool> {
        let item = self.checklist.iter_mut().find(|item| item.id == item_id)?;
        item.completed = !item.completed;
        Some(item.completed)
    }

    /// Returns `(completed, total)` checklist counts.
    pub fn checklist_progress(&self) -> (usize, usize) {
        let completed = self.checklist.iter().filter(|item| item.completed).count();
        (completed, self.checklist.len())
    }

    pub fn is_archived(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// UTC calendar day of the due date.
    pub fn due_day(&self) -> NaiveDate {
        self.due_date.date_naive()
    }

    /// Adds tracked minutes, saturating at `u32::MAX`.
    pub fn log_minutes(&mut self, minutes: u32) {
        self.time_spent = self.time_spent.saturating_add(minutes);
    }
}
