//! Workspace domain model.
//!
//! # Responsibility
//! - Define the top-level container that owns tasks and lists members.
//!
//! # Invariants
//! - `tasks` is the sole owner of its task records.
//! - `members` holds user id references in join order without duplicates.
//! - `updated_at` is refreshed by every state transition touching the record.

use super::task::Task;
use super::{TaskId, UserId, WorkspaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_ICON: &str = "📋";
const DEFAULT_COLOR: &str = "#6366F1";

/// View opened by default for a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceView {
    Board,
    List,
    Calendar,
    Timeline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettings {
    pub default_view: WorkspaceView,
    pub allow_guest_access: bool,
    /// Gates every notification emitted for this workspace.
    pub notifications_enabled: bool,
    pub auto_archive_completed: bool,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            default_view: WorkspaceView::Board,
            allow_guest_access: false,
            notifications_enabled: true,
            auto_archive_completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub description: String,
    pub tasks: Vec<Task>,
    pub members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub icon: String,
    pub color: String,
    pub is_archived: bool,
    pub settings: WorkspaceSettings,
}

impl Workspace {
    /// Creates an empty, active workspace with default settings.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            tasks: Vec::new(),
            members: Vec::new(),
            created_at: now,
            updated_at: now,
            icon: DEFAULT_ICON.to_string(),
            color: DEFAULT_COLOR.to_string(),
            is_archived: false,
            settings: WorkspaceSettings::default(),
        }
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }

    pub fn contains_task(&self, task_id: TaskId) -> bool {
        self.task(task_id).is_some()
    }

    pub fn has_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    /// Appends a member; returns `false` when already present.
    pub fn add_member(&mut self, user_id: UserId) -> bool {
        if self.has_member(user_id) {
            return false;
        }
        self.members.push(user_id);
        true
    }

    pub fn remove_member(&mut self, user_id: UserId) -> bool {
        let before = self.members.len();
        self.members.retain(|id| *id != user_id);
        before != self.members.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
