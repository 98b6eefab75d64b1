//! User commands and transition errors.

use crate::model::automation::Automation;
use crate::model::filter::Filter;
use crate::model::integration::{IntegrationKind, IntegrationSettings};
use crate::model::task::{Task, TaskDraft, TaskStatus};
use crate::model::template::Template;
use crate::model::user::{User, UserRole};
use crate::model::workspace::WorkspaceSettings;
use crate::model::{
    AutomationId, FilterId, IntegrationId, NotificationId, TaskId, TemplateId, TimeEntryId,
    UserId, WorkspaceId,
};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// One user action against the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetCurrentUser {
        user: User,
    },
    CreateWorkspace {
        name: String,
        description: String,
    },
    UpdateWorkspaceDetails {
        workspace_id: WorkspaceId,
        name: String,
        description: String,
    },
    UpdateWorkspaceSettings {
        workspace_id: WorkspaceId,
        settings: WorkspaceSettings,
    },
    SetWorkspaceArchived {
        workspace_id: WorkspaceId,
        archived: bool,
    },
    AddWorkspaceMember {
        workspace_id: WorkspaceId,
        user_id: UserId,
    },
    CreateTask {
        workspace_id: WorkspaceId,
        draft: TaskDraft,
    },
    /// Structural replacement of an existing task.
    UpdateTask {
        workspace_id: WorkspaceId,
        task: Task,
    },
    SetTaskStatus {
        workspace_id: WorkspaceId,
        task_id: TaskId,
        status: TaskStatus,
    },
    /// Moves the task to `Completed`.
    ArchiveTask {
        workspace_id: WorkspaceId,
        task_id: TaskId,
    },
    /// Moves an archived task back to `Todo`.
    RestoreTask {
        workspace_id: WorkspaceId,
        task_id: TaskId,
    },
    ToggleChecklistItem {
        workspace_id: WorkspaceId,
        task_id: TaskId,
        item_id: Uuid,
    },
    CreateTaskFromTemplate {
        template_id: TemplateId,
    },
    AddComment {
        task_id: TaskId,
        content: String,
    },
    StartTimer {
        task_id: TaskId,
    },
    StopTimer {
        entry_id: TimeEntryId,
        at: DateTime<Utc>,
    },
    AddTeamMember {
        name: String,
        email: String,
        role: UserRole,
    },
    UpdateTeamMember {
        user: User,
    },
    RemoveTeamMember {
        user_id: UserId,
    },
    CreateLabel {
        workspace_id: WorkspaceId,
        name: String,
        color: String,
    },
    ToggleIntegration {
        workspace_id: WorkspaceId,
        kind: IntegrationKind,
    },
    ConfigureIntegration {
        integration_id: IntegrationId,
        settings: IntegrationSettings,
    },
    CreateAutomation {
        automation: Automation,
    },
    SetAutomationEnabled {
        automation_id: AutomationId,
        enabled: bool,
    },
    /// Emits due-soon notifications and fires due-date automations.
    CheckDueDates {
        at: DateTime<Utc>,
    },
    CreateFilter {
        filter: Filter,
    },
    UpdateFilter {
        filter: Filter,
    },
    DeleteFilter {
        filter_id: FilterId,
    },
    /// Inserts or replaces a template by id.
    SaveTemplate {
        template: Template,
    },
    MarkNotificationRead {
        notification_id: NotificationId,
    },
    MarkAllNotificationsRead {
        user_id: UserId,
    },
    ClearNotifications {
        user_id: UserId,
    },
}

impl Command {
    /// Stable name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetCurrentUser { .. } => "set_current_user",
            Self::CreateWorkspace { .. } => "create_workspace",
            Self::UpdateWorkspaceDetails { .. } => "update_workspace_details",
            Self::UpdateWorkspaceSettings { .. } => "update_workspace_settings",
            Self::SetWorkspaceArchived { .. } => "set_workspace_archived",
            Self::AddWorkspaceMember { .. } => "add_workspace_member",
            Self::CreateTask { .. } => "create_task",
            Self::UpdateTask { .. } => "update_task",
            Self::SetTaskStatus { .. } => "set_task_status",
            Self::ArchiveTask { .. } => "archive_task",
            Self::RestoreTask { .. } => "restore_task",
            Self::ToggleChecklistItem { .. } => "toggle_checklist_item",
            Self::CreateTaskFromTemplate { .. } => "create_task_from_template",
            Self::AddComment { .. } => "add_comment",
            Self::StartTimer { .. } => "start_timer",
            Self::StopTimer { .. } => "stop_timer",
            Self::AddTeamMember { .. } => "add_team_member",
            Self::UpdateTeamMember { .. } => "update_team_member",
            Self::RemoveTeamMember { .. } => "remove_team_member",
            Self::CreateLabel { .. } => "create_label",
            Self::ToggleIntegration { .. } => "toggle_integration",
            Self::ConfigureIntegration { .. } => "configure_integration",
            Self::CreateAutomation { .. } => "create_automation",
            Self::SetAutomationEnabled { .. } => "set_automation_enabled",
            Self::CheckDueDates { .. } => "check_due_dates",
            Self::CreateFilter { .. } => "create_filter",
            Self::UpdateFilter { .. } => "update_filter",
            Self::DeleteFilter { .. } => "delete_filter",
            Self::SaveTemplate { .. } => "save_template",
            Self::MarkNotificationRead { .. } => "mark_notification_read",
            Self::MarkAllNotificationsRead { .. } => "mark_all_notifications_read",
            Self::ClearNotifications { .. } => "clear_notifications",
        }
    }
}

/// Errors from applying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    WorkspaceNotFound(WorkspaceId),
    TaskNotFound(TaskId),
    ChecklistItemNotFound(Uuid),
    UserNotFound(UserId),
    TemplateNotFound(TemplateId),
    TimeEntryNotFound(TimeEntryId),
    TimerAlreadyStopped(TimeEntryId),
    IntegrationNotFound(IntegrationId),
    /// New settings belong to a different integration kind.
    IntegrationKindMismatch {
        expected: IntegrationKind,
        actual: IntegrationKind,
    },
    AutomationNotFound(AutomationId),
    FilterNotFound(FilterId),
    NotificationNotFound(NotificationId),
    /// A create command reused an id already present in its collection.
    DuplicateId(Uuid),
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WorkspaceNotFound(id) => write!(f, "workspace not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::ChecklistItemNotFound(id) => write!(f, "checklist item not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::TemplateNotFound(id) => write!(f, "template not found: {id}"),
            Self::TimeEntryNotFound(id) => write!(f, "time entry not found: {id}"),
            Self::TimerAlreadyStopped(id) => write!(f, "time entry already stopped: {id}"),
            Self::IntegrationNotFound(id) => write!(f, "integration not found: {id}"),
            Self::IntegrationKindMismatch { expected, actual } => write!(
                f,
                "integration settings for {} cannot configure {}",
                actual.display_name(),
                expected.display_name()
            ),
            Self::AutomationNotFound(id) => write!(f, "automation not found: {id}"),
            Self::FilterNotFound(id) => write!(f, "filter not found: {id}"),
            Self::NotificationNotFound(id) => write!(f, "notification not found: {id}"),
            Self::DuplicateId(id) => write!(f, "record id already exists: {id}"),
        }
    }
}

impl Error for StateError {}
