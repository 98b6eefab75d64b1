//! Command application.
//!
//! # Responsibility
//! - Turn one `Command` into a new `AppState` plus its `Changes`.
//! - Append the activity and notification records each command implies.
//!
//! # Invariants
//! - All work happens on a clone; the receiver is never mutated.
//! - Every mutated collection is marked in `Changes`.
//! - Workspace `updated_at` is refreshed whenever a workspace or one of its
//!   tasks changes.

use super::{AppState, Changes, Command, StateError, Transition};
use crate::model::activity::{Activity, ActivityKind};
use crate::model::automation::TaskEvent;
use crate::model::comment::Comment;
use crate::model::integration::Integration;
use crate::model::label::Label;
use crate::model::notification::{Notification, NotificationKind};
use crate::model::task::{Task, TaskStatus};
use crate::model::time_entry::TimeEntry;
use crate::model::user::User;
use crate::model::workspace::Workspace;
use crate::model::{TaskId, UserId, WorkspaceId};
use crate::repo::collections::Collection;
use log::{debug, warn};
use std::time::Instant;
use uuid::Uuid;

impl AppState {
    /// Applies `command` and returns the resulting state.
    ///
    /// # Errors
    /// - Returns `StateError` when the command's target does not exist or
    ///   the command is otherwise inapplicable; `self` is left unchanged.
    pub fn apply(&self, command: Command) -> Result<Transition, StateError> {
        let started_at = Instant::now();
        let name = command.name();
        let mut next = self.clone();
        let mut changes = Changes::default();

        match next.apply_in_place(command, &mut changes) {
            Ok(created) => {
                debug!(
                    "event=command_apply module=state status=ok command={name} changed={} duration_us={}",
                    changes.len(),
                    started_at.elapsed().as_micros()
                );
                Ok(Transition {
                    state: next,
                    changes,
                    created,
                })
            }
            Err(err) => {
                warn!("event=command_apply module=state status=error command={name} error={err}");
                Err(err)
            }
        }
    }

    fn apply_in_place(
        &mut self,
        command: Command,
        changes: &mut Changes,
    ) -> Result<Option<Uuid>, StateError> {
        match command {
            Command::SetCurrentUser { user } => {
                self.current_user = Some(user);
                changes.mark(Collection::CurrentUser);
                Ok(None)
            }
            Command::CreateWorkspace { name, description } => {
                let workspace = Workspace::new(name, description);
                let workspace_id = workspace.id;
                self.workspaces.push(workspace);
                changes.mark(Collection::Workspaces);
                let actor = self.acting_user();
                self.record_activity(
                    ActivityKind::MemberJoined {},
                    workspace_id,
                    actor,
                    changes,
                );
                Ok(Some(workspace_id))
            }
            Command::UpdateWorkspaceDetails {
                workspace_id,
                name,
                description,
            } => {
                let workspace = self.workspace_mut(workspace_id)?;
                workspace.name = name;
                workspace.description = description;
                workspace.touch();
                changes.mark(Collection::Workspaces);
                Ok(None)
            }
            Command::UpdateWorkspaceSettings {
                workspace_id,
                settings,
            } => {
                let workspace = self.workspace_mut(workspace_id)?;
                workspace.settings = settings;
                workspace.touch();
                changes.mark(Collection::Workspaces);
                Ok(None)
            }
            Command::SetWorkspaceArchived {
                workspace_id,
                archived,
            } => {
                let workspace = self.workspace_mut(workspace_id)?;
                if workspace.is_archived != archived {
                    workspace.is_archived = archived;
                    workspace.touch();
                    changes.mark(Collection::Workspaces);
                }
                Ok(None)
            }
            Command::AddWorkspaceMember {
                workspace_id,
                user_id,
            } => {
                self.ensure_user(user_id)?;
                let workspace = self.workspace_mut(workspace_id)?;
                if workspace.add_member(user_id) {
                    workspace.touch();
                    changes.mark(Collection::Workspaces);
                    self.record_activity(
                        ActivityKind::MemberJoined {},
                        workspace_id,
                        Some(user_id),
                        changes,
                    );
                }
                Ok(None)
            }
            Command::CreateTask {
                workspace_id,
                draft,
            } => {
                let task_id = self.insert_task(workspace_id, Task::from_draft(draft), changes)?;
                Ok(Some(task_id))
            }
            Command::UpdateTask { workspace_id, task } => {
                self.replace_task(workspace_id, task, changes)?;
                Ok(None)
            }
            Command::SetTaskStatus {
                workspace_id,
                task_id,
                status,
            } => {
                self.change_status(workspace_id, task_id, status, changes)?;
                Ok(None)
            }
            Command::ArchiveTask {
                workspace_id,
                task_id,
            } => {
                self.change_status(workspace_id, task_id, TaskStatus::Completed, changes)?;
                Ok(None)
            }
            Command::RestoreTask {
                workspace_id,
                task_id,
            } => {
                self.change_status(workspace_id, task_id, TaskStatus::Todo, changes)?;
                Ok(None)
            }
            Command::ToggleChecklistItem {
                workspace_id,
                task_id,
                item_id,
            } => {
                let workspace = self.workspace_mut(workspace_id)?;
                let task = workspace
                    .task_mut(task_id)
                    .ok_or(StateError::TaskNotFound(task_id))?;
                task.toggle_checklist_item(item_id)
                    .ok_or(StateError::ChecklistItemNotFound(item_id))?;
                let task_title = task.title.clone();
                workspace.touch();
                changes.mark(Collection::Workspaces);
                let actor = self.acting_user();
                self.record_activity(ActivityKind::TaskUpdated { task_title }, task_id, actor, changes);
                Ok(None)
            }
            Command::CreateTaskFromTemplate { template_id } => {
                let template = self
                    .templates
                    .iter()
                    .find(|template| template.id == template_id)
                    .ok_or(StateError::TemplateNotFound(template_id))?;
                let workspace_id = template.workspace_id;
                let task = template.instantiate();
                let task_id = self.insert_task(workspace_id, task, changes)?;
                Ok(Some(task_id))
            }
            Command::AddComment { task_id, content } => {
                let (workspace_id, task) = self.locate_task(task_id)?;
                let task_title = task.title.clone();
                let mut recipients = task.watchers.clone();
                recipients.extend(task.assigned_to);

                let actor = self.acting_user();
                let comment = Comment::new(task_id, actor, content);
                let comment_id = comment.id;
                self.comments.push(comment);
                changes.mark(Collection::Comments);
                self.record_activity(
                    ActivityKind::CommentAdded {
                        task_title,
                        comment_id,
                    },
                    task_id,
                    actor,
                    changes,
                );

                recipients.sort();
                recipients.dedup();
                for recipient in recipients.into_iter().filter(|id| Some(*id) != actor) {
                    self.notify(
                        workspace_id,
                        recipient,
                        NotificationKind::Comment {
                            task_id,
                            comment_id,
                            author_id: actor,
                        },
                        changes,
                    );
                }
                Ok(Some(comment_id))
            }
            Command::StartTimer { task_id } => {
                self.locate_task(task_id)?;
                let entry = TimeEntry::start(task_id, self.acting_user());
                let entry_id = entry.id;
                self.time_entries.push(entry);
                changes.mark(Collection::TimeEntries);
                Ok(Some(entry_id))
            }
            Command::StopTimer { entry_id, at } => {
                let entry = self
                    .time_entries
                    .iter_mut()
                    .find(|entry| entry.id == entry_id)
                    .ok_or(StateError::TimeEntryNotFound(entry_id))?;
                if !entry.is_running() {
                    return Err(StateError::TimerAlreadyStopped(entry_id));
                }
                let minutes = entry.stop(at);
                let task_id = entry.task_id;
                changes.mark(Collection::TimeEntries);

                if let Some(workspace) = self
                    .workspaces
                    .iter_mut()
                    .find(|workspace| workspace.contains_task(task_id))
                {
                    if let Some(task) = workspace.task_mut(task_id) {
                        task.log_minutes(minutes);
                    }
                    workspace.touch();
                    changes.mark(Collection::Workspaces);
                }
                Ok(None)
            }
            Command::AddTeamMember { name, email, role } => {
                let user = User::new(name, email).with_role(role);
                let user_id = user.id;
                self.users.push(user);
                changes.mark(Collection::Users);
                Ok(Some(user_id))
            }
            Command::UpdateTeamMember { user } => {
                let slot = self
                    .users
                    .iter_mut()
                    .find(|existing| existing.id == user.id)
                    .ok_or(StateError::UserNotFound(user.id))?;
                *slot = user.clone();
                changes.mark(Collection::Users);
                if let Some(current) = self.current_user.as_mut() {
                    if current.id == user.id {
                        *current = user;
                        changes.mark(Collection::CurrentUser);
                    }
                }
                Ok(None)
            }
            Command::RemoveTeamMember { user_id } => {
                let index = self
                    .users
                    .iter()
                    .position(|user| user.id == user_id)
                    .ok_or(StateError::UserNotFound(user_id))?;
                self.users.remove(index);
                changes.mark(Collection::Users);
                if self
                    .current_user
                    .as_ref()
                    .is_some_and(|current| current.id == user_id)
                {
                    self.current_user = None;
                    changes.mark(Collection::CurrentUser);
                }
                for workspace in &mut self.workspaces {
                    if workspace.remove_member(user_id) {
                        workspace.touch();
                        changes.mark(Collection::Workspaces);
                    }
                }
                Ok(None)
            }
            Command::CreateLabel {
                workspace_id,
                name,
                color,
            } => {
                self.ensure_workspace(workspace_id)?;
                let label = Label::new(name, color, workspace_id);
                let label_id = label.id;
                self.labels.push(label);
                changes.mark(Collection::Labels);
                Ok(Some(label_id))
            }
            Command::ToggleIntegration { workspace_id, kind } => {
                self.ensure_workspace(workspace_id)?;
                let integration_id = match self.integrations.iter_mut().find(|integration| {
                    integration.workspace_id == workspace_id && integration.kind() == kind
                }) {
                    Some(existing) => {
                        existing.enabled = !existing.enabled;
                        existing.id
                    }
                    None => {
                        let integration = Integration::new(kind, workspace_id);
                        let integration_id = integration.id;
                        self.integrations.push(integration);
                        integration_id
                    }
                };
                changes.mark(Collection::Integrations);
                Ok(Some(integration_id))
            }
            Command::ConfigureIntegration {
                integration_id,
                settings,
            } => {
                let integration = self
                    .integrations
                    .iter_mut()
                    .find(|integration| integration.id == integration_id)
                    .ok_or(StateError::IntegrationNotFound(integration_id))?;
                if integration.kind() != settings.kind() {
                    return Err(StateError::IntegrationKindMismatch {
                        expected: integration.kind(),
                        actual: settings.kind(),
                    });
                }
                integration.settings = settings;
                changes.mark(Collection::Integrations);
                Ok(None)
            }
            Command::CreateAutomation { automation } => {
                self.ensure_workspace(automation.workspace_id)?;
                if self.automations.iter().any(|existing| existing.id == automation.id) {
                    return Err(StateError::DuplicateId(automation.id));
                }
                let automation_id = automation.id;
                self.automations.push(automation);
                changes.mark(Collection::Automations);
                Ok(Some(automation_id))
            }
            Command::SetAutomationEnabled {
                automation_id,
                enabled,
            } => {
                let automation = self
                    .automations
                    .iter_mut()
                    .find(|automation| automation.id == automation_id)
                    .ok_or(StateError::AutomationNotFound(automation_id))?;
                if automation.enabled != enabled {
                    automation.enabled = enabled;
                    changes.mark(Collection::Automations);
                }
                Ok(None)
            }
            Command::CheckDueDates { at } => {
                self.check_due_dates(at, changes);
                Ok(None)
            }
            Command::CreateFilter { filter } => {
                self.ensure_workspace(filter.workspace_id)?;
                if self.filters.iter().any(|existing| existing.id == filter.id) {
                    return Err(StateError::DuplicateId(filter.id));
                }
                let filter_id = filter.id;
                self.filters.push(filter);
                changes.mark(Collection::Filters);
                Ok(Some(filter_id))
            }
            Command::UpdateFilter { filter } => {
                self.ensure_workspace(filter.workspace_id)?;
                let slot = self
                    .filters
                    .iter_mut()
                    .find(|existing| existing.id == filter.id)
                    .ok_or(StateError::FilterNotFound(filter.id))?;
                *slot = filter;
                changes.mark(Collection::Filters);
                Ok(None)
            }
            Command::DeleteFilter { filter_id } => {
                let index = self
                    .filters
                    .iter()
                    .position(|filter| filter.id == filter_id)
                    .ok_or(StateError::FilterNotFound(filter_id))?;
                self.filters.remove(index);
                changes.mark(Collection::Filters);
                Ok(None)
            }
            Command::SaveTemplate { template } => {
                self.ensure_workspace(template.workspace_id)?;
                let template_id = template.id;
                match self
                    .templates
                    .iter_mut()
                    .find(|existing| existing.id == template_id)
                {
                    Some(slot) => *slot = template,
                    None => self.templates.push(template),
                }
                changes.mark(Collection::Templates);
                Ok(Some(template_id))
            }
            Command::MarkNotificationRead { notification_id } => {
                let notification = self
                    .notifications
                    .iter_mut()
                    .find(|notification| notification.id == notification_id)
                    .ok_or(StateError::NotificationNotFound(notification_id))?;
                if !notification.read {
                    notification.read = true;
                    changes.mark(Collection::Notifications);
                }
                Ok(None)
            }
            Command::MarkAllNotificationsRead { user_id } => {
                for notification in self
                    .notifications
                    .iter_mut()
                    .filter(|notification| notification.user_id == user_id && !notification.read)
                {
                    notification.read = true;
                    changes.mark(Collection::Notifications);
                }
                Ok(None)
            }
            Command::ClearNotifications { user_id } => {
                let before = self.notifications.len();
                self.notifications
                    .retain(|notification| notification.user_id != user_id);
                if self.notifications.len() != before {
                    changes.mark(Collection::Notifications);
                }
                Ok(None)
            }
        }
    }

    fn insert_task(
        &mut self,
        workspace_id: WorkspaceId,
        task: Task,
        changes: &mut Changes,
    ) -> Result<TaskId, StateError> {
        let task_id = task.id;
        let task_title = task.title.clone();
        let assignee = task.assigned_to;

        let workspace = self.workspace_mut(workspace_id)?;
        workspace.tasks.push(task);
        workspace.touch();
        changes.mark(Collection::Workspaces);

        let actor = self.acting_user();
        self.record_activity(ActivityKind::TaskCreated { task_title }, task_id, actor, changes);
        self.run_automations(workspace_id, task_id, TaskEvent::Created, changes);

        // Skipped when a creation automation already reassigned the task.
        let still_assigned = self
            .workspace(workspace_id)
            .and_then(|workspace| workspace.task(task_id))
            .and_then(|task| task.assigned_to);
        if let Some(user_id) = assignee.filter(|id| still_assigned == Some(*id)) {
            self.announce_assignment(workspace_id, task_id, user_id, changes);
            self.run_automations(workspace_id, task_id, TaskEvent::Assigned { user_id }, changes);
        }
        Ok(task_id)
    }

    fn replace_task(
        &mut self,
        workspace_id: WorkspaceId,
        task: Task,
        changes: &mut Changes,
    ) -> Result<(), StateError> {
        let task_id = task.id;
        let task_title = task.title.clone();
        let new_status = task.status;
        let new_assignee = task.assigned_to;

        let workspace = self.workspace_mut(workspace_id)?;
        let slot = workspace
            .task_mut(task_id)
            .ok_or(StateError::TaskNotFound(task_id))?;
        let previous = std::mem::replace(slot, task);
        workspace.touch();
        changes.mark(Collection::Workspaces);

        let actor = self.acting_user();
        self.record_activity(
            ActivityKind::TaskUpdated {
                task_title: task_title.clone(),
            },
            task_id,
            actor,
            changes,
        );

        if previous.status != new_status {
            self.announce_status_change(
                workspace_id,
                task_id,
                task_title,
                previous.status,
                new_status,
                changes,
            );
            self.run_automations(
                workspace_id,
                task_id,
                TaskEvent::StatusChanged {
                    from: previous.status,
                    to: new_status,
                },
                changes,
            );
        }

        if let Some(user_id) = new_assignee.filter(|id| previous.assigned_to != Some(*id)) {
            self.announce_assignment(workspace_id, task_id, user_id, changes);
            self.run_automations(workspace_id, task_id, TaskEvent::Assigned { user_id }, changes);
        }
        Ok(())
    }

    fn change_status(
        &mut self,
        workspace_id: WorkspaceId,
        task_id: TaskId,
        status: TaskStatus,
        changes: &mut Changes,
    ) -> Result<(), StateError> {
        let Some((previous, task_title)) =
            self.write_status(workspace_id, task_id, status, changes)?
        else {
            return Ok(());
        };
        self.announce_status_change(workspace_id, task_id, task_title, previous, status, changes);
        self.run_automations(
            workspace_id,
            task_id,
            TaskEvent::StatusChanged {
                from: previous,
                to: status,
            },
            changes,
        );
        Ok(())
    }

    /// Sets the status and returns `(previous, title)`, or `None` when the
    /// status was already `status`.
    pub(super) fn write_status(
        &mut self,
        workspace_id: WorkspaceId,
        task_id: TaskId,
        status: TaskStatus,
        changes: &mut Changes,
    ) -> Result<Option<(TaskStatus, String)>, StateError> {
        let workspace = self.workspace_mut(workspace_id)?;
        let task = workspace
            .task_mut(task_id)
            .ok_or(StateError::TaskNotFound(task_id))?;
        if task.status == status {
            return Ok(None);
        }
        let previous = std::mem::replace(&mut task.status, status);
        let task_title = task.title.clone();
        workspace.touch();
        changes.mark(Collection::Workspaces);
        Ok(Some((previous, task_title)))
    }

    /// Records the status activity and notifies watchers.
    pub(super) fn announce_status_change(
        &mut self,
        workspace_id: WorkspaceId,
        task_id: TaskId,
        task_title: String,
        previous_status: TaskStatus,
        new_status: TaskStatus,
        changes: &mut Changes,
    ) {
        let actor = self.acting_user();
        self.record_activity(
            ActivityKind::StatusChanged {
                task_title: task_title.clone(),
                previous_status,
                new_status,
            },
            task_id,
            actor,
            changes,
        );

        let watchers = self
            .workspace(workspace_id)
            .and_then(|workspace| workspace.task(task_id))
            .map(|task| task.watchers.clone())
            .unwrap_or_default();
        for watcher in watchers.into_iter().filter(|id| Some(*id) != actor) {
            self.notify(
                workspace_id,
                watcher,
                NotificationKind::StatusChange {
                    task_id,
                    task_title: task_title.clone(),
                    new_status,
                },
                changes,
            );
        }
    }

    pub(super) fn announce_assignment(
        &mut self,
        workspace_id: WorkspaceId,
        task_id: TaskId,
        user_id: UserId,
        changes: &mut Changes,
    ) {
        let Some(task_title) = self
            .workspace(workspace_id)
            .and_then(|workspace| workspace.task(task_id))
            .map(|task| task.title.clone())
        else {
            return;
        };
        self.notify(
            workspace_id,
            user_id,
            NotificationKind::Assignment {
                task_id,
                task_title,
            },
            changes,
        );
    }

    pub(super) fn record_activity(
        &mut self,
        kind: ActivityKind,
        entity_id: Uuid,
        user_id: Option<UserId>,
        changes: &mut Changes,
    ) {
        self.activities.push(Activity::new(kind, entity_id, user_id));
        changes.mark(Collection::Activities);
    }

    /// Appends a notification unless the workspace has notifications
    /// disabled or the recipient already has an identical unread one.
    pub(super) fn notify(
        &mut self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        kind: NotificationKind,
        changes: &mut Changes,
    ) {
        let enabled = self
            .workspace(workspace_id)
            .is_some_and(|workspace| workspace.settings.notifications_enabled);
        if !enabled {
            return;
        }
        let duplicate = self.notifications.iter().any(|existing| {
            !existing.read && existing.user_id == user_id && existing.kind == kind
        });
        if duplicate {
            return;
        }
        self.notifications.push(Notification::new(user_id, kind));
        changes.mark(Collection::Notifications);
    }

    fn workspace_mut(&mut self, workspace_id: WorkspaceId) -> Result<&mut Workspace, StateError> {
        self.workspaces
            .iter_mut()
            .find(|workspace| workspace.id == workspace_id)
            .ok_or(StateError::WorkspaceNotFound(workspace_id))
    }

    fn ensure_workspace(&self, workspace_id: WorkspaceId) -> Result<(), StateError> {
        self.workspace(workspace_id)
            .map(|_| ())
            .ok_or(StateError::WorkspaceNotFound(workspace_id))
    }

    fn ensure_user(&self, user_id: UserId) -> Result<(), StateError> {
        self.user(user_id)
            .map(|_| ())
            .ok_or(StateError::UserNotFound(user_id))
    }

    fn locate_task(&self, task_id: TaskId) -> Result<(WorkspaceId, &Task), StateError> {
        self.workspaces
            .iter()
            .find_map(|workspace| workspace.task(task_id).map(|task| (workspace.id, task)))
            .ok_or(StateError::TaskNotFound(task_id))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::activity::ActivityKind;
    use crate::model::task::{TaskDraft, TaskStatus};
    use crate::model::user::UserRole;
    use crate::repo::collections::Collection;
    use crate::state::{AppState, Command, StateError};
    use uuid::Uuid;

    #[test]
    fn failed_command_leaves_state_untouched() {
        let state = AppState::default();
        let err = state
            .apply(Command::CreateTask {
                workspace_id: Uuid::new_v4(),
                draft: TaskDraft::titled("orphan"),
            })
            .unwrap_err();
        assert!(matches!(err, StateError::WorkspaceNotFound(_)));
        assert_eq!(state, AppState::default());
    }

    #[test]
    fn create_task_marks_workspace_and_activity_collections() {
        let created = AppState::default()
            .apply(Command::CreateWorkspace {
                name: "Ops".to_string(),
                description: String::new(),
            })
            .unwrap();
        let workspace_id = created.created.unwrap();

        let transition = created
            .state
            .apply(Command::CreateTask {
                workspace_id,
                draft: TaskDraft::titled("rotate keys"),
            })
            .unwrap();

        assert!(transition.changes.contains(Collection::Workspaces));
        assert!(transition.changes.contains(Collection::Activities));
        assert!(!transition.changes.contains(Collection::Users));
        let last = transition.state.activities.last().unwrap();
        assert_eq!(
            last.kind,
            ActivityKind::TaskCreated {
                task_title: "rotate keys".to_string()
            }
        );
        assert_eq!(Some(last.entity_id), transition.created);
    }

    #[test]
    fn setting_same_status_is_a_no_op() {
        let created = AppState::default()
            .apply(Command::CreateWorkspace {
                name: "Ops".to_string(),
                description: String::new(),
            })
            .unwrap();
        let workspace_id = created.created.unwrap();
        let with_task = created
            .state
            .apply(Command::CreateTask {
                workspace_id,
                draft: TaskDraft::titled("noop"),
            })
            .unwrap();
        let task_id = with_task.created.unwrap();

        let transition = with_task
            .state
            .apply(Command::SetTaskStatus {
                workspace_id,
                task_id,
                status: TaskStatus::Todo,
            })
            .unwrap();
        assert!(transition.changes.is_empty());
        assert_eq!(transition.state, with_task.state);
    }

    #[test]
    fn removing_current_user_clears_it() {
        let added = AppState::default()
            .apply(Command::AddTeamMember {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                role: UserRole::Admin,
            })
            .unwrap();
        let user_id = added.created.unwrap();
        let user = added.state.user(user_id).cloned().unwrap();
        let current = added
            .state
            .apply(Command::SetCurrentUser { user })
            .unwrap()
            .state;

        let transition = current
            .apply(Command::RemoveTeamMember { user_id })
            .unwrap();
        assert!(transition.state.users.is_empty());
        assert_eq!(transition.state.current_user, None);
        assert_eq!(transition.state.acting_user(), None);
        assert!(transition.changes.contains(Collection::CurrentUser));
    }
}
