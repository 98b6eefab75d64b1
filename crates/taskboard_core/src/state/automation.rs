//! Automation execution and due-date sweeps.
//!
//! # Invariants
//! - Changes made by automation actions never re-trigger automations.
//! - Rules are evaluated against the task as it was when the event fired.

use super::{AppState, Changes};
use crate::model::automation::{AutomationAction, TaskEvent};
use crate::model::notification::NotificationKind;
use crate::model::task::{Task, TaskStatus};
use crate::model::{AutomationId, TaskId, WorkspaceId};
use crate::repo::collections::Collection;
use chrono::{DateTime, Duration, Utc};
use log::info;

/// Tasks due within this many hours produce a due-soon notification.
pub const DUE_SOON_WINDOW_HOURS: i64 = 24;

impl AppState {
    pub(super) fn run_automations(
        &mut self,
        workspace_id: WorkspaceId,
        task_id: TaskId,
        event: TaskEvent,
        changes: &mut Changes,
    ) {
        let Some(task) = self
            .workspace(workspace_id)
            .and_then(|workspace| workspace.task(task_id))
        else {
            return;
        };
        let rules = self
            .automations
            .iter()
            .filter(|rule| rule.workspace_id == workspace_id && rule.applies_to(&event, task))
            .cloned()
            .collect::<Vec<_>>();

        for rule in rules {
            info!(
                "event=automation_fire module=state status=ok automation_id={} task_id={} actions={}",
                rule.id,
                task_id,
                rule.actions.len()
            );
            for action in &rule.actions {
                self.execute_action(workspace_id, task_id, rule.id, action, changes);
            }
        }
    }

    fn execute_action(
        &mut self,
        workspace_id: WorkspaceId,
        task_id: TaskId,
        automation_id: AutomationId,
        action: &AutomationAction,
        changes: &mut Changes,
    ) {
        match action {
            AutomationAction::UpdateStatus { status } => {
                if let Ok(Some((previous, task_title))) =
                    self.write_status(workspace_id, task_id, *status, changes)
                {
                    self.announce_status_change(
                        workspace_id,
                        task_id,
                        task_title,
                        previous,
                        *status,
                        changes,
                    );
                }
            }
            AutomationAction::AssignUser { user_id } => {
                let assigned = self.with_task(workspace_id, task_id, changes, |task| {
                    if task.assigned_to == Some(*user_id) {
                        false
                    } else {
                        task.assigned_to = Some(*user_id);
                        true
                    }
                });
                if assigned {
                    self.announce_assignment(workspace_id, task_id, *user_id, changes);
                }
            }
            AutomationAction::SendNotification { user_id, message } => {
                let recipient = user_id.or_else(|| {
                    self.workspace(workspace_id)
                        .and_then(|workspace| workspace.task(task_id))
                        .and_then(|task| task.assigned_to)
                });
                if let Some(recipient) = recipient {
                    self.notify(
                        workspace_id,
                        recipient,
                        NotificationKind::Automation {
                            automation_id,
                            task_id,
                            message: message.clone(),
                        },
                        changes,
                    );
                }
            }
            AutomationAction::AddLabel { label_id } => {
                self.with_task(workspace_id, task_id, changes, |task| {
                    task.add_label(*label_id)
                });
            }
        }
    }

    /// Runs `edit` on the task and marks the workspace dirty when it
    /// reports a change.
    fn with_task(
        &mut self,
        workspace_id: WorkspaceId,
        task_id: TaskId,
        changes: &mut Changes,
        edit: impl FnOnce(&mut Task) -> bool,
    ) -> bool {
        let Some(workspace) = self
            .workspaces
            .iter_mut()
            .find(|workspace| workspace.id == workspace_id)
        else {
            return false;
        };
        let Some(task) = workspace.task_mut(task_id) else {
            return false;
        };
        if !edit(task) {
            return false;
        }
        workspace.touch();
        changes.mark(Collection::Workspaces);
        true
    }

    /// Notifies assignees of open tasks due within `DUE_SOON_WINDOW_HOURS`
    /// and feeds every open, not yet overdue task to due-date automations.
    pub(super) fn check_due_dates(&mut self, at: DateTime<Utc>, changes: &mut Changes) {
        let window = Duration::hours(DUE_SOON_WINDOW_HOURS);
        let candidates = self
            .workspaces
            .iter()
            .filter(|workspace| !workspace.is_archived)
            .flat_map(|workspace| {
                workspace
                    .tasks
                    .iter()
                    .filter(|task| task.status != TaskStatus::Completed)
                    .map(move |task| (workspace.id, task.clone()))
            })
            .collect::<Vec<_>>();

        let mut due_soon = 0usize;
        for (workspace_id, task) in candidates {
            let remaining = task.due_date - at;
            if remaining < Duration::zero() {
                continue;
            }
            if remaining <= window {
                due_soon += 1;
                if let Some(assignee) = task.assigned_to {
                    self.notify(
                        workspace_id,
                        assignee,
                        NotificationKind::DueSoon {
                            task_id: task.id,
                            task_title: task.title.clone(),
                            due_date: task.due_date,
                        },
                        changes,
                    );
                }
            }
            self.run_automations(
                workspace_id,
                task.id,
                TaskEvent::DueSoon {
                    hours_left: remaining.num_hours(),
                },
                changes,
            );
        }
        info!("event=due_check module=state status=ok due_soon={due_soon}");
    }
}

#[cfg(test)]
mod tests {
    use super::DUE_SOON_WINDOW_HOURS;
    use crate::model::automation::{Automation, AutomationAction, AutomationTrigger};
    use crate::model::notification::NotificationKind;
    use crate::model::task::{TaskDraft, TaskStatus};
    use crate::model::user::UserRole;
    use crate::state::{AppState, Command};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn board() -> (AppState, Uuid, Uuid) {
        let state = AppState::default()
            .apply(Command::AddTeamMember {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                role: UserRole::Admin,
            })
            .unwrap();
        let user_id = state.created.unwrap();
        let state = state
            .state
            .apply(Command::CreateWorkspace {
                name: "Launch".to_string(),
                description: String::new(),
            })
            .unwrap();
        let workspace_id = state.created.unwrap();
        (state.state, workspace_id, user_id)
    }

    #[test]
    fn created_trigger_moves_task_to_in_progress() {
        let (state, workspace_id, _) = board();
        let rule = Automation::new("start", workspace_id, AutomationTrigger::TaskCreated)
            .with_action(AutomationAction::UpdateStatus {
                status: TaskStatus::InProgress,
            });
        let state = state
            .apply(Command::CreateAutomation { automation: rule })
            .unwrap()
            .state;

        let transition = state
            .apply(Command::CreateTask {
                workspace_id,
                draft: TaskDraft::titled("auto"),
            })
            .unwrap();
        let task_id = transition.created.unwrap();
        let task = transition
            .state
            .workspace(workspace_id)
            .and_then(|workspace| workspace.task(task_id))
            .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn automation_status_change_does_not_cascade() {
        let (state, workspace_id, _) = board();
        let first = Automation::new("start", workspace_id, AutomationTrigger::TaskCreated)
            .with_action(AutomationAction::UpdateStatus {
                status: TaskStatus::InProgress,
            });
        let second = Automation::new(
            "finish",
            workspace_id,
            AutomationTrigger::StatusChanged {
                to: Some(TaskStatus::InProgress),
            },
        )
        .with_action(AutomationAction::UpdateStatus {
            status: TaskStatus::Completed,
        });
        let state = state
            .apply(Command::CreateAutomation { automation: first })
            .unwrap()
            .state
            .apply(Command::CreateAutomation { automation: second })
            .unwrap()
            .state;

        let transition = state
            .apply(Command::CreateTask {
                workspace_id,
                draft: TaskDraft::titled("once"),
            })
            .unwrap();
        let task_id = transition.created.unwrap();
        let status = transition
            .state
            .workspace(workspace_id)
            .and_then(|workspace| workspace.task(task_id))
            .map(|task| task.status);
        assert_eq!(status, Some(TaskStatus::InProgress));
    }

    #[test]
    fn creation_reassignment_notifies_only_final_assignee() {
        let (state, workspace_id, ada) = board();
        let transition = state
            .apply(Command::AddTeamMember {
                name: "Bob".to_string(),
                email: "bob@example.com".to_string(),
                role: UserRole::Member,
            })
            .unwrap();
        let bob = transition.created.unwrap();
        let rule = Automation::new("route", workspace_id, AutomationTrigger::TaskCreated)
            .with_action(AutomationAction::AssignUser { user_id: bob });
        let state = transition
            .state
            .apply(Command::CreateAutomation { automation: rule })
            .unwrap()
            .state;

        let transition = state
            .apply(Command::CreateTask {
                workspace_id,
                draft: TaskDraft {
                    assigned_to: Some(ada),
                    ..TaskDraft::titled("triage")
                },
            })
            .unwrap();
        let task_id = transition.created.unwrap();
        let assignee = transition
            .state
            .workspace(workspace_id)
            .and_then(|workspace| workspace.task(task_id))
            .and_then(|task| task.assigned_to);
        assert_eq!(assignee, Some(bob));

        let assigned_to = transition
            .state
            .notifications
            .iter()
            .filter(|notification| matches!(notification.kind, NotificationKind::Assignment { .. }))
            .map(|notification| notification.user_id)
            .collect::<Vec<_>>();
        assert_eq!(assigned_to, vec![bob]);
    }

    #[test]
    fn due_sweep_notifies_assignee_once() {
        let (state, workspace_id, user_id) = board();
        let now = Utc::now();
        let draft = TaskDraft {
            assigned_to: Some(user_id),
            due_date: Some(now + Duration::hours(DUE_SOON_WINDOW_HOURS - 2)),
            ..TaskDraft::titled("ship")
        };
        let state = state
            .apply(Command::CreateTask {
                workspace_id,
                draft,
            })
            .unwrap()
            .state;

        let swept = state
            .apply(Command::CheckDueDates { at: now })
            .unwrap()
            .state
            .apply(Command::CheckDueDates { at: now })
            .unwrap()
            .state;
        let due_soon = swept
            .notifications
            .iter()
            .filter(|notification| matches!(notification.kind, NotificationKind::DueSoon { .. }))
            .count();
        assert_eq!(due_soon, 1);
    }

    #[test]
    fn due_sweep_skips_overdue_and_distant_tasks() {
        let (state, workspace_id, user_id) = board();
        let now = Utc::now();
        let mut state = state;
        for offset in [-3, DUE_SOON_WINDOW_HOURS * 3] {
            let draft = TaskDraft {
                assigned_to: Some(user_id),
                due_date: Some(now + Duration::hours(offset)),
                ..TaskDraft::titled("later")
            };
            state = state
                .apply(Command::CreateTask {
                    workspace_id,
                    draft,
                })
                .unwrap()
                .state;
        }

        let swept = state.apply(Command::CheckDueDates { at: now }).unwrap();
        assert!(swept
            .state
            .notifications
            .iter()
            .all(|notification| !matches!(notification.kind, NotificationKind::DueSoon { .. })));
    }
}
