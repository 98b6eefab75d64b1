//! Workspace automation rules.
//!
//! # Responsibility
//! - Describe trigger/condition/action rules with typed variants.
//! - Decide whether a rule applies to a task event.
//!
//! # Invariants
//! - Disabled rules never apply.
//! - All conditions must hold for a rule to apply.
//! - Rule evaluation is pure; actions are executed by the state layer.

use super::filter::ComparisonOperator;
use super::task::{Task, TaskPriority, TaskStatus};
use super::{AutomationId, LabelId, UserId, WorkspaceId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task-level event observed by the state layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    Created,
    StatusChanged { from: TaskStatus, to: TaskStatus },
    Assigned { user_id: UserId },
    /// Hours until the due date, never negative.
    DueSoon { hours_left: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum AutomationTrigger {
    TaskCreated,
    /// `to: None` fires on any status change.
    StatusChanged { to: Option<TaskStatus> },
    #[serde(rename_all = "camelCase")]
    DueDateApproaching { within_hours: u32 },
    TaskAssigned,
}

impl AutomationTrigger {
    pub fn matches(&self, event: &TaskEvent) -> bool {
        match (self, event) {
            (Self::TaskCreated, TaskEvent::Created) => true,
            (Self::StatusChanged { to }, TaskEvent::StatusChanged { to: actual, .. }) => {
                to.map_or(true, |expected| expected == *actual)
            }
            (Self::DueDateApproaching { within_hours }, TaskEvent::DueSoon { hours_left }) => {
                (0..=i64::from(*within_hours)).contains(hours_left)
            }
            (Self::TaskAssigned, TaskEvent::Assigned { .. }) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AutomationCondition {
    Status {
        operator: ComparisonOperator,
        value: TaskStatus,
    },
    Priority {
        operator: ComparisonOperator,
        value: TaskPriority,
    },
    Assignee {
        operator: ComparisonOperator,
        value: Option<UserId>,
    },
    /// Compared against the UTC calendar day of the due date.
    DueDate {
        operator: ComparisonOperator,
        value: NaiveDate,
    },
}

impl AutomationCondition {
    pub fn holds(&self, task: &Task) -> bool {
        match self {
            Self::Status { operator, value } => operator.evaluate(&task.status, value),
            Self::Priority { operator, value } => operator.evaluate(&task.priority, value),
            Self::Assignee { operator, value } => operator.evaluate(&task.assigned_to, value),
            Self::DueDate { operator, value } => operator.evaluate(&task.due_day(), value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum AutomationAction {
    UpdateStatus {
        status: TaskStatus,
    },
    #[serde(rename_all = "camelCase")]
    AssignUser {
        user_id: UserId,
    },
    /// `user_id: None` notifies the task assignee, if any.
    #[serde(rename_all = "camelCase")]
    SendNotification {
        user_id: Option<UserId>,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    AddLabel {
        label_id: LabelId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    pub id: AutomationId,
    pub name: String,
    pub trigger: AutomationTrigger,
    pub conditions: Vec<AutomationCondition>,
    pub actions: Vec<AutomationAction>,
    pub workspace_id: WorkspaceId,
    pub enabled: bool,
}

impl Automation {
    /// Creates an enabled rule without conditions or actions.
    pub fn new(
        name: impl Into<String>,
        workspace_id: WorkspaceId,
        trigger: AutomationTrigger,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            trigger,
            conditions: Vec::new(),
            actions: Vec::new(),
            workspace_id,
            enabled: true,
        }
    }

    pub fn with_condition(mut self, condition: AutomationCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_action(mut self, action: AutomationAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Returns whether this rule fires for `event` on `task`.
    pub fn applies_to(&self, event: &TaskEvent, task: &Task) -> bool {
        self.enabled
            && self.trigger.matches(event)
            && self.conditions.iter().all(|condition| condition.holds(task))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Automation, AutomationAction, AutomationCondition, AutomationTrigger, TaskEvent,
    };
    use crate::model::filter::ComparisonOperator;
    use crate::model::task::{Task, TaskPriority, TaskStatus};
    use uuid::Uuid;

    #[test]
    fn status_trigger_without_target_matches_any_change() {
        let trigger = AutomationTrigger::StatusChanged { to: None };
        assert!(trigger.matches(&TaskEvent::StatusChanged {
            from: TaskStatus::Todo,
            to: TaskStatus::InProgress,
        }));
        assert!(!trigger.matches(&TaskEvent::Created));
    }

    #[test]
    fn due_trigger_respects_window() {
        let trigger = AutomationTrigger::DueDateApproaching { within_hours: 24 };
        assert!(trigger.matches(&TaskEvent::DueSoon { hours_left: 3 }));
        assert!(!trigger.matches(&TaskEvent::DueSoon { hours_left: 30 }));
        assert!(!trigger.matches(&TaskEvent::DueSoon { hours_left: -1 }));
    }

    #[test]
    fn disabled_rule_never_applies() {
        let mut rule = Automation::new("auto", Uuid::new_v4(), AutomationTrigger::TaskCreated);
        let task = Task::new("t");
        assert!(rule.applies_to(&TaskEvent::Created, &task));
        rule.enabled = false;
        assert!(!rule.applies_to(&TaskEvent::Created, &task));
    }

    #[test]
    fn failing_condition_blocks_rule() {
        let rule = Automation::new("high only", Uuid::new_v4(), AutomationTrigger::TaskCreated)
            .with_condition(AutomationCondition::Priority {
                operator: ComparisonOperator::Equals,
                value: TaskPriority::High,
            })
            .with_action(AutomationAction::UpdateStatus {
                status: TaskStatus::InProgress,
            });
        assert!(!rule.applies_to(&TaskEvent::Created, &Task::new("medium task")));
    }

    #[test]
    fn trigger_wire_shape_uses_type_and_config() {
        let json =
            serde_json::to_value(AutomationTrigger::DueDateApproaching { within_hours: 12 })
                .unwrap();
        assert_eq!(json["type"], "due_date_approaching");
        assert_eq!(json["config"]["withinHours"], 12);
    }
}
