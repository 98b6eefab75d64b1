//! Saved task filters.
//!
//! # Invariants
//! - A filter matches a task only when every condition holds.
//! - A filter with no conditions matches every task.
//! - Date conditions compare UTC calendar days, bounds inclusive.

use super::task::{Task, TaskPriority, TaskStatus};
use super::{FilterId, LabelId, UserId, WorkspaceId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordering comparison shared by filter and automation conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    Greater,
    Less,
}

impl ComparisonOperator {
    pub fn evaluate<T: Ord>(self, actual: &T, expected: &T) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::NotEquals => actual != expected,
            Self::Greater => actual > expected,
            Self::Less => actual < expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum FilterCondition {
    Status {
        value: TaskStatus,
    },
    Priority {
        operator: ComparisonOperator,
        value: TaskPriority,
    },
    /// `None` selects unassigned tasks.
    Assignee {
        value: Option<UserId>,
    },
    DueBefore {
        value: NaiveDate,
    },
    DueAfter {
        value: NaiveDate,
    },
    DueBetween {
        start: NaiveDate,
        end: NaiveDate,
    },
    Label {
        value: LabelId,
    },
    /// Case-insensitive substring match on the title.
    TitleContains {
        value: String,
    },
}

impl FilterCondition {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::Status { value } => task.status == *value,
            Self::Priority { operator, value } => operator.evaluate(&task.priority, value),
            Self::Assignee { value } => task.assigned_to == *value,
            Self::DueBefore { value } => task.due_day() <= *value,
            Self::DueAfter { value } => task.due_day() >= *value,
            Self::DueBetween { start, end } => {
                let day = task.due_day();
                *start <= day && day <= *end
            }
            Self::Label { value } => task.labels.contains(value),
            Self::TitleContains { value } => task
                .title
                .to_lowercase()
                .contains(value.to_lowercase().as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub id: FilterId,
    pub name: String,
    pub conditions: Vec<FilterCondition>,
    pub workspace_id: WorkspaceId,
    pub is_default: bool,
}

impl Filter {
    pub fn new(name: impl Into<String>, workspace_id: WorkspaceId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            conditions: Vec::new(),
            workspace_id,
            is_default: false,
        }
    }

    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.conditions.iter().all(|condition| condition.matches(task))
    }
}
