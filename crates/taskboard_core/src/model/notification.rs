//! In-app notifications.
//!
//! # Invariants
//! - Notifications belong to exactly one recipient.
//! - Only `read` changes after creation; removal happens through an explicit
//!   clear action.

use super::task::TaskStatus;
use super::{AutomationId, CommentId, NotificationId, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serialized as `{"type": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NotificationKind {
    #[serde(rename_all = "camelCase")]
    Assignment { task_id: TaskId, task_title: String },
    #[serde(rename_all = "camelCase")]
    DueSoon {
        task_id: TaskId,
        task_title: String,
        due_date: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Comment {
        task_id: TaskId,
        comment_id: CommentId,
        author_id: Option<UserId>,
    },
    #[serde(rename_all = "camelCase")]
    StatusChange {
        task_id: TaskId,
        task_title: String,
        new_status: TaskStatus,
    },
    #[serde(rename_all = "camelCase")]
    Automation {
        automation_id: AutomationId,
        task_id: TaskId,
        message: String,
    },
}

impl NotificationKind {
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::Assignment { task_id, .. }
            | Self::DueSoon { task_id, .. }
            | Self::Comment { task_id, .. }
            | Self::StatusChange { task_id, .. }
            | Self::Automation { task_id, .. } => *task_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: UserId, kind: NotificationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            read: false,
            created_at: Utc::now(),
        }
    }
}
