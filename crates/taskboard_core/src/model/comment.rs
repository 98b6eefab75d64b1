//! Task comment model.

use super::{CommentId, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    #[serde(default, deserialize_with = "crate::model::optional_id::deserialize")]
    pub user_id: Option<UserId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(task_id: TaskId, user_id: Option<UserId>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            user_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}
