//! Activity log model.
//!
//! # Responsibility
//! - Describe past state changes as an append-only audit log.
//!
//! # Invariants
//! - Activities are never mutated or removed once appended.
//! - Each kind carries exactly the fields it needs.
//! - `entity_id` targets a task for task/comment kinds and a workspace for
//!   `MemberJoined`.

use super::task::TaskStatus;
use super::{ActivityId, CommentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed activity payload.
///
/// Serialized as `{"type": "...", "details": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum ActivityKind {
    #[serde(rename_all = "camelCase")]
    TaskCreated { task_title: String },
    #[serde(rename_all = "camelCase")]
    TaskUpdated { task_title: String },
    #[serde(rename_all = "camelCase")]
    CommentAdded {
        task_title: String,
        comment_id: CommentId,
    },
    /// The joining member is the activity's `user_id`; details are `{}`.
    MemberJoined {},
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        task_title: String,
        previous_status: TaskStatus,
        new_status: TaskStatus,
    },
}

impl ActivityKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TaskCreated { .. } => "task_created",
            Self::TaskUpdated { .. } => "task_updated",
            Self::CommentAdded { .. } => "comment_added",
            Self::MemberJoined {} => "member_joined",
            Self::StatusChanged { .. } => "status_changed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    #[serde(flatten)]
    pub kind: ActivityKind,
    pub entity_id: Uuid,
    /// Acting user; `None` when no team member exists yet.
    #[serde(default, deserialize_with = "crate::model::optional_id::deserialize")]
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(kind: ActivityKind, entity_id: Uuid, user_id: Option<UserId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            entity_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Activity, ActivityKind};
    use crate::model::task::TaskStatus;
    use uuid::Uuid;

    #[test]
    fn status_change_uses_type_and_details_wire_fields() {
        let activity = Activity::new(
            ActivityKind::StatusChanged {
                task_title: "deploy".to_string(),
                previous_status: TaskStatus::Todo,
                new_status: TaskStatus::Completed,
            },
            Uuid::new_v4(),
            None,
        );

        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["details"]["taskTitle"], "deploy");
        assert_eq!(json["details"]["newStatus"], "completed");
        assert_eq!(json["entityId"], activity.entity_id.to_string());

        let decoded: Activity = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, activity);
    }

    #[test]
    fn member_joined_has_empty_details() {
        let activity = Activity::new(ActivityKind::MemberJoined {}, Uuid::new_v4(), None);
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "member_joined");
        assert_eq!(json["details"], serde_json::json!({}));
        assert_eq!(activity.kind.type_name(), "member_joined");
    }

    #[test]
    fn blank_user_id_decodes_as_none() {
        let raw = serde_json::json!({
            "id": Uuid::new_v4(),
            "type": "member_joined",
            "entityId": Uuid::new_v4(),
            "userId": "",
            "details": {},
            "createdAt": "2024-03-01T12:00:00.000Z"
        });
        let activity: Activity = serde_json::from_value(raw).unwrap();
        assert_eq!(activity.kind, ActivityKind::MemberJoined {});
        assert_eq!(activity.user_id, None);
    }
}
