//! Board domain model.
//!
//! # Responsibility
//! - Define the records persisted by the key-value collections.
//! - Provide factory constructors that stamp fresh ids and timestamps.
//!
//! # Invariants
//! - Every record is identified by a v4 UUID generated at creation.
//! - Relationships between records are id references, never ownership,
//!   except `Workspace::tasks`, which owns its tasks.
//! - Wire field names are camelCase to match the persisted layout.

use uuid::Uuid;

pub mod activity;
pub mod automation;
pub mod comment;
pub mod filter;
pub mod integration;
pub mod label;
pub mod notification;
pub mod task;
pub mod template;
pub mod time_entry;
pub mod user;
pub mod workspace;

pub type WorkspaceId = Uuid;
pub type TaskId = Uuid;
pub type UserId = Uuid;
pub type LabelId = Uuid;
pub type CommentId = Uuid;
pub type TimeEntryId = Uuid;
pub type ActivityId = Uuid;
pub type IntegrationId = Uuid;
pub type AutomationId = Uuid;
pub type FilterId = Uuid;
pub type TemplateId = Uuid;
pub type NotificationId = Uuid;

/// Serde adapter for optional id references that reads a blank string as
/// `None`.
pub(crate) mod optional_id {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use uuid::Uuid;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Uuid::parse_str(raw).map(Some).map_err(D::Error::custom),
        }
    }
}
