//! Workspace-scoped label model.

use super::{LabelId, WorkspaceId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    /// CSS color string, stored as given.
    pub color: String,
    pub workspace_id: WorkspaceId,
}

impl Label {
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        workspace_id: WorkspaceId,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            workspace_id,
        }
    }
}
