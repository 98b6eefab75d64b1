//! Application state and transitions.
//!
//! # Responsibility
//! - Hold the authoritative in-memory copy of every board collection.
//! - Apply user commands as pure transitions producing a new state.
//! - Report which collections a transition touched so callers can persist
//!   exactly those.
//!
//! # Invariants
//! - `AppState::apply` never mutates the receiver; a failed command leaves
//!   no trace.
//! - Activities are only ever appended.
//! - Dangling label, assignee and watcher ids are tolerated; only the direct
//!   target of a command must exist.

mod automation;
mod command;
mod transition;

pub use automation::DUE_SOON_WINDOW_HOURS;
pub use command::{Command, StateError};

use crate::model::activity::Activity;
use crate::model::automation::Automation;
use crate::model::comment::Comment;
use crate::model::filter::Filter;
use crate::model::integration::Integration;
use crate::model::label::Label;
use crate::model::notification::Notification;
use crate::model::template::Template;
use crate::model::time_entry::TimeEntry;
use crate::model::user::User;
use crate::model::workspace::Workspace;
use crate::model::{UserId, WorkspaceId};
use crate::repo::collections::Collection;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Every collection the board keeps in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub workspaces: Vec<Workspace>,
    pub users: Vec<User>,
    pub labels: Vec<Label>,
    pub activities: Vec<Activity>,
    pub comments: Vec<Comment>,
    pub time_entries: Vec<TimeEntry>,
    pub templates: Vec<Template>,
    pub integrations: Vec<Integration>,
    pub automations: Vec<Automation>,
    pub filters: Vec<Filter>,
    pub notifications: Vec<Notification>,
    pub current_user: Option<User>,
}

/// Set of collections touched by one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    collections: BTreeSet<Collection>,
}

impl Changes {
    pub fn mark(&mut self, collection: Collection) {
        self.collections.insert(collection);
    }

    pub fn contains(&self, collection: Collection) -> bool {
        self.collections.contains(&collection)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Collection> + '_ {
        self.collections.iter().copied()
    }
}

/// Result of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: AppState,
    pub changes: Changes,
    /// Id of the record created by the command, if any.
    pub created: Option<Uuid>,
}

impl AppState {
    pub fn workspace(&self, workspace_id: WorkspaceId) -> Option<&Workspace> {
        self.workspaces
            .iter()
            .find(|workspace| workspace.id == workspace_id)
    }

    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    /// User credited for activities: the current user, else the first team
    /// member, else nobody.
    pub fn acting_user(&self) -> Option<UserId> {
        self.current_user
            .as_ref()
            .or_else(|| self.users.first())
            .map(|user| user.id)
    }

    pub fn workspace_labels(&self, workspace_id: WorkspaceId) -> Vec<&Label> {
        self.labels
            .iter()
            .filter(|label| label.workspace_id == workspace_id)
            .collect()
    }

    pub fn workspace_filters(&self, workspace_id: WorkspaceId) -> Vec<&Filter> {
        self.filters
            .iter()
            .filter(|filter| filter.workspace_id == workspace_id)
            .collect()
    }

    pub fn workspace_integrations(&self, workspace_id: WorkspaceId) -> Vec<&Integration> {
        self.integrations
            .iter()
            .filter(|integration| integration.workspace_id == workspace_id)
            .collect()
    }

    pub fn workspace_automations(&self, workspace_id: WorkspaceId) -> Vec<&Automation> {
        self.automations
            .iter()
            .filter(|automation| automation.workspace_id == workspace_id)
            .collect()
    }

    pub fn workspace_templates(&self, workspace_id: WorkspaceId) -> Vec<&Template> {
        self.templates
            .iter()
            .filter(|template| template.workspace_id == workspace_id)
            .collect()
    }
}
