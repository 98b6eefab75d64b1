//! Board use-case service.
//!
//! # Responsibility
//! - Load the full board state from a store on open.
//! - Apply commands and persist exactly the collections they touched.
//! - Expose derived views over the current state.
//!
//! # Invariants
//! - Touched collections are written in one atomic batch; in-memory state
//!   only advances after that batch commits.
//! - A rejected command or a failed batch writes nothing.

use crate::model::notification::Notification;
use crate::model::task::{TaskDraft, TaskStatus};
use crate::model::user::User;
use crate::model::{CommentId, TaskId, TimeEntryId, UserId, WorkspaceId};
use crate::repo::collections::{
    encode_current_user, encode_records, load, load_current_user, Collection,
};
use crate::repo::kv_repo::{KeyValueStore, KvWrite, StoreError, StoreResult};
use crate::state::{AppState, Command, StateError};
use crate::views::{
    board_columns, unread_notifications, workspace_activity, workspace_report, ActivityEntry,
    BoardColumn, WorkspaceReport,
};
use chrono::Utc;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for board use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Command rejected by the state layer.
    State(StateError),
    /// Persistence-layer failure.
    Store(StoreError),
    /// Command succeeded but did not report the id it created.
    MissingCreatedId(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::MissingCreatedId(command) => {
                write!(f, "command `{command}` did not return a created id")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::State(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::MissingCreatedId(_) => None,
        }
    }
}

impl From<StateError> for ServiceError {
    fn from(value: StateError) -> Self {
        Self::State(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Reads every collection into a fresh `AppState`.
///
/// # Errors
/// - Returns `StoreError::Decode` when any stored payload is malformed.
pub fn load_state(store: &impl KeyValueStore) -> StoreResult<AppState> {
    let started_at = Instant::now();
    let state = AppState {
        workspaces: load(store)?,
        users: load(store)?,
        labels: load(store)?,
        activities: load(store)?,
        comments: load(store)?,
        time_entries: load(store)?,
        templates: load(store)?,
        integrations: load(store)?,
        automations: load(store)?,
        filters: load(store)?,
        notifications: load(store)?,
        current_user: load_current_user(store)?,
    };
    info!(
        "event=state_load module=service status=ok workspaces={} users={} duration_ms={}",
        state.workspaces.len(),
        state.users.len(),
        started_at.elapsed().as_millis()
    );
    Ok(state)
}

/// Encodes one collection of `state` as a pending store write.
pub fn collection_write(state: &AppState, collection: Collection) -> StoreResult<KvWrite> {
    match collection {
        Collection::Workspaces => encode_records(&state.workspaces),
        Collection::Users => encode_records(&state.users),
        Collection::Comments => encode_records(&state.comments),
        Collection::Labels => encode_records(&state.labels),
        Collection::TimeEntries => encode_records(&state.time_entries),
        Collection::Activities => encode_records(&state.activities),
        Collection::Templates => encode_records(&state.templates),
        Collection::Integrations => encode_records(&state.integrations),
        Collection::Automations => encode_records(&state.automations),
        Collection::Filters => encode_records(&state.filters),
        Collection::Notifications => encode_records(&state.notifications),
        Collection::CurrentUser => encode_current_user(state.current_user.as_ref()),
    }
}

/// Writes one collection of `state` to `store`.
pub fn save_collection(
    store: &impl KeyValueStore,
    state: &AppState,
    collection: Collection,
) -> StoreResult<()> {
    store.write_batch(&[collection_write(state, collection)?])
}

/// Use-case service that owns a store and the board state loaded from it.
pub struct BoardService<S: KeyValueStore> {
    store: S,
    state: AppState,
}

impl<S: KeyValueStore> BoardService<S> {
    /// Loads the board from `store`.
    pub fn open(store: S) -> ServiceResult<Self> {
        let state = load_state(&store)?;
        Ok(Self { store, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Applies `command`, persists the touched collections and returns the
    /// id of the record it created, if any.
    ///
    /// # Errors
    /// - `State` when the command is rejected; nothing is written.
    /// - `Store` when persisting fails; neither the store nor the in-memory
    ///   state changes.
    pub fn dispatch(&mut self, command: Command) -> ServiceResult<Option<Uuid>> {
        let name = command.name();
        let transition = self.state.apply(command)?;

        let persisted = transition
            .changes
            .iter()
            .map(|collection| collection_write(&transition.state, collection))
            .collect::<StoreResult<Vec<_>>>()
            .and_then(|writes| self.store.write_batch(&writes));
        if let Err(err) = persisted {
            error!(
                "event=command_persist module=service status=error command={name} collections={} error={err}",
                transition.changes.len()
            );
            return Err(err.into());
        }

        info!(
            "event=command_persist module=service status=ok command={name} collections={}",
            transition.changes.len()
        );
        self.state = transition.state;
        Ok(transition.created)
    }

    fn dispatch_create(&mut self, command: Command) -> ServiceResult<Uuid> {
        let name = command.name();
        self.dispatch(command)?
            .ok_or(ServiceError::MissingCreatedId(name))
    }

    pub fn create_workspace(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> ServiceResult<WorkspaceId> {
        self.dispatch_create(Command::CreateWorkspace {
            name: name.into(),
            description: description.into(),
        })
    }

    pub fn create_task(
        &mut self,
        workspace_id: WorkspaceId,
        draft: TaskDraft,
    ) -> ServiceResult<TaskId> {
        self.dispatch_create(Command::CreateTask {
            workspace_id,
            draft,
        })
    }

    pub fn set_task_status(
        &mut self,
        workspace_id: WorkspaceId,
        task_id: TaskId,
        status: TaskStatus,
    ) -> ServiceResult<()> {
        self.dispatch(Command::SetTaskStatus {
            workspace_id,
            task_id,
            status,
        })
        .map(|_| ())
    }

    pub fn add_comment(
        &mut self,
        task_id: TaskId,
        content: impl Into<String>,
    ) -> ServiceResult<CommentId> {
        self.dispatch_create(Command::AddComment {
            task_id,
            content: content.into(),
        })
    }

    pub fn start_timer(&mut self, task_id: TaskId) -> ServiceResult<TimeEntryId> {
        self.dispatch_create(Command::StartTimer { task_id })
    }

    /// Stops the timer now.
    pub fn stop_timer(&mut self, entry_id: TimeEntryId) -> ServiceResult<()> {
        self.dispatch(Command::StopTimer {
            entry_id,
            at: Utc::now(),
        })
        .map(|_| ())
    }

    pub fn set_current_user(&mut self, user: User) -> ServiceResult<()> {
        self.dispatch(Command::SetCurrentUser { user }).map(|_| ())
    }

    /// Runs the due-date sweep against the current time.
    pub fn check_due_dates(&mut self) -> ServiceResult<()> {
        self.dispatch(Command::CheckDueDates { at: Utc::now() })
            .map(|_| ())
    }

    /// Board columns, or `None` for an unknown workspace.
    pub fn board(&self, workspace_id: WorkspaceId) -> Option<Vec<BoardColumn<'_>>> {
        self.state.workspace(workspace_id).map(board_columns)
    }

    pub fn report(&self, workspace_id: WorkspaceId) -> Option<WorkspaceReport<'_>> {
        self.state.workspace(workspace_id).map(workspace_report)
    }

    pub fn activity_feed(&self, workspace_id: WorkspaceId) -> Option<Vec<ActivityEntry<'_>>> {
        let workspace = self.state.workspace(workspace_id)?;
        Some(workspace_activity(
            &self.state.activities,
            &self.state.users,
            workspace,
        ))
    }

    pub fn unread_notifications(&self, user_id: UserId) -> Vec<&Notification> {
        unread_notifications(&self.state.notifications, user_id)
    }
}
