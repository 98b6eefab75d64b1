//! Time tracking entries.
//!
//! # Invariants
//! - `end_time` is `None` while the timer is running.
//! - A stopped entry is never restarted; a new entry is started instead.

use super::{TaskId, TimeEntryId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: TimeEntryId,
    pub task_id: TaskId,
    #[serde(default, deserialize_with = "crate::model::optional_id::deserialize")]
    pub user_id: Option<UserId>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub description: String,
}

impl TimeEntry {
    /// Starts a running entry at the current time.
    pub fn start(task_id: TaskId, user_id: Option<UserId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            user_id,
            start_time: Utc::now(),
            end_time: None,
            description: String::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Stops the entry at `at` and returns elapsed whole minutes.
    ///
    /// An `at` earlier than the start clamps to zero minutes.
    pub fn stop(&mut self, at: DateTime<Utc>) -> u32 {
        self.end_time = Some(at);
        self.elapsed_minutes().unwrap_or(0)
    }

    /// Whole minutes between start and end, `None` while running.
    pub fn elapsed_minutes(&self) -> Option<u32> {
        let end = self.end_time?;
        let minutes = (end - self.start_time).num_minutes().max(0);
        Some(u32::try_from(minutes).unwrap_or(u32::MAX))
    }
}
