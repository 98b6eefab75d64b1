//! Read-only projections over board collections.
//!
//! # Responsibility
//! - Derive board, calendar, timeline, report and feed views on demand.
//! - Resolve id references lazily, dropping or blanking dangling ones.
//!
//! # Invariants
//! - Views borrow their inputs and never mutate state.
//! - Task order within every view follows workspace insertion order unless
//!   the view documents otherwise.

mod activity_feed;
mod board;
mod calendar;
mod report;
mod timeline;

pub use activity_feed::{describe_activity, workspace_activity, ActivityEntry};
pub use board::{
    apply_filter, archived_tasks, board_columns, checklist_progress, resolve_assignee,
    resolve_labels, unread_notifications, BoardColumn, ChecklistProgress,
};
pub use calendar::{calendar_month, tasks_by_date, CalendarDay, CalendarMonth};
pub use report::{workspace_report, WorkspaceReport, UPCOMING_DEADLINES, RECENT_TASKS};
pub use timeline::{timeline, Timeline, TimelineRow, DEFAULT_TIMELINE_DAYS};
