//! Rolling timeline view.

use crate::model::task::Task;
use chrono::{Days, NaiveDate};

pub const DEFAULT_TIMELINE_DAYS: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRow<'a> {
    pub task: &'a Task,
    /// Index into `Timeline::days` of the due day, if it falls in the window.
    pub due_index: Option<usize>,
}

impl TimelineRow<'_> {
    pub fn is_due_on(&self, index: usize) -> bool {
        self.due_index == Some(index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline<'a> {
    pub days: Vec<NaiveDate>,
    /// One row per input task, in input order.
    pub rows: Vec<TimelineRow<'a>>,
}

impl<'a> Timeline<'a> {
    /// Rows whose due day falls inside the window.
    pub fn scheduled(&self) -> impl Iterator<Item = &TimelineRow<'a>> + '_ {
        self.rows.iter().filter(|row| row.due_index.is_some())
    }
}

/// Builds a window of `days` consecutive days starting at `today`.
pub fn timeline(tasks: &[Task], today: NaiveDate, days: u32) -> Timeline<'_> {
    let window = (0..days)
        .map_while(|offset| today.checked_add_days(Days::new(u64::from(offset))))
        .collect::<Vec<_>>();

    let rows = tasks
        .iter()
        .map(|task| {
            let due = task.due_day();
            TimelineRow {
                task,
                due_index: window.iter().position(|day| *day == due),
            }
        })
        .collect();

    Timeline { days: window, rows }
}
