//! Month calendar view.
//!
//! Due dates are bucketed by their UTC calendar day.

use crate::model::task::Task;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub tasks: Vec<&'a Task>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth<'a> {
    pub year: i32,
    pub month: u32,
    /// Empty cells before day 1 in a Sunday-first week grid.
    pub leading_blank_days: u32,
    pub days: Vec<CalendarDay<'a>>,
}

impl CalendarMonth<'_> {
    pub fn task_count(&self) -> usize {
        self.days.iter().map(|day| day.tasks.len()).sum()
    }
}

/// Groups tasks by due day, keeping input order inside each day.
pub fn tasks_by_date(tasks: &[Task]) -> BTreeMap<NaiveDate, Vec<&Task>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        grouped.entry(task.due_day()).or_default().push(task);
    }
    grouped
}

/// Builds one cell per day of `year`-`month`.
///
/// Returns `None` when `month` is not in `1..=12` or the year is out of
/// chrono's range.
pub fn calendar_month(tasks: &[Task], year: i32, month: u32) -> Option<CalendarMonth<'_>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let mut grouped = tasks_by_date(tasks);

    let days = first
        .iter_days()
        .take_while(|date| date.month() == month)
        .map(|date| CalendarDay {
            date,
            tasks: grouped.remove(&date).unwrap_or_default(),
        })
        .collect();

    Some(CalendarMonth {
        year,
        month,
        leading_blank_days: first.weekday().num_days_from_sunday(),
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::{calendar_month, tasks_by_date};
    use crate::model::task::Task;
    use chrono::{TimeZone, Utc};

    fn due(title: &str, year: i32, month: u32, day: u32, hour: u32) -> Task {
        let mut task = Task::new(title);
        task.due_date = Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap();
        task
    }

    #[test]
    fn month_has_one_cell_per_day_and_sunday_offset() {
        let tasks = vec![due("a", 2024, 2, 29, 23), due("b", 2024, 3, 1, 0)];
        let month = calendar_month(&tasks, 2024, 2).unwrap();
        assert_eq!(month.days.len(), 29);
        // 2024-02-01 was a Thursday.
        assert_eq!(month.leading_blank_days, 4);
        assert_eq!(month.task_count(), 1);
        assert_eq!(month.days[28].tasks[0].title, "a");
    }

    #[test]
    fn invalid_month_yields_none() {
        assert!(calendar_month(&[], 2024, 13).is_none());
        assert!(calendar_month(&[], 2024, 0).is_none());
    }

    #[test]
    fn grouping_uses_calendar_day() {
        let tasks = vec![due("morning", 2024, 5, 2, 1), due("night", 2024, 5, 2, 22)];
        let grouped = tasks_by_date(&tasks);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped.values().next().map(Vec::len), Some(2));
    }
}
