use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::calendar::date_range;
use crate::hours::Hours;
use crate::models::{Task, Timesheet, TimesheetStatus};

/// Hours a week needs before it counts as completed.
pub const REQUIRED_HOURS: Hours = Hours::whole(40);

/// Tasks keyed by day, iterated in ascending date order.
pub type GroupedTasks<'a> = BTreeMap<NaiveDate, Vec<&'a Task>>;

/// Sum of all task durations.
pub fn total_hours(tasks: &[Task]) -> Hours {
    tasks.iter().map(|t| t.duration).sum()
}

/// Derives a week's status from its total.
///
/// # Returns
/// - `Missing` when nothing is logged.
/// - `Incomplete` below [`REQUIRED_HOURS`].
/// - `Completed` at or above it.
pub fn status_for(total: Hours) -> TimesheetStatus {
    if total.is_zero() {
        TimesheetStatus::Missing
    } else if total < REQUIRED_HOURS {
        TimesheetStatus::Incomplete
    } else {
        TimesheetStatus::Completed
    }
}

/// Groups tasks by their date, with an entry (possibly empty) for every day
/// in `start..=end`.
///
/// Tasks dated outside the range keep their own entry; those days are not
/// zero-filled around. Within a day tasks keep their insertion order.
pub fn group_by_date(tasks: &[Task], start: NaiveDate, end: NaiveDate) -> GroupedTasks<'_> {
    let mut grouped: GroupedTasks<'_> = date_range(start, end).into_iter().map(|d| (d, Vec::new())).collect();
    for task in tasks {
        grouped.entry(task.date).or_default().push(task);
    }
    grouped
}

impl Timesheet {
    /// Recomputes `total_hours` and `status` from the current tasks.
    pub fn refresh(&mut self) {
        self.total_hours = total_hours(&self.tasks);
        self.status = status_for(self.total_hours);
    }

    /// This week's tasks grouped per day.
    pub fn grouped_tasks(&self) -> GroupedTasks<'_> {
        group_by_date(&self.tasks, self.start_date, self.end_date)
    }

    /// Hours still needed to reach [`REQUIRED_HOURS`], never negative.
    pub fn remaining_hours(&self) -> Hours {
        if self.total_hours >= REQUIRED_HOURS {
            Hours::ZERO
        } else {
            REQUIRED_HOURS - self.total_hours
        }
    }
}
