use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::hours::Hours;

/// A single piece of work logged against one day of a week.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Identifier, unique within its timesheet.
    pub id: String,
    /// The day the work was done.
    pub date: NaiveDate,
    /// What was worked on (3 to 100 characters).
    pub description: String,
    /// Time spent, between half an hour and a full day.
    pub duration: Hours,
    /// Project the work is booked against (2 to 50 characters).
    pub project: String,
}

/// Completion state of a week, derived from its logged hours.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimesheetStatus {
    /// At least the required hours are logged.
    Completed,
    /// Some, but not enough, hours are logged.
    Incomplete,
    /// Nothing is logged yet.
    Missing,
}

impl TimesheetStatus {
    /// The action the week list offers for a week in this state.
    pub fn action_label(self) -> &'static str {
        match self {
            TimesheetStatus::Completed => "View",
            TimesheetStatus::Incomplete => "Update",
            TimesheetStatus::Missing => "Create",
        }
    }
}

impl fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimesheetStatus::Completed => "COMPLETED",
            TimesheetStatus::Incomplete => "INCOMPLETE",
            TimesheetStatus::Missing => "MISSING",
        };
        f.write_str(label)
    }
}

/// One working week and the tasks logged in it.
///
/// `total_hours` and `status` are derived from `tasks`; they are stored so that
/// the persisted collection is self-describing, but every mutation and every
/// load recomputes them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timesheet {
    pub id: String,
    pub week_number: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub total_hours: Hours,
    #[serde(default = "missing")]
    pub status: TimesheetStatus,
}

fn missing() -> TimesheetStatus {
    TimesheetStatus::Missing
}

impl Timesheet {
    /// Creates an empty week. If `end_date` precedes `start_date` the two are
    /// swapped so the range is always well ordered.
    pub fn new(id: impl Into<String>, week_number: u32, start_date: NaiveDate, end_date: NaiveDate) -> Timesheet {
        let (start_date, end_date) = if end_date < start_date {
            (end_date, start_date)
        } else {
            (start_date, end_date)
        };
        Timesheet {
            id: id.into(),
            week_number: week_number.max(1),
            start_date,
            end_date,
            tasks: Vec::new(),
            total_hours: Hours::ZERO,
            status: TimesheetStatus::Missing,
        }
    }

    /// Whether `date` falls inside this week's range.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
