use chrono::{Days, NaiveDate};

use crate::hours::Hours;
use crate::models::{Task, Timesheet};

// (week start, project, one duration per weekday, descriptions)
const WEEKS: [(&str, &str, [i64; 5], [&str; 5]); 4] = [
    (
        "2024-01-01",
        "Project A",
        [8, 8, 8, 8, 8],
        [
            "Frontend Development",
            "API Integration",
            "Testing & Bug Fixes",
            "Documentation",
            "Code Review & Deployment",
        ],
    ),
    (
        "2024-01-08",
        "Project B",
        [9, 9, 8, 8, 8],
        ["Feature Planning", "Implementation", "Testing", "Documentation", "Code Review"],
    ),
    (
        "2024-01-15",
        "Project C",
        [7, 7, 7, 7, 7],
        ["Sprint Planning", "Development", "Testing", "Bug Fixes", "Documentation"],
    ),
    (
        "2024-01-22",
        "Project D",
        [8, 8, 8, 8, 8],
        ["Feature Development", "Integration", "Testing", "Documentation", "Review & Deploy"],
    ),
];

const EMPTY_WEEK_START: &str = "2024-01-29";

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

fn week(id: usize, start: NaiveDate) -> Timesheet {
    let end = start.checked_add_days(Days::new(4)).unwrap_or(start);
    Timesheet::new(id.to_string(), id as u32, start, end)
}

/// The weeks a new store is seeded with: four filled weeks followed by an
/// empty one. Task ids run from 1 upward across the whole collection.
pub fn default_timesheets() -> Vec<Timesheet> {
    let mut sheets = Vec::with_capacity(WEEKS.len() + 1);
    let mut next_task = 1;
    for (i, (start, project, durations, descriptions)) in WEEKS.iter().enumerate() {
        let mut sheet = week(i + 1, day(start));
        for (offset, (hours, description)) in durations.iter().zip(descriptions.iter()).enumerate() {
            let date = sheet.start_date.checked_add_days(Days::new(offset as u64)).unwrap_or(sheet.start_date);
            sheet.tasks.push(Task {
                id: next_task.to_string(),
                date,
                description: description.to_string(),
                duration: Hours::whole(*hours),
                project: project.to_string(),
            });
            next_task += 1;
        }
        sheet.refresh();
        sheets.push(sheet);
    }
    sheets.push(week(WEEKS.len() + 1, day(EMPTY_WEEK_START)));
    sheets
}
