use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::aggregate::REQUIRED_HOURS;
use crate::calendar::{format_day, format_week_range, parse_date};
use crate::error::{Result, TimesheetError};
use crate::models::{Task, Timesheet, TimesheetStatus};
use crate::notify::StoreWatcher;
use crate::repository::Repository;
use crate::storage::{delete_timesheets, KeyValueStore};
use crate::validate::TaskInput;

fn status_color(status: TimesheetStatus) -> Color {
    match status {
        TimesheetStatus::Completed => Color::Green,
        TimesheetStatus::Incomplete => Color::Yellow,
        TimesheetStatus::Missing => Color::Red,
    }
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels.iter().map(|l| Cell::new(l).add_attribute(Attribute::Bold)).collect()
}

/// Builds the week overview table.
pub fn weeks_table(timesheets: &[Timesheet]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["ID", "Week #", "Date", "Hours", "Status", "Action"]));

    for t in timesheets {
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(t.week_number),
            Cell::new(format_week_range(t.start_date, t.end_date)),
            Cell::new(format!("{} / {}", t.total_hours, REQUIRED_HOURS)),
            Cell::new(t.status).fg(status_color(t.status)),
            Cell::new(t.status.action_label()),
        ]);
    }
    table
}

/// Builds the per-day table for one week. Days without tasks get a placeholder row.
pub fn week_table(timesheet: &Timesheet) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(&["Day", "ID", "Description", "Project", "Hours"]));

    for (date, tasks) in timesheet.grouped_tasks() {
        let day = format_day(date);
        if tasks.is_empty() {
            table.add_row(vec![
                Cell::new(&day),
                Cell::new("-"),
                Cell::new("No tasks").fg(Color::Grey),
                Cell::new(""),
                Cell::new(""),
            ]);
            continue;
        }
        for (i, task) in tasks.iter().enumerate() {
            table.add_row(vec![
                Cell::new(if i == 0 { day.as_str() } else { "" }),
                Cell::new(&task.id),
                Cell::new(&task.description),
                Cell::new(&task.project),
                Cell::new(task.duration),
            ]);
        }
    }
    table
}

/// Lists all weeks with their totals and status.
pub fn cmd_weeks(repo: &Repository) {
    let timesheets = repo.list_timesheets();
    if timesheets.is_empty() {
        println!("No timesheets found.");
        return;
    }
    println!("{}", weeks_table(timesheets));
}

/// Shows one week, task by task, grouped per day.
pub fn cmd_show(repo: &Repository, week_id: &str) -> Result<()> {
    let t = repo.get_timesheet(week_id)?;
    println!(
        "Week {} ({})",
        t.week_number,
        format_week_range(t.start_date, t.end_date)
    );
    println!("{}", week_table(t));
    println!(
        "Total: {} / {} hours ({}), {} remaining",
        t.total_hours,
        REQUIRED_HOURS,
        t.status,
        t.remaining_hours()
    );
    Ok(())
}

/// Adds a task to a week.
pub fn cmd_add(
    repo: &mut Repository,
    week_id: &str,
    date: &str,
    description: String,
    hours: String,
    project: String,
    silent: bool,
) -> Result<Task> {
    let date = parse_date(date).ok_or_else(|| TimesheetError::InvalidDate(date.to_string()))?;
    let task = repo.add_task(week_id, date, &TaskInput::new(description, hours, project))?;
    let week = repo.get_timesheet(week_id)?;
    if !silent {
        println!(
            "Task added (id = {}). Week {} now has {} hours ({}).",
            task.id, week.week_number, week.total_hours, week.status
        );
    }
    Ok(task)
}

/// Edits a task. Fields left as `None` keep their current value; the full set
/// is validated again before it is stored.
pub fn cmd_edit(
    repo: &mut Repository,
    week_id: &str,
    task_id: &str,
    description: Option<String>,
    hours: Option<String>,
    project: Option<String>,
    silent: bool,
) -> Result<Task> {
    let current = repo.get_task(week_id, task_id)?;
    let input = TaskInput {
        description: description.unwrap_or_else(|| current.description.clone()),
        duration: hours.unwrap_or_else(|| current.duration.to_string()),
        project: project.unwrap_or_else(|| current.project.clone()),
    };
    let task = repo.edit_task(week_id, task_id, &input)?;
    if !silent {
        println!("Task {} updated.", task.id);
    }
    Ok(task)
}

/// Deletes a task after asking for confirmation, unless `force` is set.
///
/// Returns `None` when the user declined.
pub fn cmd_delete(repo: &mut Repository, week_id: &str, task_id: &str, force: bool, silent: bool) -> Result<Option<Task>> {
    let task = repo.get_task(week_id, task_id)?;
    if !force {
        let prompt = format!(
            "Delete task '{}' ({} hours on {})? This cannot be undone.",
            task.description, task.duration, task.date
        );
        if !confirm(&prompt) {
            println!("Aborted.");
            return Ok(None);
        }
    }
    let removed = repo.delete_task(week_id, task_id)?;
    if !silent {
        println!("Task {} removed.", removed.id);
    }
    Ok(Some(removed))
}

/// Removes all stored timesheets. The next run starts from the defaults again.
///
/// Returns `false` when the user declined.
pub fn cmd_reset(store: &dyn KeyValueStore, force: bool) -> Result<bool> {
    if !force && !confirm("Are you sure you want to delete all timesheets? This cannot be undone.") {
        println!("Aborted.");
        return Ok(false);
    }
    delete_timesheets(store)?;
    println!("Timesheets reset successfully.");
    Ok(true)
}

/// Polls the store and prints the week list whenever another process changes it.
pub fn cmd_watch(repo: &mut Repository, store: Arc<dyn KeyValueStore>, interval: Duration) -> Result<()> {
    let mut watcher = StoreWatcher::new(store)?;
    cmd_weeks(repo);
    println!("Watching for changes (Ctrl-C to stop)...");
    loop {
        thread::sleep(interval);
        if let Some(event) = watcher.poll()? {
            if repo.apply_event(&event)? {
                println!("Timesheets changed:");
                cmd_weeks(repo);
            }
        }
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}
