use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Task, Timesheet};
use crate::validate::ValidTask;

/// Returns a fresh task identifier.
pub fn new_task_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Timesheet {
    /// Finds a task by id.
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Appends a new task on `date` and returns a reference to it.
    pub fn push_task(&mut self, date: NaiveDate, fields: ValidTask) -> &Task {
        let mut id = new_task_id();
        while self.task(&id).is_some() {
            id = new_task_id();
        }
        self.tasks.push(Task {
            id,
            date,
            description: fields.description,
            duration: fields.duration,
            project: fields.project,
        });
        self.refresh();
        let last = self.tasks.len() - 1;
        &self.tasks[last]
    }

    /// Replaces the editable fields of a task, keeping its id and date.
    ///
    /// Returns `None` if no task has that id.
    pub fn replace_task(&mut self, task_id: &str, fields: ValidTask) -> Option<&Task> {
        let idx = self.tasks.iter().position(|t| t.id == task_id)?;
        let t = &mut self.tasks[idx];
        t.description = fields.description;
        t.duration = fields.duration;
        t.project = fields.project;
        self.refresh();
        Some(&self.tasks[idx])
    }

    /// Removes a task, returning it. `None` if no task has that id.
    pub fn remove_task(&mut self, task_id: &str) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == task_id)?;
        let removed = self.tasks.remove(idx);
        self.refresh();
        Some(removed)
    }
}
