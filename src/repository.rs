//! The timesheet collection of one context, kept in step with the shared store.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{Result, TimesheetError};
use crate::fixtures::default_timesheets;
use crate::models::{Task, Timesheet};
use crate::notify::{ChangeEvent, ChangeNotifier, ContextId};
use crate::storage::{decode_timesheets, load_timesheets, save_timesheets, KeyValueStore, STORAGE_KEY};
use crate::validate::{validate_task, TaskInput};

/// Owns the timesheets of one context.
///
/// Mutations go through validate, apply, recompute and persist on a copy of the
/// collection; only once the store accepted the write is the copy committed
/// and announced. A failed operation leaves the in-memory state untouched.
pub struct Repository {
    context: ContextId,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn ChangeNotifier>,
    inbox: Receiver<ChangeEvent>,
    timesheets: Vec<Timesheet>,
}

impl Repository {
    /// Opens a context on `store`, seeding it with the default weeks if it holds
    /// nothing yet. Existing data is never overwritten.
    pub fn open(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn ChangeNotifier>) -> Result<Repository> {
        let inbox = notifier.subscribe();
        let mut repo = Repository {
            context: ContextId::new(),
            store,
            notifier,
            inbox,
            timesheets: Vec::new(),
        };
        repo.reload()?;
        Ok(repo)
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Re-reads the collection from the store, seeding it if absent.
    pub fn reload(&mut self) -> Result<()> {
        self.timesheets = match load_timesheets(self.store.as_ref())? {
            Some(timesheets) => {
                debug!(context = %self.context, weeks = timesheets.len(), "loaded timesheets");
                timesheets
            }
            None => {
                let seeded = default_timesheets();
                save_timesheets(self.store.as_ref(), &seeded)?;
                info!(context = %self.context, weeks = seeded.len(), "seeded store with default timesheets");
                seeded
            }
        };
        Ok(())
    }

    pub fn list_timesheets(&self) -> &[Timesheet] {
        &self.timesheets
    }

    pub fn get_timesheet(&self, id: &str) -> Result<&Timesheet> {
        self.timesheets
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| TimesheetError::TimesheetNotFound(id.to_string()))
    }

    pub fn get_task(&self, timesheet_id: &str, task_id: &str) -> Result<&Task> {
        self.get_timesheet(timesheet_id)?
            .task(task_id)
            .ok_or_else(|| task_not_found(timesheet_id, task_id))
    }

    /// Adds a task on `date` to a week and returns it.
    pub fn add_task(&mut self, timesheet_id: &str, date: NaiveDate, input: &TaskInput) -> Result<Task> {
        let fields = validate_task(input).map_err(TimesheetError::Validation)?;
        let (idx, mut sheet) = self.working_copy(timesheet_id)?;
        if !sheet.covers(date) {
            return Err(TimesheetError::DateOutOfRange {
                date,
                start: sheet.start_date,
                end: sheet.end_date,
            });
        }
        let task = sheet.push_task(date, fields).clone();
        self.commit(idx, sheet)?;
        debug!(timesheet = timesheet_id, task = %task.id, "added task");
        Ok(task)
    }

    /// Replaces a task's description, duration and project. Id and date stay.
    pub fn edit_task(&mut self, timesheet_id: &str, task_id: &str, input: &TaskInput) -> Result<Task> {
        let fields = validate_task(input).map_err(TimesheetError::Validation)?;
        let (idx, mut sheet) = self.working_copy(timesheet_id)?;
        let task = sheet
            .replace_task(task_id, fields)
            .cloned()
            .ok_or_else(|| task_not_found(timesheet_id, task_id))?;
        self.commit(idx, sheet)?;
        debug!(timesheet = timesheet_id, task = task_id, "edited task");
        Ok(task)
    }

    /// Removes a task and returns it. Callers confirm with the user first.
    pub fn delete_task(&mut self, timesheet_id: &str, task_id: &str) -> Result<Task> {
        let (idx, mut sheet) = self.working_copy(timesheet_id)?;
        let removed = sheet
            .remove_task(task_id)
            .ok_or_else(|| task_not_found(timesheet_id, task_id))?;
        self.commit(idx, sheet)?;
        debug!(timesheet = timesheet_id, task = task_id, "deleted task");
        Ok(removed)
    }

    /// Applies pending change events from other contexts.
    ///
    /// Each event replaces the whole collection. Returns how many were applied.
    pub fn receive_remote(&mut self) -> Result<usize> {
        let mut applied = 0;
        loop {
            match self.inbox.try_recv() {
                Ok(event) => {
                    if self.apply_event(&event)? {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        Ok(applied)
    }

    /// Replaces local state with the collection carried by `event`, unless the
    /// event is for another key or was published by this context.
    pub fn apply_event(&mut self, event: &ChangeEvent) -> Result<bool> {
        if event.key != STORAGE_KEY || event.origin == self.context {
            return Ok(false);
        }
        self.timesheets = decode_timesheets(&event.new_value)?;
        info!(context = %self.context, origin = %event.origin, "replaced timesheets from change notification");
        Ok(true)
    }

    fn working_copy(&self, timesheet_id: &str) -> Result<(usize, Timesheet)> {
        let idx = self
            .timesheets
            .iter()
            .position(|t| t.id == timesheet_id)
            .ok_or_else(|| TimesheetError::TimesheetNotFound(timesheet_id.to_string()))?;
        Ok((idx, self.timesheets[idx].clone()))
    }

    fn commit(&mut self, idx: usize, sheet: Timesheet) -> Result<()> {
        let mut next = self.timesheets.clone();
        next[idx] = sheet;
        let raw = save_timesheets(self.store.as_ref(), &next)?;
        self.timesheets = next;
        self.notifier.publish(&ChangeEvent::timesheets(self.context, raw));
        Ok(())
    }
}

fn task_not_found(timesheet_id: &str, task_id: &str) -> TimesheetError {
    TimesheetError::TaskNotFound {
        timesheet: timesheet_id.to_string(),
        task: task_id.to_string(),
    }
}
