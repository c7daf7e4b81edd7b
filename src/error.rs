use chrono::NaiveDate;
use thiserror::Error;

use crate::validate::FieldErrors;

/// Failures of the underlying key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is not valid: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON whose content breaks the data model.
    #[error("stored timesheets are inconsistent: {0}")]
    Invalid(String),
}

/// Errors surfaced by timesheet operations.
#[derive(Debug, Error)]
pub enum TimesheetError {
    /// The submitted task fields failed validation. Nothing was changed.
    #[error("invalid task: {0}")]
    Validation(FieldErrors),

    #[error("timesheet '{0}' not found")]
    TimesheetNotFound(String),

    #[error("task '{task}' not found in timesheet '{timesheet}'")]
    TaskNotFound { timesheet: String, task: String },

    #[error("date {date} is outside the week {start} to {end}")]
    DateOutOfRange {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("invalid date '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),

    /// The store could not be read or written; in-memory state was left as it was.
    #[error("failed to persist timesheets: {0}")]
    Persistence(#[from] StorageError),
}

pub type Result<T, E = TimesheetError> = std::result::Result<T, E>;
