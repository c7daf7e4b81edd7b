//! # Timesheets
//!
//! Weekly timesheet tracking: log daily tasks against a week, and see how far
//! each week is from the required hours.
//!
//! ## Layout
//!
//! *   [`validate`]: checks a task submission field by field.
//! *   [`tasks`]: add, edit and remove tasks inside one [`models::Timesheet`].
//! *   [`aggregate`] and [`calendar`]: totals, status and per-day grouping.
//! *   [`repository`]: the collection of weeks for one context, persisted to a
//!     [`storage::KeyValueStore`] and announced through a [`notify::ChangeNotifier`].
//!
//! ## Status
//!
//! A week with nothing logged is `MISSING`, one with less than 40 hours is
//! `INCOMPLETE`, and one with 40 or more is `COMPLETED`.
//!
//! ## Sharing a store
//!
//! Several [`repository::Repository`] values may share one store and one
//! notifier. A successful mutation updates the local state at once and
//! publishes the whole new collection; the others pick it up with
//! [`repository::Repository::receive_remote`] and replace their state with it.
//! There is no merging: if two contexts edit at the same time the last write
//! wins and the other edit is lost.
//!
//! ## Data Storage
//!
//! The command line front end keeps its data in `timesheets.json` inside the
//! local data directory (`~/.local/share/timesheets` on Linux). Set
//! `TIMESHEETS_DIR` to use another directory.

pub mod aggregate;
pub mod calendar;
pub mod commands;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod hours;
pub mod models;
pub mod notify;
pub mod repository;
pub mod storage;
pub mod tasks;
pub mod validate;

pub use error::{Result, StorageError, TimesheetError};
pub use hours::Hours;
pub use models::{Task, Timesheet, TimesheetStatus};
