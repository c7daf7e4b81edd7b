//! Field validation for task submissions.
//!
//! Validation never fails with an error: a submission either becomes a
//! [`ValidTask`] or a [`FieldErrors`] map describing every field that is wrong.

use std::collections::BTreeMap;
use std::fmt;

use crate::hours::Hours;

pub const DESCRIPTION_MIN: usize = 3;
pub const DESCRIPTION_MAX: usize = 100;
pub const PROJECT_MIN: usize = 2;
pub const PROJECT_MAX: usize = 50;
pub const DURATION_MIN: f64 = 0.5;
pub const DURATION_MAX: f64 = 24.0;

/// Raw task fields as typed by the user. Duration is still text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskInput {
    pub description: String,
    pub duration: String,
    pub project: String,
}

impl TaskInput {
    pub fn new(description: impl Into<String>, duration: impl Into<String>, project: impl Into<String>) -> TaskInput {
        TaskInput {
            description: description.into(),
            duration: duration.into(),
            project: project.into(),
        }
    }
}

/// Task fields that passed validation: text trimmed, duration parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTask {
    pub description: String,
    pub duration: Hours,
    pub project: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Description,
    Duration,
    Project,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Description => "description",
            Field::Duration => "duration",
            Field::Project => "project",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error message per offending field, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: Field, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Validates a submission, checking every field independently.
///
/// Duration must be a plain decimal number in full; a trailing suffix such as
/// `"2abc"` is rejected rather than read as `2`.
pub fn validate_task(input: &TaskInput) -> Result<ValidTask, FieldErrors> {
    let mut errors = FieldErrors::default();

    let description = input.description.trim();
    let description_len = description.chars().count();
    if description_len < DESCRIPTION_MIN {
        errors.insert(Field::Description, "Description must be at least 3 characters");
    } else if description_len > DESCRIPTION_MAX {
        errors.insert(Field::Description, "Description must be less than 100 characters");
    }

    let duration = match parse_duration(&input.duration) {
        None => {
            errors.insert(Field::Duration, "Duration must be a number");
            None
        }
        Some(value) if value < DURATION_MIN => {
            errors.insert(Field::Duration, "Duration must be at least 0.5 hours");
            None
        }
        Some(value) if value > DURATION_MAX => {
            errors.insert(Field::Duration, "Duration cannot exceed 24 hours");
            None
        }
        Some(value) => Hours::from_f64(value),
    };

    let project = input.project.trim();
    let project_len = project.chars().count();
    if project_len < PROJECT_MIN {
        errors.insert(Field::Project, "Project name must be at least 2 characters");
    } else if project_len > PROJECT_MAX {
        errors.insert(Field::Project, "Project name must be less than 50 characters");
    }

    match duration {
        Some(duration) if errors.is_empty() => Ok(ValidTask {
            description: description.to_string(),
            duration,
            project: project.to_string(),
        }),
        _ => Err(errors),
    }
}

fn parse_duration(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}
