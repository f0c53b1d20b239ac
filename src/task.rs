//! Task data structure and related functionality.
//!
//! This module defines the immutable `Task` value that every command works with.
//! A task carries its descriptive details plus three optional legacy contact fields
//! (phone, email, address) that older data files may still hold. Validation happens
//! once, at construction; a task is never mutated after that, edits build a new one.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures raised while building a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Task details should not be blank")]
    BlankDetails,
}

/// A single to-do entry.
///
/// Equality and hashing are structural over all four fields, so two tasks with
/// the same details and the same legacy fields are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    details: String,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
}

impl Task {
    /// Create a task from free-form details, trimming surrounding whitespace.
    pub fn new(details: &str) -> Result<Self, TaskError> {
        Self::with_legacy(details, None, None, None)
    }

    /// Create a task that also carries legacy contact fields.
    pub fn with_legacy(
        details: &str,
        phone: Option<String>,
        email: Option<String>,
        address: Option<String>,
    ) -> Result<Self, TaskError> {
        let details = details.trim();
        if details.is_empty() {
            return Err(TaskError::BlankDetails);
        }
        Ok(Task {
            details: details.to_string(),
            phone: non_blank(phone),
            email: non_blank(email),
            address: non_blank(address),
        })
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Whitespace-separated words of the details, in order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.details.split_whitespace()
    }

    /// Render only the details, leaving the legacy fields out.
    pub fn as_text_hide_legacy(&self) -> String {
        self.details.clone()
    }

    /// Render the details followed by every legacy field that is present.
    pub fn as_text_show_all(&self) -> String {
        let mut out = self.details.clone();
        if let Some(phone) = &self.phone {
            out.push_str(&format!(" Phone: {phone}"));
        }
        if let Some(email) = &self.email {
            out.push_str(&format!(" Email: {email}"));
        }
        if let Some(address) = &self.address {
            out.push_str(&format!(" Address: {address}"));
        }
        out
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text_show_all())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// On-disk shape of a task.
///
/// Decoding goes through `Task::with_legacy`, so a stored record is validated
/// exactly like user input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Task::with_legacy(&record.details, record.phone, record.email, record.address)
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        TaskRecord {
            details: task.details,
            phone: task.phone,
            email: task.email,
            address: task.address,
        }
    }
}
