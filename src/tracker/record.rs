//! Persisted task records
//!
//! Field names follow the stored JSON layout (`deadlineISO`, camelCase), so
//! lists written by earlier versions of the tracker still load; anything
//! they lack takes its default.

use crate::core::calendar::format_deadline;
use crate::core::types::{Priority, StructuredTask, TaskId};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskRecord {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl SubtaskRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub description: String,
    pub subject: String,
    /// Locale display string, e.g. "Selasa, 2 Januari pukul 22.00"
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(rename = "deadlineISO", default)]
    pub deadline_iso: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<SubtaskRecord>,
}

impl TaskRecord {
    /// Fresh record: not completed, no description, no subtasks
    pub fn from_structured(id: TaskId, task: StructuredTask) -> Self {
        Self {
            id,
            text: task.task_name,
            description: String::new(),
            subject: task.subject,
            deadline: task.deadline.as_ref().map(format_deadline),
            deadline_iso: task.deadline.as_ref().map(|d| d.to_iso()),
            completed: false,
            priority: task.priority,
            tags: task.tags,
            subtasks: Vec::new(),
        }
    }

    pub fn with_subtasks<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtasks = texts.into_iter().map(SubtaskRecord::new).collect();
        self
    }

    /// The machine-readable deadline, if present and well-formed
    pub fn deadline_at(&self) -> Option<DateTime<FixedOffset>> {
        self.deadline_iso
            .as_deref()
            .and_then(|iso| DateTime::parse_from_rfc3339(iso).ok())
    }

    /// (completed, total) subtasks
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }
}
