//! Core type definitions used throughout the codebase

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Unique identifier for persisted tasks (creation time in milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task priority levels with explicit ordering values
///
/// Higher numeric value = higher priority.
///
/// Deserialization goes through `from_label`, so stored lists written with
/// Indonesian or lowercase labels load, and an unknown label reads as
/// `Routine` instead of failing the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[repr(u8)]
pub enum Priority {
    #[default]
    Routine = 0,
    Important = 1,
    Critical = 2,
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(label)) => Priority::from_label(&label).unwrap_or_default(),
            _ => Priority::default(),
        })
    }
}

impl Priority {
    /// Parse a priority label as a model or user would write it
    ///
    /// Accepts the English variant names and the Indonesian labels,
    /// case-insensitively. Returns None for anything else.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "critical" | "kritis" | "sangat penting" | "urgent" | "mendesak" => {
                Some(Priority::Critical)
            }
            "important" | "penting" | "high" | "tinggi" => Some(Priority::Important),
            "routine" | "biasa" | "normal" | "low" | "rendah" => Some(Priority::Routine),
            _ => None,
        }
    }

    /// Indonesian display label
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Critical => "Kritis",
            Priority::Important => "Penting",
            Priority::Routine => "Biasa",
        }
    }
}

/// How much of a deadline the user actually specified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadlinePrecision {
    /// Only a day was given; the instant sits at local midnight
    Date,
    /// A clock time was given as well
    DateTime,
}

/// An absolute deadline plus the precision it was stated with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub at: DateTime<FixedOffset>,
    pub precision: DeadlinePrecision,
}

impl Deadline {
    pub fn date_only(at: DateTime<FixedOffset>) -> Self {
        Self {
            at,
            precision: DeadlinePrecision::Date,
        }
    }

    pub fn with_time(at: DateTime<FixedOffset>) -> Self {
        Self {
            at,
            precision: DeadlinePrecision::DateTime,
        }
    }

    pub fn has_time(&self) -> bool {
        self.precision == DeadlinePrecision::DateTime
    }

    /// Machine-readable form stored as `deadlineISO`
    pub fn to_iso(&self) -> String {
        self.at.to_rfc3339()
    }
}

/// Output contract of every interpreter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredTask {
    pub task_name: String,
    pub subject: String,
    pub deadline: Option<Deadline>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StructuredTask {
    pub fn new(task_name: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            subject: subject.into(),
            deadline: None,
            priority: Priority::Routine,
            tags: Vec::new(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Uppercase the first character, leave the rest alone
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
