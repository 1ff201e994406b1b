//! JSON-file task list, newest first

use crate::core::calendar::ReferenceTime;
use crate::core::error::{Result, TugasError};
use crate::core::types::TaskId;
use crate::tracker::record::{SubtaskRecord, TaskRecord};
use std::fs;
use std::path::{Path, PathBuf};

/// In-memory task list, optionally mirrored to a JSON file
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    path: Option<PathBuf>,
    tasks: Vec<TaskRecord>,
}

impl TaskStore {
    /// A store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the list at `path`; a missing file is an empty list
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tasks = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Vec::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), count = tasks.len(), "Loaded task list");
        Ok(Self {
            path: Some(path),
            tasks,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the list back; written to a sibling temp file and renamed over
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.tasks)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Run a mutation and persist it as one step
    ///
    /// If the mutation or the save fails, the in-memory list is put back
    /// the way it was, so memory never holds changes the file lacks.
    pub fn apply<T>(&mut self, mutation: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let before = self.tasks.clone();
        let outcome = mutation(self).and_then(|value| self.save().map(|()| value));
        if outcome.is_err() {
            self.tasks = before;
        }
        outcome
    }

    /// Id derived from the reference instant, strictly above every existing id
    pub fn next_id(&self, reference: &ReferenceTime) -> TaskId {
        let stamp = reference.instant().timestamp_millis();
        let floor = self.tasks.iter().map(|t| t.id.0 + 1).max().unwrap_or(i64::MIN);
        TaskId(stamp.max(floor))
    }

    /// Insert at the front of the list
    pub fn add(&mut self, record: TaskRecord) {
        self.tasks.insert(0, record);
    }

    pub fn list(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: TaskId) -> Result<&mut TaskRecord> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TugasError::TaskNotFound(id))
    }

    /// Flip completion, returning the new state
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<bool> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    /// Flip one subtask's completion, returning the new state
    pub fn toggle_subtask(&mut self, id: TaskId, index: usize) -> Result<bool> {
        let task = self.get_mut(id)?;
        let subtask = task
            .subtasks
            .get_mut(index)
            .ok_or(TugasError::SubtaskNotFound { task: id, index })?;
        subtask.completed = !subtask.completed;
        Ok(subtask.completed)
    }

    /// Replace all subtasks with fresh, unchecked ones
    pub fn set_subtasks(&mut self, id: TaskId, texts: Vec<String>) -> Result<()> {
        let task = self.get_mut(id)?;
        task.subtasks = texts.into_iter().map(SubtaskRecord::new).collect();
        Ok(())
    }

    pub fn set_description(&mut self, id: TaskId, description: &str) -> Result<()> {
        self.get_mut(id)?.description = description.trim().to_string();
        Ok(())
    }

    pub fn remove(&mut self, id: TaskId) -> Result<TaskRecord> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TugasError::TaskNotFound(id))?;
        Ok(self.tasks.remove(index))
    }
}
