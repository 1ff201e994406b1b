//! Submission pipeline: sentence -> StructuredTask -> persisted TaskRecord
//!
//! text -> TaskInterpreter -> StructuredTask -> (SubtaskExpander) -> TaskRecord -> TaskStore
//!
//! Every mutating operation takes `&mut self`, so while a submission is
//! awaiting the model no second submission can start on the same tracker.
//! Mutations go through `TaskStore::apply`: a change that cannot be saved
//! is not kept in memory either.

pub mod record;
pub mod store;

pub use record::{SubtaskRecord, TaskRecord};
pub use store::TaskStore;

use crate::core::calendar::ReferenceTime;
use crate::core::config::{InterpreterMode, TrackerConfig};
use crate::core::error::{Result, TugasError};
use crate::core::types::{StructuredTask, TaskId};
use crate::interpret::{LocalInterpreter, SubjectTable, TaskInterpreter};
use crate::llm::{CompletionSession, DelegatedInterpreter, SubtaskExpander, TaskExplainer};

/// Owns the interpreter, the model helpers and the task list
pub struct Tracker {
    interpreter: Box<dyn TaskInterpreter>,
    expander: SubtaskExpander,
    explainer: TaskExplainer,
    store: TaskStore,
    auto_subtasks: bool,
}

impl Tracker {
    pub fn new(
        interpreter: Box<dyn TaskInterpreter>,
        expander: SubtaskExpander,
        store: TaskStore,
    ) -> Self {
        Self {
            interpreter,
            expander,
            explainer: TaskExplainer::new(None),
            store,
            auto_subtasks: false,
        }
    }

    pub fn with_explainer(mut self, explainer: TaskExplainer) -> Self {
        self.explainer = explainer;
        self
    }

    /// Request subtasks for every new task right after it is interpreted
    pub fn with_auto_subtasks(mut self, enabled: bool) -> Self {
        self.auto_subtasks = enabled;
        self
    }

    /// Wire everything from config plus environment credentials
    ///
    /// A missing API key is not fatal: the delegated interpreter then
    /// reports `ServiceUnavailable` per submission and expansion is empty.
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        config.validate().map_err(TugasError::Config)?;

        let session = match CompletionSession::from_settings(&config.llm) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "Running without a completion session");
                None
            }
        };

        let interpreter: Box<dyn TaskInterpreter> = match config.mode {
            InterpreterMode::Local => Box::new(LocalInterpreter::from_config(config)?),
            InterpreterMode::Delegated => Box::new(DelegatedInterpreter::new(
                session.clone(),
                SubjectTable::from_config(config)?,
            )),
        };

        let store = TaskStore::open(&config.store_path)?;
        Ok(Self::new(interpreter, SubtaskExpander::new(session.clone()), store)
            .with_explainer(TaskExplainer::new(session))
            .with_auto_subtasks(config.auto_subtasks))
    }

    pub fn interpreter_name(&self) -> &'static str {
        self.interpreter.name()
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Interpret without storing anything
    pub async fn preview(&self, text: &str, reference: &ReferenceTime) -> Result<StructuredTask> {
        self.interpreter.interpret(text.trim(), reference).await
    }

    /// Interpret `text`, store the resulting task at the front of the list
    pub async fn submit(&mut self, text: &str, reference: &ReferenceTime) -> Result<TaskId> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TugasError::EmptyInput);
        }

        let structured = self.interpreter.interpret(text, reference).await?;
        let id = self.store.next_id(reference);
        let mut record = TaskRecord::from_structured(id, structured);

        if self.auto_subtasks {
            let subtasks = self.expander.expand(&record.text, None).await;
            record = record.with_subtasks(subtasks);
        }

        tracing::info!(
            %id,
            interpreter = self.interpreter.name(),
            subject = %record.subject,
            deadline = ?record.deadline,
            "Task added"
        );

        self.store.apply(|store| {
            store.add(record);
            Ok(())
        })?;
        Ok(id)
    }

    /// Regenerate subtasks from the task's name and description
    ///
    /// An empty expansion leaves the existing subtasks alone. Returns how
    /// many subtasks the task has afterwards.
    pub async fn expand_subtasks(&mut self, id: TaskId) -> Result<usize> {
        let task = self.store.get(id).ok_or(TugasError::TaskNotFound(id))?;
        let description = Some(task.description.as_str()).filter(|d| !d.is_empty());
        let items = self.expander.expand(&task.text, description).await;

        if !items.is_empty() {
            self.store.apply(|store| store.set_subtasks(id, items))?;
        }
        Ok(self.store.get(id).map_or(0, |t| t.subtasks.len()))
    }

    /// Study notes for a stored task; empty when the model is unavailable
    ///
    /// Read-only: the notes are shown, not stored.
    pub async fn deep_dive(&self, id: TaskId) -> Result<String> {
        let task = self.store.get(id).ok_or(TugasError::TaskNotFound(id))?;
        let description = Some(task.description.as_str()).filter(|d| !d.is_empty());
        Ok(self
            .explainer
            .explain(&task.text, &task.subject, description)
            .await)
    }

    pub fn toggle_completed(&mut self, id: TaskId) -> Result<bool> {
        self.store.apply(|store| store.toggle_completed(id))
    }

    pub fn toggle_subtask(&mut self, id: TaskId, index: usize) -> Result<bool> {
        self.store.apply(|store| store.toggle_subtask(id, index))
    }

    pub fn set_description(&mut self, id: TaskId, description: &str) -> Result<()> {
        self.store.apply(|store| store.set_description(id, description))
    }

    pub fn remove(&mut self, id: TaskId) -> Result<TaskRecord> {
        self.store.apply(|store| store.remove(id))
    }
}
