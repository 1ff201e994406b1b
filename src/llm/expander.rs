//! Break a task into a short list of subtasks
//!
//! Subtasks are a nice-to-have, so this never fails: any problem is logged
//! and an empty list comes back.

use crate::core::error::{Result, TugasError};
use crate::llm::extract::{parse_embedded, JsonShape};
use crate::llm::prompts::subtask_prompt;
use crate::llm::session::CompletionSession;
use serde_json::Value;

/// Upper bound on subtasks kept from one reply
pub const MAX_SUBTASKS: usize = 5;

#[derive(Debug, Clone)]
pub struct SubtaskExpander {
    session: Option<CompletionSession>,
}

impl SubtaskExpander {
    pub fn new(session: Option<CompletionSession>) -> Self {
        Self { session }
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Ordered subtask texts for `task_name`, or empty on any failure
    pub async fn expand(&self, task_name: &str, description: Option<&str>) -> Vec<String> {
        match self.try_expand(task_name, description).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, task = %task_name, "Subtask generation failed");
                Vec::new()
            }
        }
    }

    async fn try_expand(&self, task_name: &str, description: Option<&str>) -> Result<Vec<String>> {
        let session = self.session.as_ref().ok_or_else(|| {
            TugasError::ServiceUnavailable("No completion session configured".into())
        })?;

        let response = session.complete(&subtask_prompt(task_name, description)).await?;
        let items: Vec<Value> = parse_embedded(&response, JsonShape::Array)?;

        Ok(items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(MAX_SUBTASKS)
            .map(String::from)
            .collect())
    }
}
