//! Study notes ("deep dive") for a single task
//!
//! Like the subtask expander this never fails; the notes are optional
//! reading, so problems are logged and an empty string comes back.

use crate::core::error::{Result, TugasError};
use crate::llm::prompts::deep_dive_prompt;
use crate::llm::session::CompletionSession;

#[derive(Debug, Clone)]
pub struct TaskExplainer {
    session: Option<CompletionSession>,
}

impl TaskExplainer {
    pub fn new(session: Option<CompletionSession>) -> Self {
        Self { session }
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Plain-text notes on how to approach the task, or empty on any failure
    pub async fn explain(&self, task_name: &str, subject: &str, description: Option<&str>) -> String {
        match self.try_explain(task_name, subject, description).await {
            Ok(notes) => notes,
            Err(e) => {
                tracing::warn!(error = %e, task = %task_name, "Deep dive failed");
                String::new()
            }
        }
    }

    async fn try_explain(
        &self,
        task_name: &str,
        subject: &str,
        description: Option<&str>,
    ) -> Result<String> {
        let session = self.session.as_ref().ok_or_else(|| {
            TugasError::ServiceUnavailable("No completion session configured".into())
        })?;

        let response = session
            .complete(&deep_dive_prompt(task_name, subject, description))
            .await?;
        tracing::debug!(len = response.len(), "Deep dive reply");

        Ok(strip_fence(response.trim()).to_string())
    }
}

/// Drop a surrounding ``` fence some models add around plain text
fn strip_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return text;
    };
    // skip an info string such as "text" on the opening line
    let body = match inner.split_once('\n') {
        Some((first, rest)) if !first.trim().contains(' ') => rest,
        _ => inner,
    };
    body.trim()
}
