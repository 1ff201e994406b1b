//! The text-completion collaborator and its per-call timeout

use crate::core::config::LlmSettings;
use crate::core::error::{Result, TugasError};
use crate::llm::client::LlmClient;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Anything that turns one prompt into one free-text reply
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// An established connection to a completion backend
///
/// Every call is bounded by `timeout`; a call that runs over resolves to
/// `TugasError::Service` rather than hanging the submission.
#[derive(Clone)]
pub struct CompletionSession {
    backend: Arc<dyn CompletionBackend>,
    timeout: Duration,
}

impl std::fmt::Debug for CompletionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSession")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CompletionSession {
    pub fn new(backend: Arc<dyn CompletionBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Session backed by `LlmClient`, credentials from the environment
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let client = LlmClient::from_settings(settings)?;
        tracing::info!(?client, "Completion session established");
        Ok(Self::new(Arc::new(client), settings.timeout()))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        match tokio::time::timeout(self.timeout, self.backend.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(TugasError::Service(format!(
                "Completion timed out after {:?}",
                self.timeout
            ))),
        }
    }
}
