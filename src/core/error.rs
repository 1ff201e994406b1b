use crate::core::types::TaskId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TugasError {
    /// No completion session is configured for the delegated path
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The model replied, but not with a usable JSON value
    #[error("Response parse error: {0}")]
    ResponseParse(String),

    /// The completion call itself failed (network, quota, timeout)
    #[error("Service error: {0}")]
    Service(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Task text is empty")]
    EmptyInput,

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Subtask {index} not found on task {task}")]
    SubtaskNotFound { task: TaskId, index: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl TugasError {
    /// Whether the user can simply submit the same text again
    pub fn is_retryable(&self) -> bool {
        matches!(self, TugasError::ResponseParse(_) | TugasError::Service(_))
    }
}

pub type Result<T> = std::result::Result<T, TugasError>;
