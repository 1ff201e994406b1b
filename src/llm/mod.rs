//! Language-model plumbing: client, session, prompts, reply parsing and
//! the optional helpers (subtasks, deep dive)

pub mod client;
pub mod delegated;
pub mod expander;
pub mod explainer;
pub mod extract;
pub mod prompts;
pub mod session;

pub use client::{ApiFormat, LlmClient};
pub use delegated::DelegatedInterpreter;
pub use expander::{SubtaskExpander, MAX_SUBTASKS};
pub use explainer::TaskExplainer;
pub use extract::{extract_json, parse_embedded, JsonShape};
pub use session::{CompletionBackend, CompletionSession};
