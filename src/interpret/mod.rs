//! Turning a task sentence into a `StructuredTask`
//!
//! Two strategies implement `TaskInterpreter`: the deterministic
//! `LocalInterpreter` in this module and the model-backed
//! `DelegatedInterpreter` in `crate::llm`. Callers hold a
//! `Box<dyn TaskInterpreter>` and do not care which one is active.

pub mod local;
pub mod subjects;
pub mod temporal;

pub use local::{LocalInterpreter, TaskNameCleaner};
pub use subjects::{SubjectMatch, SubjectTable};
pub use temporal::{DateMatch, DateRuleKind, DayPeriod, TemporalRules, TimeMatch};

use crate::core::calendar::ReferenceTime;
use crate::core::error::Result;
use crate::core::types::StructuredTask;
use async_trait::async_trait;
use std::ops::Range;

/// Interpret a natural-language task sentence as of a reference instant
#[async_trait]
pub trait TaskInterpreter: Send + Sync {
    /// Short name for logs ("local", "delegated")
    fn name(&self) -> &'static str;

    async fn interpret(&self, text: &str, reference: &ReferenceTime) -> Result<StructuredTask>;
}

/// Copy of `text` with the byte range cut out
pub(crate) fn remove_span(text: &str, span: Range<usize>) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..span.start]);
    out.push_str(&text[span.end..]);
    out
}
