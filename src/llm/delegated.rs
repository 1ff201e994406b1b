//! Model-backed interpreter
//!
//! Sends one instruction to the completion backend and validates the single
//! JSON object in its reply. The reply shape is treated as a protocol with
//! a process we do not control: `taskName` is required, every other field
//! falls back to its default when missing or malformed.

use crate::core::calendar::ReferenceTime;
use crate::core::error::{Result, TugasError};
use crate::core::types::{capitalize_first, Deadline, Priority, StructuredTask};
use crate::interpret::subjects::SubjectTable;
use crate::interpret::TaskInterpreter;
use crate::llm::extract::{parse_embedded, JsonShape};
use crate::llm::prompts::task_extraction_prompt;
use crate::llm::session::CompletionSession;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

/// Raw reply object; every field is loose so one bad field cannot sink the rest
#[derive(Debug, Deserialize)]
struct TaskReply {
    #[serde(rename = "taskName", default)]
    task_name: Option<Value>,
    #[serde(default)]
    subject: Option<Value>,
    #[serde(rename = "deadlineISO", default)]
    deadline_iso: Option<Value>,
    #[serde(default)]
    priority: Option<Value>,
    #[serde(default)]
    tags: Option<Value>,
}

/// Interpreter that delegates extraction to a language model
#[derive(Debug, Clone)]
pub struct DelegatedInterpreter {
    session: Option<CompletionSession>,
    subjects: SubjectTable,
}

impl DelegatedInterpreter {
    pub fn new(session: Option<CompletionSession>, subjects: SubjectTable) -> Self {
        Self { session, subjects }
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Interpret `text` as of `reference`, whose offset is passed to the model
    pub async fn interpret(&self, text: &str, reference: &ReferenceTime) -> Result<StructuredTask> {
        let session = self.session.as_ref().ok_or_else(|| {
            TugasError::ServiceUnavailable("No completion session configured".into())
        })?;

        let prompt = task_extraction_prompt(text, reference, &self.subjects);
        tracing::debug!(prompt_len = prompt.len(), "Requesting structured task");

        let response = session.complete(&prompt).await?;
        tracing::debug!(%response, "Model reply");

        let reply: TaskReply = parse_embedded(&response, JsonShape::Object)?;
        validate_reply(reply, reference, &self.subjects)
    }
}

#[async_trait]
impl TaskInterpreter for DelegatedInterpreter {
    fn name(&self) -> &'static str {
        "delegated"
    }

    async fn interpret(&self, text: &str, reference: &ReferenceTime) -> Result<StructuredTask> {
        DelegatedInterpreter::interpret(self, text, reference).await
    }
}

fn validate_reply(
    reply: TaskReply,
    reference: &ReferenceTime,
    subjects: &SubjectTable,
) -> Result<StructuredTask> {
    let task_name = match reply.task_name {
        Some(Value::String(name)) if !name.trim().is_empty() => capitalize_first(name.trim()),
        other => {
            return Err(TugasError::ResponseParse(format!(
                "Reply has no usable taskName: {:?}",
                other
            )))
        }
    };

    let subject = match reply.subject {
        Some(Value::String(label)) => subjects.resolve_label(&label),
        _ => subjects.fallback().to_string(),
    };

    let deadline = match reply.deadline_iso {
        Some(Value::String(iso)) => {
            let parsed = parse_deadline(&iso, reference);
            if parsed.is_none() {
                tracing::warn!(%iso, "Ignoring unparseable deadlineISO");
            }
            parsed
        }
        _ => None,
    };

    let priority = match reply.priority {
        Some(Value::String(label)) => Priority::from_label(&label).unwrap_or_default(),
        _ => Priority::default(),
    };

    let tags = match reply.tags {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::String(list)) => list
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };

    let task = StructuredTask::new(task_name, subject)
        .with_priority(priority)
        .with_tags(tags);
    Ok(match deadline {
        Some(deadline) => task.with_deadline(deadline),
        None => task,
    })
}

/// Accept RFC 3339, naive date-times in the caller's offset, or bare dates
fn parse_deadline(iso: &str, reference: &ReferenceTime) -> Option<Deadline> {
    let iso = iso.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(iso) {
        return Some(Deadline::with_time(at.with_timezone(&reference.offset())));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(iso, format) {
            return reference
                .at_local(naive.date(), naive.time())
                .map(Deadline::with_time);
        }
    }

    NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .ok()
        .and_then(|date| reference.at_local(date, NaiveTime::MIN))
        .map(Deadline::date_only)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_subjects;
    use crate::llm::session::CompletionBackend;
    use chrono::Timelike;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Replies with a canned string and remembers the prompt it was given
    struct Scripted {
        reply: Result<String>,
        seen: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(TugasError::Service("quota exceeded".into())),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionBackend for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.seen.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(TugasError::Service(e.to_string())),
            }
        }
    }

    fn subjects() -> SubjectTable {
        SubjectTable::new(default_subjects(), "Other").unwrap()
    }

    fn interpreter(backend: Arc<Scripted>) -> DelegatedInterpreter {
        let session = CompletionSession::new(backend, Duration::from_secs(5));
        DelegatedInterpreter::new(Some(session), subjects())
    }

    fn reference() -> ReferenceTime {
        let local = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ReferenceTime::from_local(local, 7.0).unwrap()
    }

    #[tokio::test]
    async fn test_reply_with_surrounding_prose() {
        let backend = Scripted::ok(
            "Tentu! Ini hasilnya:\n{\"taskName\": \"tugas\", \"subject\": \"imk\", \
             \"deadlineISO\": \"2024-01-02T22:00:00+07:00\", \"priority\": \"Important\", \
             \"tags\": [\"kuliah\", \"\", 3]}\nSemoga membantu.",
        );
        let task = interpreter(backend.clone())
            .interpret("tugas imk besok jam 10 malam", &reference())
            .await
            .unwrap();

        assert_eq!(task.task_name, "Tugas");
        assert_eq!(task.subject, "Interaksi Manusia Komputer");
        assert_eq!(task.priority, Priority::Important);
        assert_eq!(task.tags, vec!["kuliah"]);
        let deadline = task.deadline.unwrap();
        assert!(deadline.has_time());
        assert_eq!(deadline.at.hour(), 22);

        let prompts = backend.seen.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("UTC+7"));
    }

    #[tokio::test]
    async fn test_reply_without_braces_is_parse_error() {
        let result = interpreter(Scripted::ok("Maaf, saya tidak bisa membantu."))
            .interpret("tugas", &reference())
            .await;
        assert!(matches!(result, Err(TugasError::ResponseParse(_))));
    }

    #[tokio::test]
    async fn test_missing_optional_fields_take_defaults() {
        let task = interpreter(Scripted::ok("{\"taskName\": \"Baca jurnal\"}"))
            .interpret("baca jurnal", &reference())
            .await
            .unwrap();
        assert_eq!(task.subject, "Other");
        assert_eq!(task.priority, Priority::Routine);
        assert!(task.tags.is_empty());
        assert!(task.deadline.is_none());
    }

    #[tokio::test]
    async fn test_malformed_optional_fields_take_defaults() {
        let task = interpreter(Scripted::ok(
            "{\"taskName\": \"Lari pagi\", \"subject\": \"Olahraga\", \"deadlineISO\": \"kapan-kapan\", \
             \"priority\": 5, \"tags\": \"sehat, rutin\"}",
        ))
        .interpret("lari pagi", &reference())
        .await
        .unwrap();
        assert_eq!(task.subject, "Olahraga");
        assert!(task.deadline.is_none());
        assert_eq!(task.priority, Priority::Routine);
        assert_eq!(task.tags, vec!["sehat", "rutin"]);
    }

    #[tokio::test]
    async fn test_missing_task_name_is_parse_error() {
        let result = interpreter(Scripted::ok("{\"subject\": \"imk\"}"))
            .interpret("imk", &reference())
            .await;
        assert!(matches!(result, Err(TugasError::ResponseParse(_))));

        let result = interpreter(Scripted::ok("{\"taskName\": \"   \"}"))
            .interpret("imk", &reference())
            .await;
        assert!(matches!(result, Err(TugasError::ResponseParse(_))));
    }

    #[tokio::test]
    async fn test_no_session_is_unavailable() {
        let interpreter = DelegatedInterpreter::new(None, subjects());
        assert!(!interpreter.has_session());
        let result = interpreter.interpret("tugas", &reference()).await;
        assert!(matches!(result, Err(TugasError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_is_service_error() {
        let result = interpreter(Scripted::failing())
            .interpret("tugas", &reference())
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, TugasError::Service(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_parse_deadline_formats() {
        let r = reference();

        let d = parse_deadline("2024-01-02T15:00:00Z", &r).unwrap();
        assert_eq!(d.to_iso(), "2024-01-02T22:00:00+07:00");

        let d = parse_deadline("2024-01-02T22:00:00", &r).unwrap();
        assert_eq!(d.to_iso(), "2024-01-02T22:00:00+07:00");

        let d = parse_deadline("2024-01-05", &r).unwrap();
        assert!(!d.has_time());
        assert_eq!(d.to_iso(), "2024-01-05T00:00:00+07:00");

        assert!(parse_deadline("besok", &r).is_none());
    }
}
