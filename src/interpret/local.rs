//! Deterministic rule-based interpreter
//!
//! Runs entirely in-process: subject keyword, date phrase and clock-time
//! phrase are recognized and cut out of the sentence in independent passes,
//! and what is left becomes the task name. It never fails.

use crate::core::calendar::ReferenceTime;
use crate::core::config::TrackerConfig;
use crate::core::error::{Result, TugasError};
use crate::core::types::{capitalize_first, Deadline, StructuredTask};
use crate::interpret::subjects::SubjectTable;
use crate::interpret::temporal::TemporalRules;
use crate::interpret::TaskInterpreter;
use async_trait::async_trait;
use chrono::NaiveTime;
use regex::Regex;

/// Characters stripped from either end of a task name once keywords are gone
const STRAY_PUNCTUATION: &[char] = &[',', ';', ':', '.', '-', '!', '?', '/', '|'];

/// Final tidy-up of the working text
///
/// Removes every standalone "deadline" word, collapses whitespace, strips
/// stray punctuation from both ends and capitalizes the first letter.
/// Applying it twice gives the same result as applying it once.
#[derive(Debug, Clone)]
pub struct TaskNameCleaner {
    deadline_word: Regex,
}

impl TaskNameCleaner {
    pub fn new() -> Result<Self> {
        let deadline_word = Regex::new(r"(?i)\bdeadline\b")
            .map_err(|e| TugasError::Config(format!("Bad pattern: {}", e)))?;
        Ok(Self { deadline_word })
    }

    pub fn clean(&self, text: &str) -> String {
        let without_keyword = self.deadline_word.replace_all(text, " ");
        let collapsed = without_keyword.split_whitespace().collect::<Vec<_>>().join(" ");
        let trimmed = collapsed
            .trim_matches(|c: char| c.is_whitespace() || STRAY_PUNCTUATION.contains(&c));
        capitalize_first(trimmed)
    }
}

/// Keyword and phrase rules compiled once, reused for every sentence
#[derive(Debug, Clone)]
pub struct LocalInterpreter {
    subjects: SubjectTable,
    temporal: TemporalRules,
    cleaner: TaskNameCleaner,
}

impl LocalInterpreter {
    pub fn new(subjects: SubjectTable) -> Result<Self> {
        Ok(Self {
            subjects,
            temporal: TemporalRules::new()?,
            cleaner: TaskNameCleaner::new()?,
        })
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        Self::new(SubjectTable::from_config(config)?)
    }

    pub fn subjects(&self) -> &SubjectTable {
        &self.subjects
    }

    /// Interpret `text` as of `reference`
    ///
    /// Falls back to the tidied raw input when stripping keywords leaves
    /// nothing behind, so a name is always produced for non-blank input.
    pub fn interpret(&self, text: &str, reference: &ReferenceTime) -> StructuredTask {
        let mut working = text.to_string();

        let subject = match self.subjects.classify(&working) {
            Some(found) => {
                working = found.remaining;
                found.subject
            }
            None => self.subjects.fallback().to_string(),
        };

        let date = self
            .temporal
            .match_date(&working, reference.date())
            .map(|found| {
                working = found.remaining;
                found.date
            });

        let time = self.temporal.match_time(&working).map(|found| {
            working = found.remaining;
            found.time
        });

        let deadline = match (date, time) {
            (date, Some(time)) => reference
                .at_local(date.unwrap_or_else(|| reference.date()), time)
                .map(Deadline::with_time),
            (Some(date), None) => reference
                .at_local(date, NaiveTime::MIN)
                .map(Deadline::date_only),
            (None, None) => None,
        };

        let mut task_name = self.cleaner.clean(&working);
        if task_name.is_empty() {
            task_name = capitalize_first(&text.split_whitespace().collect::<Vec<_>>().join(" "));
        }

        tracing::debug!(
            task_name = %task_name,
            subject = %subject,
            deadline = ?deadline.map(|d| d.to_iso()),
            "Interpreted task locally"
        );

        let task = StructuredTask::new(task_name, subject);
        match deadline {
            Some(deadline) => task.with_deadline(deadline),
            None => task,
        }
    }
}

#[async_trait]
impl TaskInterpreter for LocalInterpreter {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn interpret(&self, text: &str, reference: &ReferenceTime) -> Result<StructuredTask> {
        Ok(LocalInterpreter::interpret(self, text, reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DeadlinePrecision, Priority};
    use chrono::{NaiveDate, Timelike};

    fn interpreter() -> LocalInterpreter {
        LocalInterpreter::from_config(&TrackerConfig::default()).unwrap()
    }

    fn reference() -> ReferenceTime {
        let local = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ReferenceTime::from_local(local, 0.0).unwrap()
    }

    #[test]
    fn test_full_sentence() {
        let task = interpreter().interpret("tugas imk besok jam 10 malam", &reference());
        assert_eq!(task.subject, "Interaksi Manusia Komputer");
        assert_eq!(task.task_name, "Tugas");

        let deadline = task.deadline.unwrap();
        assert_eq!(deadline.precision, DeadlinePrecision::DateTime);
        assert_eq!(deadline.at.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(deadline.at.hour(), 22);
        assert_eq!(deadline.at.minute(), 0);
    }

    #[test]
    fn test_plain_sentence() {
        let task = interpreter().interpret("baca jurnal", &reference());
        assert_eq!(task.subject, "Other");
        assert_eq!(task.task_name, "Baca jurnal");
        assert!(task.deadline.is_none());
        assert_eq!(task.priority, Priority::Routine);
        assert!(task.tags.is_empty());
    }

    #[test]
    fn test_date_without_time_is_date_only() {
        let task = interpreter().interpret("laporan jarkom lusa", &reference());
        let deadline = task.deadline.unwrap();
        assert!(!deadline.has_time());
        assert_eq!(deadline.at.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(task.task_name, "Laporan");
    }

    #[test]
    fn test_time_without_date_anchors_to_reference_day() {
        let task = interpreter().interpret("rapat jam 9 pagi", &reference());
        let deadline = task.deadline.unwrap();
        assert!(deadline.has_time());
        assert_eq!(deadline.at.date_naive(), reference().date());
        assert_eq!(deadline.at.hour(), 9);
        assert_eq!(task.task_name, "Rapat");
    }

    #[test]
    fn test_hour_followed_by_month_word_stays_a_time() {
        let task = interpreter().interpret("tugas jam 10 mei", &reference());
        assert_eq!(task.task_name, "Tugas mei");
        let deadline = task.deadline.unwrap();
        assert!(deadline.has_time());
        assert_eq!(deadline.at.date_naive(), reference().date());
        assert_eq!(deadline.at.hour(), 10);
    }

    #[test]
    fn test_deadline_word_and_punctuation_removed() {
        let task = interpreter().interpret("Deadline kuis asd besok,", &reference());
        assert_eq!(task.task_name, "Kuis");
        assert_eq!(task.subject, "Algoritma Struktur Data");
    }

    #[test]
    fn test_keyword_only_input_falls_back_to_raw_text() {
        let task = interpreter().interpret("  besok  ", &reference());
        assert_eq!(task.task_name, "Besok");
        assert!(task.deadline.is_some());
    }

    #[test]
    fn test_deadline_keeps_reference_offset() {
        let local = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let reference = ReferenceTime::from_local(local, 7.0).unwrap();
        let task = interpreter().interpret("kuis besok jam 8", &reference);
        assert_eq!(
            task.deadline.unwrap().to_iso(),
            "2024-01-02T08:00:00+07:00"
        );
    }

    #[test]
    fn test_cleaner_is_idempotent_on_examples() {
        let cleaner = TaskNameCleaner::new().unwrap();
        for input in ["  tugas ,, deadline ", "deadline deadline", "-- kerjakan soal!", ""] {
            let once = cleaner.clean(input);
            assert_eq!(cleaner.clean(&once), once);
        }
    }

    #[tokio::test]
    async fn test_trait_object_matches_sync_result() {
        let local = interpreter();
        let expected = local.interpret("tugas imk besok", &reference());
        let boxed: Box<dyn TaskInterpreter> = Box::new(local);
        let got = boxed.interpret("tugas imk besok", &reference()).await.unwrap();
        assert_eq!(got, expected);
        assert_eq!(boxed.name(), "local");
    }
}
