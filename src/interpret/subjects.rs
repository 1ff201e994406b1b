//! Subject classification table
//!
//! Keys are scanned in table order and the first whole-word hit wins, even
//! when a later key would also match. Only one subject is ever applied.

use crate::core::config::{SubjectEntry, TrackerConfig};
use crate::core::error::{Result, TugasError};
use crate::interpret::remove_span;
use regex::Regex;

#[derive(Debug, Clone)]
struct CompiledSubject {
    entry: SubjectEntry,
    pattern: Regex,
}

/// A subject keyword found in a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectMatch {
    /// Full subject name from the table
    pub subject: String,
    /// The sentence with the keyword occurrence removed
    pub remaining: String,
}

/// Ordered keyword -> subject table with precompiled whole-word matchers
#[derive(Debug, Clone)]
pub struct SubjectTable {
    subjects: Vec<CompiledSubject>,
    fallback: String,
}

impl SubjectTable {
    pub fn new(entries: Vec<SubjectEntry>, fallback: impl Into<String>) -> Result<Self> {
        let subjects = entries
            .into_iter()
            .map(|entry| {
                let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(entry.key.trim())))
                    .map_err(|e| {
                        TugasError::Config(format!("Bad subject key '{}': {}", entry.key, e))
                    })?;
                Ok(CompiledSubject { entry, pattern })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            subjects,
            fallback: fallback.into(),
        })
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        Self::new(config.subjects.clone(), config.fallback_subject.clone())
    }

    /// Label used when nothing matches
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn entries(&self) -> impl Iterator<Item = &SubjectEntry> {
        self.subjects.iter().map(|s| &s.entry)
    }

    /// Find the first table key present in `text` and remove that occurrence
    pub fn classify(&self, text: &str) -> Option<SubjectMatch> {
        self.subjects.iter().find_map(|s| {
            let found = s.pattern.find(text)?;
            Some(SubjectMatch {
                subject: s.entry.name.clone(),
                remaining: remove_span(text, found.range()),
            })
        })
    }

    /// Normalize a subject label produced elsewhere (e.g. by a model)
    ///
    /// Known keys and full names map to the canonical full name, blank labels
    /// map to the fallback, and anything else is kept as an invented label.
    pub fn resolve_label(&self, label: &str) -> String {
        let label = label.trim();
        if label.is_empty() {
            return self.fallback.clone();
        }
        self.subjects
            .iter()
            .find(|s| {
                s.entry.key.eq_ignore_ascii_case(label)
                    || s.entry.name.to_lowercase() == label.to_lowercase()
            })
            .map(|s| s.entry.name.clone())
            .unwrap_or_else(|| label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_subjects;

    fn table() -> SubjectTable {
        SubjectTable::new(default_subjects(), "Other").unwrap()
    }

    #[test]
    fn test_classify_whole_word_case_insensitive() {
        let m = table().classify("tugas IMK besok").unwrap();
        assert_eq!(m.subject, "Interaksi Manusia Komputer");
        assert_eq!(m.remaining, "tugas  besok");
    }

    #[test]
    fn test_classify_ignores_partial_words() {
        // "ai" inside "pantai" must not count
        assert!(table().classify("liburan ke pantai").is_none());
    }

    #[test]
    fn test_first_table_key_wins() {
        // both "ai" and "aps" appear; "aps" comes first in the table
        let m = table().classify("ai dan aps").unwrap();
        assert_eq!(m.subject, "Analisis Perancangan Sistem");
        assert_eq!(m.remaining, "ai dan ");
    }

    #[test]
    fn test_only_first_occurrence_removed() {
        let m = table().classify("imk review imk").unwrap();
        assert_eq!(m.remaining, " review imk");
    }

    #[test]
    fn test_resolve_label() {
        let t = table();
        assert_eq!(t.resolve_label("jarkom"), "Jaringan Komputer");
        assert_eq!(t.resolve_label("metode numerik"), "Metode Numerik");
        assert_eq!(t.resolve_label("  "), "Other");
        assert_eq!(t.resolve_label("Olahraga"), "Olahraga");
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let keys: Vec<_> = table().entries().map(|e| e.key.clone()).collect();
        assert_eq!(keys, vec!["aps", "imk", "ai", "asd", "metnum", "jarkom", "bindo"]);
    }
}
