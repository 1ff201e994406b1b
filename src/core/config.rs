//! Tracker configuration with documented defaults
//!
//! Everything tunable lives here and is passed explicitly to the pieces
//! that need it. Credentials are never read from this file; the LLM client
//! picks its key up from the environment.

use crate::core::error::{Result, TugasError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One row of the subject classification table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEntry {
    /// Short keyword users type, matched as a whole word
    pub key: String,
    /// Full subject name stored on the task
    pub name: String,
}

impl SubjectEntry {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}

/// Which interpreter the tracker runs submissions through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InterpreterMode {
    /// Deterministic keyword rules, no network
    #[default]
    Local,
    /// Ask the language model for the structured task
    Delegated,
}

/// Settings for the completion collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Upper bound on a single completion call
    ///
    /// A call that runs longer resolves to a service error instead of
    /// leaving the submission pending forever.
    pub timeout_secs: u64,

    /// Overrides `LLM_API_URL` when set
    pub api_url: Option<String>,

    /// Overrides `LLM_MODEL` when set
    pub model: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            api_url: None,
            model: None,
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Subject table, scanned in this order; the first matching key wins
    pub subjects: Vec<SubjectEntry>,

    /// Label used when no subject keyword is found
    pub fallback_subject: String,

    /// JSON file holding the persisted task list
    pub store_path: PathBuf,

    pub mode: InterpreterMode,

    /// Ask the model for a subtask breakdown right after each submission
    pub auto_subtasks: bool,

    pub llm: LlmSettings,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            subjects: default_subjects(),
            fallback_subject: "Other".into(),
            store_path: PathBuf::from("tasks.json"),
            mode: InterpreterMode::Local,
            auto_subtasks: false,
            llm: LlmSettings::default(),
        }
    }
}

/// The course table the tracker ships with
pub fn default_subjects() -> Vec<SubjectEntry> {
    vec![
        SubjectEntry::new("aps", "Analisis Perancangan Sistem"),
        SubjectEntry::new("imk", "Interaksi Manusia Komputer"),
        SubjectEntry::new("ai", "Kecerdasan Artifisial"),
        SubjectEntry::new("asd", "Algoritma Struktur Data"),
        SubjectEntry::new("metnum", "Metode Numerik"),
        SubjectEntry::new("jarkom", "Jaringan Komputer"),
        SubjectEntry::new("bindo", "Bahasa Indonesia"),
    ]
}

impl TrackerConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TugasError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string and validate it
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: TrackerConfig =
            toml::from_str(content).map_err(|e| TugasError::Config(e.to_string()))?;
        config.validate().map_err(TugasError::Config)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for entry in &self.subjects {
            let key = entry.key.trim().to_lowercase();
            if key.is_empty() {
                return Err("Subject keys must not be empty".into());
            }
            if entry.name.trim().is_empty() {
                return Err(format!("Subject '{}' has an empty name", entry.key));
            }
            if !seen.insert(key) {
                return Err(format!("Duplicate subject key '{}'", entry.key));
            }
        }

        if self.fallback_subject.trim().is_empty() {
            return Err("fallback_subject must not be empty".into());
        }

        if self.llm.timeout_secs == 0 {
            return Err("llm.timeout_secs must be positive".into());
        }

        Ok(())
    }
}
