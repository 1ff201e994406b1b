//! Async LLM client for task extraction
//!
//! This is a model-agnostic HTTP client for calling LLM APIs.
//! Supports Anthropic, OpenAI-compatible APIs (DeepSeek, etc) and
//! Google Gemini. The core only ever sends one prompt and reads back text.

use crate::core::config::LlmSettings;
use crate::core::error::{Result, TugasError};
use crate::llm::session::CompletionBackend;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// System prompt sent with every request
const SYSTEM_PREAMBLE: &str = "You are a precise assistant for a student task tracker. \
Follow the output format in the user's message exactly and never add commentary.";

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
    Gemini,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_format", &self.api_format)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else if url.contains("generativelanguage.googleapis.com") {
            ApiFormat::Gemini
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    /// Create a client from config plus environment variables
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL (defaults to Anthropic API)
    /// Optional: LLM_MODEL (defaults to claude-3-haiku-20240307)
    ///
    /// URL and model set in config take precedence over the environment.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| TugasError::ServiceUnavailable("LLM_API_KEY not set".into()))?;
        let api_url = settings
            .api_url
            .clone()
            .or_else(|| std::env::var("LLM_API_URL").ok())
            .unwrap_or_else(|| "https://api.anthropic.com/v1/messages".into());
        let model = settings
            .model
            .clone()
            .or_else(|| std::env::var("LLM_MODEL").ok())
            .unwrap_or_else(|| "claude-3-haiku-20240307".into());

        Ok(Self::new(api_key, api_url, model))
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    /// Send a completion request to the LLM
    ///
    /// # Arguments
    /// * `system` - System prompt providing context and instructions
    /// * `user` - User message/query to process
    ///
    /// # Returns
    /// The LLM's text response
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
            ApiFormat::Gemini => self.complete_gemini(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TugasError::Service(e.to_string()))?;

        let completion: AnthropicResponse = read_json(response).await?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| TugasError::Service("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TugasError::Service(e.to_string()))?;

        let completion: OpenAIResponse = read_json(response).await?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| TugasError::Service("Empty response".into()))
    }

    async fn complete_gemini(&self, system: &str, user: &str) -> Result<String> {
        let request = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: system.into(),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![GeminiPart { text: user.into() }],
            }],
        };

        let response = self
            .client
            .post(self.gemini_endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TugasError::Service(e.to_string()))?;

        let completion: GeminiResponse = read_json(response).await?;

        completion
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| TugasError::Service("Empty response".into()))
    }

    /// Gemini puts the model name in the path
    fn gemini_endpoint(&self) -> String {
        if self.api_url.contains(":generateContent") {
            self.api_url.clone()
        } else {
            format!(
                "{}/models/{}:generateContent",
                self.api_url.trim_end_matches('/'),
                self.model
            )
        }
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(SYSTEM_PREAMBLE, prompt).await
    }
}

/// Turn a non-2xx status into a service error, otherwise decode the body
async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(TugasError::Service(format!("API error ({}): {}", status, error_text)));
    }

    response
        .json()
        .await
        .map_err(|e| TugasError::Service(e.to_string()))
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Gemini generateContent format
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
