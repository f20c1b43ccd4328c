//! Abstractive summaries from an OpenAI-compatible chat-completion endpoint.
//!
//! The client sends one system instruction (chosen by [`PromptProfile`]) and one user message
//! holding the already-bounded source text. A response that lacks a completion degrades to
//! [`FALLBACK_SUMMARY`] instead of failing, and is flagged so callers and logs can tell it
//! apart from a real summary.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Placeholder returned when the provider answers without a usable completion.
pub const FALLBACK_SUMMARY: &str = "Özet oluşturulamadı.";

/// Errors surfaced while requesting a summary.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider could not be reached or the client could not be built.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
}

/// Named combination of system instruction and sampling temperature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptProfile {
    /// Short, casual summary.
    #[default]
    Brief,
    /// Structured summary that keeps definitions and key facts.
    Detailed,
}

impl PromptProfile {
    /// System instruction sent ahead of the source text.
    pub fn system_instruction(self) -> &'static str {
        match self {
            Self::Brief => "Aşağıdaki içeriği kısaca özetle:",
            Self::Detailed => {
                "Aşağıdaki ders içeriğini ana kavramları, tanımları ve önemli ayrıntıları \
                 koruyarak maddeler halinde ayrıntılı biçimde özetle. Metinde olmayan bilgi ekleme:"
            }
        }
    }

    /// Sampling temperature; factual summaries run cooler.
    pub fn temperature(self) -> f64 {
        match self {
            Self::Brief => 0.7,
            Self::Detailed => 0.3,
        }
    }
}

impl FromStr for PromptProfile {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brief" => Ok(Self::Brief),
            "detailed" => Ok(Self::Detailed),
            _ => Err(()),
        }
    }
}

/// Input to a single summarization call.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    /// Source text, already truncated by the pipeline.
    pub source_text: String,
    /// Instruction profile to apply.
    pub profile: PromptProfile,
}

/// Summary produced by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    /// Summary text shown to the user.
    pub summary_text: String,
    /// `true` when `summary_text` is [`FALLBACK_SUMMARY`] rather than provider output.
    pub used_fallback: bool,
}

impl SummaryResult {
    fn fallback() -> Self {
        Self {
            summary_text: FALLBACK_SUMMARY.to_string(),
            used_fallback: true,
        }
    }
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Summarize `request.source_text` according to its profile.
    async fn summarize(
        &self,
        request: SummaryRequest,
    ) -> Result<SummaryResult, SummarizationClientError>;
}

/// Chat-completion client for OpenAI and API-compatible gateways.
pub struct OpenAiSummarizationClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl OpenAiSummarizationClient {
    /// Build the shared client from configuration.
    pub fn new(config: &Config) -> Result<Self, SummarizationClientError> {
        let mut builder = Client::builder().user_agent("dropnotes/summary");
        if let Some(timeout_ms) = config.openai_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let http = builder.build().map_err(|error| {
            SummarizationClientError::ProviderUnavailable(format!(
                "failed to construct HTTP client: {error}"
            ))
        })?;
        tracing::debug!(
            base_url = %config.openai_base_url,
            model = %config.openai_model,
            timeout_ms = ?config.openai_timeout_ms,
            "Initialized summarization client"
        );
        Ok(Self {
            http,
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SummarizationClient for OpenAiSummarizationClient {
    async fn summarize(
        &self,
        request: SummaryRequest,
    ) -> Result<SummaryResult, SummarizationClientError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.profile.system_instruction(),
                },
                ChatMessage {
                    role: "user",
                    content: &request.source_text,
                },
            ],
            temperature: request.profile.temperature(),
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach {}: {error}",
                    self.endpoint()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "provider returned {status}: {body}"
            )));
        }

        let body = response.text().await.map_err(|error| {
            SummarizationClientError::ProviderUnavailable(format!(
                "failed to read provider response: {error}"
            ))
        })?;

        match first_completion(&body) {
            Some(summary_text) => Ok(SummaryResult {
                summary_text,
                used_fallback: false,
            }),
            None => {
                tracing::warn!(
                    model = %self.model,
                    response_bytes = body.len(),
                    "Provider response had no completion content; returning fallback summary"
                );
                Ok(SummaryResult::fallback())
            }
        }
    }
}

/// `choices[0].message.content`, trimmed, when present and non-blank.
fn first_completion(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let content = value.pointer("/choices/0/message/content")?.as_str()?.trim();
    (!content.is_empty()).then(|| content.to_string())
}
