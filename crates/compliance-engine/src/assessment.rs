//! Prompt construction and provider calls for assessment and rewriting
//!
//! Provider failures never escape this module. Every call yields an
//! [`AiOutcome`]: either generated content, or a degraded status paired
//! with the placeholder text shown to users in place of a report.

use std::sync::Arc;
use std::time::Duration;

use shared_types::AiStatus;
use tracing::{info, warn};

use crate::llm::{GenerationRequest, ProviderError, TextGenerator};

/// Upper bound on characters sent to the provider
pub const MAX_INPUT_CHARS: usize = 15_000;
pub const ASSESSMENT_MAX_TOKENS: u32 = 1000;
pub const REWRITE_MAX_TOKENS: u32 = 4096;
pub const TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

pub const SYSTEM_INSTRUCTION: &str = "You are a professional document compliance evaluator and editor. Your response must be only the requested output (either an assessment report or modified text) without conversational filler, preambles, or explanations.";

pub const DEFAULT_GUIDELINES: &str = "Standard English writing rules";

pub const NOT_CONFIGURED_MESSAGE: &str =
    "LLM not configured. Set GEMINI_API_KEY for compliance checks.";
pub const EMPTY_RESPONSE_MESSAGE: &str =
    "Gemini returned an empty response or the content was blocked by safety settings.";

/// Result of one provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiOutcome {
    Content(String),
    Degraded { status: AiStatus, message: String },
}

impl AiOutcome {
    pub fn status(&self) -> AiStatus {
        match self {
            AiOutcome::Content(_) => AiStatus::Ok,
            AiOutcome::Degraded { status, .. } => *status,
        }
    }

    /// Generated text, if the call produced any
    pub fn content(&self) -> Option<&str> {
        match self {
            AiOutcome::Content(text) => Some(text),
            AiOutcome::Degraded { .. } => None,
        }
    }

    /// Text for the report: content or the degrade placeholder
    pub fn into_text(self) -> String {
        match self {
            AiOutcome::Content(text) => text,
            AiOutcome::Degraded { message, .. } => message,
        }
    }

    fn not_configured() -> Self {
        AiOutcome::Degraded {
            status: AiStatus::NotConfigured,
            message: NOT_CONFIGURED_MESSAGE.to_string(),
        }
    }

    fn timed_out(timeout: Duration) -> Self {
        AiOutcome::Degraded {
            status: AiStatus::Timeout,
            message: format!("AI request timed out after {}ms", timeout.as_millis()),
        }
    }
}

impl From<ProviderError> for AiOutcome {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::EmptyResponse => AiOutcome::Degraded {
                status: AiStatus::EmptyResponse,
                message: EMPTY_RESPONSE_MESSAGE.to_string(),
            },
            ProviderError::Api(description) => AiOutcome::Degraded {
                status: AiStatus::ProviderError,
                message: format!("Gemini API Error: {}", description),
            },
            other => AiOutcome::Degraded {
                status: AiStatus::ProviderError,
                message: format!("Unexpected AI Error: {}", other),
            },
        }
    }
}

/// First `MAX_INPUT_CHARS` characters of `text`
pub fn truncate_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

pub fn assessment_prompt(text: &str, guidelines: Option<&str>) -> String {
    let guidelines = guidelines
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_GUIDELINES);
    format!(
        "Assess this text against the following writing guidelines:\n{}\n\nText:\n{}",
        guidelines,
        truncate_text(text)
    )
}

pub fn rewrite_prompt(text: &str, instruction: &str) -> String {
    format!(
        "REWRITE the following text to comply ONLY with the following instruction. Respond only with the modified text, no conversation or explanation:\n\nINSTRUCTION: {}\n\nORIGINAL TEXT:\n{}",
        instruction,
        truncate_text(text)
    )
}

/// Builds prompts and calls the configured text generator
#[derive(Clone)]
pub struct AssessmentGenerator {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl AssessmentGenerator {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Generator with no provider; every call degrades to "not configured"
    pub fn unconfigured() -> Self {
        Self::new(None, DEFAULT_TIMEOUT)
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn assess(&self, text: &str, guidelines: Option<&str>) -> AiOutcome {
        let prompt = assessment_prompt(text, guidelines);
        self.run(prompt, ASSESSMENT_MAX_TOKENS).await
    }

    pub async fn rewrite(&self, text: &str, instruction: &str) -> AiOutcome {
        let prompt = rewrite_prompt(text, instruction);
        self.run(prompt, REWRITE_MAX_TOKENS).await
    }

    async fn run(&self, prompt: String, max_output_tokens: u32) -> AiOutcome {
        let Some(generator) = &self.generator else {
            return AiOutcome::not_configured();
        };

        let request = GenerationRequest {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            prompt,
            max_output_tokens,
            temperature: TEMPERATURE,
        };

        let outcome: AiOutcome =
            match tokio::time::timeout(self.timeout, generator.generate(&request)).await {
                Ok(Ok(text)) if text.trim().is_empty() => ProviderError::EmptyResponse.into(),
                Ok(Ok(text)) => AiOutcome::Content(text),
                Ok(Err(e)) => e.into(),
                Err(_) => AiOutcome::timed_out(self.timeout),
            };

        match &outcome {
            AiOutcome::Content(text) => {
                info!(model = generator.model(), chars = text.len(), "AI call succeeded")
            }
            AiOutcome::Degraded { status, message } => {
                warn!(model = generator.model(), ?status, "AI call degraded: {}", message)
            }
        }
        outcome
    }
}
