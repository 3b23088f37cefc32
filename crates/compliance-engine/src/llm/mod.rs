//! Language-model provider seam

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;

/// A single-turn generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider rejected the request or reported an error
    #[error("{0}")]
    Api(String),

    /// No text came back (empty candidates or blocked by safety filters)
    #[error("empty response")]
    EmptyResponse,

    #[error("{0}")]
    Transport(String),

    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for logs
    fn model(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}
