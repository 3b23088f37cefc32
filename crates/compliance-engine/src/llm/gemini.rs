//! Google Gemini text generation over the Generative Language REST API
//!
//! One `generateContent` call per request, no retries. The API key is sent
//! in the `x-goog-api-key` header so it never appears in logged URLs.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GenerationRequest, ProviderError, TextGenerator};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE.to_string(),
        })
    }

    /// Set the model (e.g., "gemini-2.5-flash", "gemini-2.5-pro").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

fn build_request(request: &GenerationRequest) -> GeminiRequest {
    GeminiRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: request.system_instruction.clone(),
            }],
        },
        contents: vec![GeminiContent {
            role: Some("user"),
            parts: vec![GeminiPart {
                text: request.prompt.clone(),
            }],
        }],
        generation_config: GeminiGenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        },
    }
}

/// Pull the generated text out of a response body
fn parse_response(body: &str) -> Result<String, ProviderError> {
    let response: GeminiResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(ProviderError::Api(error.message));
    }

    let text: String = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(text)
}

/// Error description for a non-success status
fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<GeminiResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map(|e| e.message)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body.trim()))
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let payload = build_request(request);
        debug!(model = %self.model, prompt_chars = request.prompt.len(), "Gemini request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Api(describe_failure(status, &body)));
        }

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_instruction: "Be terse.".to_string(),
            prompt: "Assess this.".to_string(),
            max_output_tokens: 1000,
            temperature: 0.2,
        }
    }

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::to_value(build_request(&request())).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Be terse.");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Assess this.");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1000);
        let temperature = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_endpoint_uses_model() {
        let client = GeminiClient::new("key")
            .unwrap()
            .with_model("gemini-2.5-pro")
            .with_base_url("http://localhost:1234/v1beta/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert_eq!(client.model(), "gemini-2.5-pro");
    }

    #[test]
    fn test_parse_joins_candidate_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Mostly "},{"text":"compliant."}],"role":"model"},"finishReason":"STOP"}]}"#;
        assert_eq!(parse_response(body).unwrap(), "Mostly compliant.");
    }

    #[test]
    fn test_parse_safety_block_is_empty() {
        let body = r#"{"candidates":[{"finishReason":"SAFETY","safetyRatings":[]}]}"#;
        assert!(matches!(parse_response(body), Err(ProviderError::EmptyResponse)));

        let blocked = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(parse_response(blocked), Err(ProviderError::EmptyResponse)));
    }

    #[test]
    fn test_parse_api_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        match parse_response(body) {
            Err(ProviderError::Api(message)) => assert_eq!(message, "API key not valid."),
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        assert!(matches!(parse_response("not json"), Err(ProviderError::Decode(_))));
    }

    #[test]
    fn test_describe_failure_prefers_error_message() {
        let status = reqwest::StatusCode::FORBIDDEN;
        assert_eq!(
            describe_failure(status, r#"{"error":{"message":"Permission denied"}}"#),
            "Permission denied"
        );
        assert_eq!(
            describe_failure(status, "plain text"),
            "HTTP 403 Forbidden: plain text"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let client = GeminiClient::new("key")
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
