//! Minimal Google Gemini API client.
//!
//! This crate provides a focused client for Gemini's `generateContent`
//! endpoint with:
//! - Plain text completions with an optional system instruction
//! - Generation config (temperature, output token cap)
//! - A small error taxonomy suitable for fallback handling

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

/// Errors that can occur when using the Gemini client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Model returned no text candidates")]
    Empty,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Gemini API client.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl Gemini {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .connect_timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a Gemini client from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| Error::NoApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The model this client targets.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a generation request and return the concatenated text of the
    /// first candidate.
    pub async fn generate(&self, request: Request) -> Result<String, Error> {
        let api_request = self.build_api_request(&request);
        let headers = self.build_headers()?;
        let model = request.model.as_deref().unwrap_or(&self.model);

        let response = self
            .client
            .post(format!("{API_BASE}/models/{model}:generateContent"))
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        parse_text(api_response)
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }

    fn build_api_request(&self, request: &Request) -> ApiRequest {
        ApiRequest {
            system_instruction: request.system.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part { text: text.clone() }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            }),
        }
    }
}

fn parse_text(response: ApiResponse) -> Result<String, Error> {
    let candidate = response.candidates.into_iter().next().ok_or(Error::Empty)?;
    let text: String = candidate
        .content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(Error::Empty);
    }
    Ok(text)
}

// ============================================================================
// Public types
// ============================================================================

/// A text generation request.
#[derive(Debug, Clone)]
pub struct Request {
    pub model: Option<String>,
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<usize>,
}

impl Request {
    /// Create a new request with the given user prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: None,
            system: None,
            prompt: prompt.into(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max: usize) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    // Absent when generation was blocked; treated as empty output.
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = Request::new("Who took the artifact?")
            .with_system("Stay in character.")
            .with_temperature(0.8)
            .with_max_output_tokens(256);

        assert_eq!(request.prompt, "Who took the artifact?");
        assert_eq!(request.system.as_deref(), Some("Stay in character."));
        assert_eq!(request.temperature, Some(0.8));
        assert_eq!(request.max_output_tokens, Some(256));
    }

    #[test]
    fn test_api_request_serialization() {
        let client = Gemini::new("test-key");
        let request = Request::new("hello").with_system("be brief");
        let api_request = client.build_api_request(&request);
        let json = serde_json::to_value(&api_request).unwrap();

        assert_eq!(json["system_instruction"]["parts"][0]["text"], "be brief");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_parse_candidate_text() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "I was in the library."}]
                },
                "finishReason": "STOP"
            }]
        });
        let response: ApiResponse = serde_json::from_value(raw).unwrap();
        let text = parse_text(response).unwrap();
        assert_eq!(text, "I was in the library.");
    }

    #[test]
    fn test_empty_candidates_is_error() {
        let response: ApiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(parse_text(response), Err(Error::Empty)));
    }

    #[test]
    fn test_blank_text_is_error() {
        let raw = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "   "}]}}]
        });
        let response: ApiResponse = serde_json::from_value(raw).unwrap();
        assert!(matches!(parse_text(response), Err(Error::Empty)));
    }

    #[test]
    fn test_from_env_without_key() {
        // Only meaningful when the variable is absent in the test env.
        if std::env::var("GEMINI_API_KEY").is_err() {
            assert!(matches!(Gemini::from_env(), Err(Error::NoApiKey)));
        }
    }
}
