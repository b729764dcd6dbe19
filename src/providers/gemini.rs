use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{error_from_response, CompletionRequest, CompletionResponse, Provider};

/// Gemini client for the Generative Language `generateContent` API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL
    endpoint: String,
    /// Canonical model name
    model: String,
}

/// Text fragment of a message
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

/// One turn of the conversation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

/// `generateContent` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

/// Token usage information
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsage {
    #[serde(default)]
    pub prompt_token_count: Option<u64>,
    #[serde(default)]
    pub candidates_token_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
}

/// `generateContent` response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsage>,
}

/// Map shorthand model names to their published identifiers
pub fn normalize_model_name(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix("models/").unwrap_or(name);
    match name {
        "gemini-flash" | "gemini-flash-2.5" => "gemini-2.5-flash".to_string(),
        "gemini-pro" | "gemini-pro-2.5" => "gemini-2.5-pro".to_string(),
        other => other.to_string(),
    }
}

impl GeminiRequest {
    /// Create a request with a single user turn
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            system_instruction: None,
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: user.into() }],
            }],
            generation_config: GenerationConfig {
                temperature: None,
                response_mime_type: None,
            },
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system_instruction = Some(GeminiContent {
            role: None,
            parts: vec![GeminiPart { text: system.into() }],
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.generation_config.temperature = Some(temperature);
        self
    }

    /// Ask for an `application/json` answer
    pub fn json_mode(mut self) -> Self {
        self.generation_config.response_mime_type = Some("application/json".to_string());
        self
    }
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: &str, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: normalize_model_name(model),
        }
    }

    fn model_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            "https://generativelanguage.googleapis.com/v1beta"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/models/{}", base, self.model)
    }

    /// Call `generateContent`
    pub async fn generate(&self, request: GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let response = self
            .client
            .post(format!("{}:generateContent", self.model_url()))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "Gemini").await);
        }

        response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))
    }

    /// Concatenate the text parts of the first candidate
    pub fn extract_text(response: &GeminiResponse) -> String {
        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for Gemini {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let mut generate = GeminiRequest::new(request.user)
            .system(request.system)
            .temperature(request.temperature);
        if request.json {
            generate = generate.json_mode();
        }

        let response = self.generate(generate).await?;
        let text = Self::extract_text(&response);
        if text.trim().is_empty() {
            return Err(ProviderError::ParseError("Gemini returned no candidate text".to_string()));
        }

        let usage = response.usage_metadata.unwrap_or_default();
        Ok(CompletionResponse {
            text,
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "Gemini").await);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}
