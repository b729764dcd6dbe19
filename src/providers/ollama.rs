use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::ProviderError;
use crate::providers::{error_from_response, CompletionRequest, CompletionResponse, Provider};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model used for generation
    model: String,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Format to return a response in
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            format: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Set the format
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl GenerationResponse {
    /// Rebuild one response from a streamed JSONL body.
    ///
    /// Servers that ignore `stream: false` send one object per token; the
    /// `response` fragments are concatenated and the token counts are taken
    /// from the final `done` line.
    fn from_jsonl(body: &str) -> Option<Self> {
        let chunks: Vec<GenerationResponse> = body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        let last = chunks.last()?;

        Some(GenerationResponse {
            model: last.model.clone(),
            response: chunks.iter().map(|c| c.response.as_str()).collect(),
            done: last.done,
            prompt_eval_count: last.prompt_eval_count,
            eval_count: last.eval_count,
        })
    }
}

impl Ollama {
    /// Create a new Ollama client from a base URL such as `http://localhost:11434`.
    ///
    /// A missing scheme defaults to `http`.
    pub fn new(endpoint: &str, model: impl Into<String>, timeout_secs: u64) -> Result<Self, ProviderError> {
        let endpoint = endpoint.trim();
        let with_scheme = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("http://{}", endpoint)
        };
        let url = Url::parse(&with_scheme)
            .map_err(|e| ProviderError::ConnectionError(format!("Invalid Ollama endpoint '{}': {}", endpoint, e)))?;

        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama speaks HTTP/1.1
                .http1_only()
                .build()
                .unwrap_or_default(),
            model: model.into(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate text from the Ollama API
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Ollama").await);
        }

        let response_text = response.text().await?;
        match serde_json::from_str::<GenerationResponse>(&response_text) {
            Ok(generated) => Ok(generated),
            Err(e) => {
                error!(
                    "Failed to parse Ollama API response: {}. Raw response (first 500 chars): {}",
                    e,
                    response_text.chars().take(500).collect::<String>()
                );
                GenerationResponse::from_jsonl(&response_text).ok_or_else(|| {
                    ProviderError::ParseError(format!("Failed to parse Ollama API response: {}", e))
                })
            }
        }
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Ollama").await);
        }

        let value: serde_json::Value = response.json().await?;
        value["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let mut generate = GenerationRequest::new(&self.model, request.user)
            .system(request.system)
            .temperature(request.temperature);
        if request.json {
            generate = generate.format("json");
        }

        let response = self.generate(generate).await?;
        Ok(CompletionResponse {
            text: response.response,
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
