use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{error_from_response, CompletionRequest, CompletionResponse, Provider, TranscriptionBackend};
use crate::segment_adapter::{Segment, Transcript};

/// OpenAI client for chat completions and audio transcriptions
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model used for chat or transcription requests
    model: String,
    /// Spoken language hint for transcriptions
    language: Option<String>,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// JSON mode switch
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Body of `/audio/transcriptions` for both `verbose_json` and `json` formats
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Option<Vec<TranscriptionSegment>>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionSegment {
    start: f64,
    end: f64,
    text: String,
}

impl OpenAIRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            response_format: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Ask for a JSON object answer
    pub fn json_mode(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            format_type: "json_object".to_string(),
        });
        self
    }
}

impl TranscriptionResponse {
    fn into_transcript(self) -> Transcript {
        let segments = self
            .segments
            .unwrap_or_default()
            .into_iter()
            .map(|s| Segment::from_seconds(s.start, s.end, &s.text))
            .collect();

        Transcript {
            segments,
            text: self.text.trim().to_string(),
            duration_ms: self
                .duration
                .filter(|d| d.is_finite() && *d > 0.0)
                .map(|d| (d * 1000.0).round() as u64),
        }
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new_with_timeout(api_key, endpoint, model, 120)
    }

    /// Create a new OpenAI client with a request timeout
    pub fn new_with_timeout(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            language: None,
        }
    }

    /// Set the spoken language hint sent with transcriptions
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    fn url(&self, path: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://api.openai.com/v1"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/{}", base, path)
    }

    /// Only whisper models return segment timestamps
    fn supports_segments(&self) -> bool {
        self.model.starts_with("whisper")
    }

    /// Send a chat completion request
    pub async fn chat(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "OpenAI").await);
        }

        response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI API response: {}", e)))
    }

    /// Extract text from a chat response
    pub fn extract_text(response: &OpenAIResponse) -> String {
        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let mut chat = OpenAIRequest::new(&self.model)
            .add_message("system", request.system)
            .add_message("user", request.user)
            .temperature(request.temperature);
        if request.json {
            chat = chat.json_mode();
        }

        let response = self.chat(chat).await?;
        let text = Self::extract_text(&response);
        if text.trim().is_empty() {
            return Err(ProviderError::ParseError("OpenAI returned an empty response".to_string()));
        }

        Ok(CompletionResponse {
            text,
            prompt_tokens: response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: response.usage.as_ref().map(|u| u.completion_tokens),
        })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(self.url("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "OpenAI").await);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}

#[async_trait]
impl TranscriptionBackend for OpenAI {
    async fn transcribe(&self, audio: &Path) -> Result<Transcript, ProviderError> {
        let bytes = tokio::fs::read(audio).await.map_err(|e| {
            ProviderError::RequestFailed(format!("Failed to read audio file {}: {}", audio.display(), e))
        })?;

        let file_name = audio
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.wav".to_string());
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());
        if self.supports_segments() {
            form = form
                .text("response_format", "verbose_json")
                .text("timestamp_granularities[]", "segment");
        } else {
            form = form.text("response_format", "json");
        }
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        debug!("Uploading {} to OpenAI transcription ({})", audio.display(), self.model);
        let response = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "OpenAI").await);
        }

        let body = response
            .json::<TranscriptionResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse transcription response: {}", e)))?;

        let transcript = body.into_transcript();
        debug!(
            "Transcription returned {} segment(s), {} chars of text",
            transcript.segments.len(),
            transcript.text.chars().count()
        );
        Ok(transcript)
    }
}
