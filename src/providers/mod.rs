/*!
 * Provider implementations for the speech and translation services.
 *
 * This module contains client implementations for the hosted backends:
 * - Gemini: Google Generative Language API (default translator)
 * - OpenAI: chat completions and audio transcriptions
 * - Ollama: Local LLM server
 * - Mock: scripted provider for tests
 *
 * It also defines the two capability traits the pipeline depends on, so the
 * subtitle core never sees a particular SDK or wire format.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::ProviderError;
use crate::segment_adapter::Transcript;
use crate::translation::TokenUsageStats;

/// A single prompt sent to a text-generation backend
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instructions that frame the task
    pub system: String,
    /// The payload to act on
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Ask the backend to answer with JSON only, where supported
    pub json: bool,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 0.3,
            json: false,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Request a JSON-only answer
    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }
}

/// Text answer of a backend with optional token accounting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    pub text: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The prompt to complete
    ///
    /// # Returns
    /// * `Result<CompletionResponse, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider name used in log lines
    fn name(&self) -> &str;
}

/// Translates an ordered list of lines into a target language.
///
/// Implementations must answer with exactly one string per input line, in the
/// same order. Calls are stateless, so a failed batch can be sent again.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate_batch(&self, lines: &[String], target_language: &str) -> Result<Vec<String>, ProviderError>;

    /// Usage accumulated so far, for backends that track it
    fn usage(&self) -> Option<TokenUsageStats> {
        None
    }
}

/// Turns an audio file into a transcript
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<Transcript, ProviderError>;
}

#[async_trait]
impl<T: TranslationBackend + ?Sized> TranslationBackend for Box<T> {
    async fn translate_batch(&self, lines: &[String], target_language: &str) -> Result<Vec<String>, ProviderError> {
        (**self).translate_batch(lines, target_language).await
    }

    fn usage(&self) -> Option<TokenUsageStats> {
        (**self).usage()
    }
}

/// Read an error body for a failed HTTP call and classify it
pub(crate) async fn error_from_response(response: reqwest::Response, provider: &str) -> ProviderError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::error!("{} API error ({}): {}", provider, status, body);
    ProviderError::from_status(status, body)
}

pub mod gemini;
pub mod mock;
pub mod ollama;
pub mod openai;
