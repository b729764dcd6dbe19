/*!
 * Core translation service implementation.
 *
 * `TranslationService` owns the configured LLM provider and implements
 * `TranslationBackend`: each batch becomes one prompt, and the answer is
 * parsed back into an ordered list of lines.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::providers::gemini::Gemini;
use crate::providers::ollama::Ollama;
use crate::providers::openai::OpenAI;
use crate::providers::{Provider, TranslationBackend};
use super::prompts::{parse_translation_response, TranslationPromptBuilder};

/// Token usage statistics for tracking API consumption
#[derive(Clone, Debug)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Number of backend requests sent
    pub requests: u64,

    /// Total time spent on API requests
    pub api_duration: Duration,
}

impl Default for TokenUsageStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenUsageStats {
    /// Create a new empty token usage stats instance
    pub fn new() -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            requests: 0,
            api_duration: Duration::from_secs(0),
        }
    }

    /// Record one request
    pub fn record(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>, duration: Duration) {
        self.prompt_tokens += prompt_tokens.unwrap_or(0);
        self.completion_tokens += completion_tokens.unwrap_or(0);
        self.requests += 1;
        self.api_duration += duration;
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// One-line summary for the log
    pub fn summary(&self) -> String {
        format!(
            "{} request(s), {} tokens ({} prompt + {} completion), {:.1}s in API calls",
            self.requests,
            self.total_tokens(),
            self.prompt_tokens,
            self.completion_tokens,
            self.api_duration.as_secs_f64()
        )
    }
}

/// LLM-backed translation backend
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: Box<dyn Provider>,

    /// Sampling temperature for every request
    temperature: f32,

    /// Accumulated usage across batches
    usage: Mutex<TokenUsageStats>,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let timeout_secs = config.get_timeout_secs();
        let provider: Box<dyn Provider> = match config.provider {
            TranslationProvider::Gemini => Box::new(Gemini::new(
                config.get_api_key(),
                config.get_endpoint(),
                &config.get_model(),
                timeout_secs,
            )),
            TranslationProvider::OpenAI => Box::new(OpenAI::new_with_timeout(
                config.get_api_key(),
                config.get_endpoint(),
                config.get_model(),
                timeout_secs,
            )),
            TranslationProvider::Ollama => Box::new(Ollama::new(
                &config.get_endpoint(),
                config.get_model(),
                timeout_secs,
            )?),
        };

        debug!(
            "Translation backend: {} ({})",
            config.provider.display_name(),
            config.get_model()
        );
        Ok(Self::with_provider(provider, config.common.temperature))
    }

    /// Wrap an already constructed provider
    pub fn with_provider(provider: Box<dyn Provider>, temperature: f32) -> Self {
        Self {
            provider,
            temperature,
            usage: Mutex::new(TokenUsageStats::new()),
        }
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        self.provider.test_connection().await
    }

    /// Snapshot of the usage accumulated so far
    pub fn usage(&self) -> TokenUsageStats {
        self.usage
            .lock()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    fn record_usage(&self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>, duration: Duration) {
        if let Ok(mut stats) = self.usage.lock() {
            stats.record(prompt_tokens, completion_tokens, duration);
        }
    }
}

#[async_trait]
impl TranslationBackend for TranslationService {
    async fn translate_batch(&self, lines: &[String], target_language: &str) -> Result<Vec<String>, ProviderError> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let request = TranslationPromptBuilder::new(target_language)
            .with_items(lines)
            .with_temperature(self.temperature)
            .build();

        let start_time = Instant::now();
        let response = self.provider.complete(request).await?;
        let duration = start_time.elapsed();
        self.record_usage(response.prompt_tokens, response.completion_tokens, duration);

        debug!(
            "{} answered {} line(s) in {:?}",
            self.provider.name(),
            lines.len(),
            duration
        );
        parse_translation_response(&response.text)
    }

    fn usage(&self) -> Option<TokenUsageStats> {
        Some(TranslationService::usage(self))
    }
}
