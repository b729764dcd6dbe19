/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always answers with a well-formed JSON array
 * - `MockProvider::scripted()` - Replays canned answers in order
 * - `MockProvider::wrong_length()` - Drops the last item of every batch
 * - `MockProvider::intermittent()` - Fails every Nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Answers with empty text
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider};
use crate::translation::prompts::TranslationPayload;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with one translated string per item
    Working,
    /// Replays the scripted answers, then behaves like `Working`
    Scripted,
    /// Answers with one item fewer than requested
    WrongLength,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Canned raw answers for `Scripted`
    script: Arc<Mutex<VecDeque<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            script: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that answers with the given raw texts in order
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new(MockBehavior::Scripted);
        if let Ok(mut script) = provider.script.lock() {
            script.extend(responses.into_iter().map(Into::into));
        }
        provider
    }

    /// Create a mock whose answers are one item short
    pub fn wrong_length() -> Self {
        Self::new(MockBehavior::WrongLength)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Translation a working backend would give for `text`
    pub fn translate_line(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }

    /// JSON array answer for a request, or `None` if it carries no payload
    fn answer_for(request: &CompletionRequest, drop_last: bool) -> Option<String> {
        let payload = TranslationPayload::extract(&request.user)?;
        let mut lines: Vec<String> = payload
            .items
            .iter()
            .map(|item| Self::translate_line(item, &payload.target_language))
            .collect();
        if drop_last {
            lines.pop();
        }
        serde_json::to_string(&lines).ok()
    }

    fn response(text: String) -> CompletionResponse {
        CompletionResponse {
            prompt_tokens: Some(10),
            completion_tokens: Some(text.len() as u64 / 4),
            text,
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            script: Arc::clone(&self.script),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let missing_payload = || ProviderError::RequestFailed("Mock request carries no translation payload".to_string());

        match self.behavior {
            MockBehavior::Working => Self::answer_for(&request, false)
                .map(Self::response)
                .ok_or_else(missing_payload),

            MockBehavior::Scripted => {
                let next = self.script.lock().ok().and_then(|mut script| script.pop_front());
                match next {
                    Some(text) => Ok(Self::response(text)),
                    None => Self::answer_for(&request, false)
                        .map(Self::response)
                        .ok_or_else(missing_payload),
                }
            }

            MockBehavior::WrongLength => Self::answer_for(&request, true)
                .map(Self::response)
                .ok_or_else(missing_payload),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Self::answer_for(&request, false)
                        .map(Self::response)
                        .ok_or_else(missing_payload)
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(CompletionResponse::default()),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
