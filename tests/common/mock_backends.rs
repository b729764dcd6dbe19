/*!
 * Mock backend implementations for testing
 *
 * These stand in for the translation and transcription services so the
 * pipeline can run without any network access. Both record what they were
 * asked so tests can check call order and counts.
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use vidsubs::errors::ProviderError;
use vidsubs::providers::{TranscriptionBackend, TranslationBackend};
use vidsubs::segment_adapter::Transcript;

/// One scripted answer of the translation backend
#[derive(Debug, Clone)]
pub enum Step {
    /// Answer with exactly these lines
    Answer(Vec<String>),
    /// Fail the call
    Fail,
}

impl Step {
    pub fn answer(lines: &[&str]) -> Self {
        Step::Answer(lines.iter().map(|l| l.to_string()).collect())
    }
}

/// Translation backend that replays scripted steps, then prefixes each line
/// with the target language once the script is exhausted
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    steps: Arc<Mutex<VecDeque<Step>>>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedBackend {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Backend with no script that always echoes
    pub fn echo() -> Self {
        Self::new(Vec::new())
    }

    /// Every batch received so far, in order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn echo_line(line: &str, target_language: &str) -> String {
        format!("{}:{}", target_language, line)
    }
}

#[async_trait]
impl TranslationBackend for ScriptedBackend {
    async fn translate_batch(&self, lines: &[String], target_language: &str) -> Result<Vec<String>, ProviderError> {
        self.calls.lock().unwrap().push(lines.to_vec());

        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Answer(answer)) => Ok(answer),
            Some(Step::Fail) => Err(ProviderError::ApiError {
                status_code: 503,
                message: "scripted failure".to_string(),
            }),
            None => Ok(lines.iter().map(|l| Self::echo_line(l, target_language)).collect()),
        }
    }
}

/// Transcription backend returning a fixed transcript
#[derive(Debug, Clone, Default)]
pub struct FakeTranscriber {
    transcript: Transcript,
    requests: Arc<Mutex<Vec<PathBuf>>>,
}

impl FakeTranscriber {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Audio files transcribed so far
    pub fn requests(&self) -> Vec<PathBuf> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptionBackend for FakeTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<Transcript, ProviderError> {
        self.requests.lock().unwrap().push(audio.to_path_buf());
        Ok(self.transcript.clone())
    }
}
