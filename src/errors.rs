/*!
 * Error types for the vidsubs application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::subtitle_processor::SubtitleEntry;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status into the matching variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised while reading or building subtitle tracks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtitleError {
    /// SRT text violates the block structure or timestamp grammar
    #[error("Malformed subtitle track at line {line}: {reason}")]
    MalformedTrack {
        /// 1-based line number in the source text
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// A cue or segment ends before it starts
    #[error("Invalid timing for cue {position}: end {end_ms}ms precedes start {start_ms}ms")]
    InvalidTiming {
        /// 0-based position within the track or segment list
        position: usize,
        start_ms: u64,
        end_ms: u64,
    },
}

/// Errors that can occur while translating a single batch
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The backend returned a list whose length disagrees with the batch sent
    #[error("Batch {batch_index} misaligned: sent {expected} lines, received {actual}")]
    Alignment {
        batch_index: usize,
        expected: usize,
        actual: usize,
    },

    /// The backend call failed or its response could not be parsed
    #[error("Batch {batch_index} failed: {source}")]
    Backend {
        batch_index: usize,
        #[source]
        source: ProviderError,
    },
}

impl TranslationError {
    /// Index of the batch this error originated from
    pub fn batch_index(&self) -> usize {
        match self {
            Self::Alignment { batch_index, .. } | Self::Backend { batch_index, .. } => *batch_index,
        }
    }
}

/// A whole-track translation that stopped before the last batch.
///
/// `completed` holds the translated cues of every batch committed before
/// `failed_batch`, in track order, with their original timings.
#[derive(Error, Debug)]
#[error("Translation incomplete: {} cues translated before batch {failed_batch} of {total_batches} failed: {error}", completed.len())]
pub struct IncompleteTranslation {
    /// The error that stopped the run
    #[source]
    pub error: TranslationError,
    /// Translated cues preceding the failed batch
    pub completed: Vec<SubtitleEntry>,
    /// Index of the batch to resume from
    pub failed_batch: usize,
    /// Number of batches the track was partitioned into
    pub total_batches: usize,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Translation stopped part way through a track
    #[error("Translation error: {0}")]
    Incomplete(#[from] IncompleteTranslation),

    /// An external media tool failed
    #[error("Media tool error: {0}")]
    Media(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
