/*!
 * # vidsubs - video subtitles with AI
 *
 * A Rust library that turns a folder of videos into subtitle files in a
 * target language.
 *
 * ## Features
 *
 * - Extract audio from video files with ffmpeg
 * - Transcribe speech with the OpenAI transcription API, with or without
 *   segment timestamps
 * - Translate subtitles in fixed-size batches using:
 *   - Gemini API
 *   - OpenAI API
 *   - Ollama (local LLM)
 * - Preserve cue count and timing across translation
 * - Optionally burn subtitles into the picture
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT track model, parsing and serialization
 * - `segment_adapter`: Transcription results to subtitle tracks
 * - `translation`: AI-powered translation services:
 *   - `translation::batch`: Batch partitioning and alignment checks
 *   - `translation::core`: The provider-backed translation backend
 *   - `translation::prompts`: Request payloads and response parsing
 * - `media`: ffmpeg and ffprobe invocations
 * - `file_utils`: File system operations and output layout
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for the hosted backends:
 *   - `providers::gemini`: Gemini API client
 *   - `providers::openai`: OpenAI API client
 *   - `providers::ollama`: Ollama API client
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod media;
pub mod providers;
pub mod segment_adapter;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary, StageAction, StagePlan};
pub use errors::{AppError, IncompleteTranslation, ProviderError, SubtitleError, TranslationError};
pub use segment_adapter::{adapt, Segment, Transcript, TranscriptionResult};
pub use subtitle_processor::{SubtitleEntry, SubtitleTrack};
pub use translation::{partition, BatchTranslator, TranslationBatch, TranslationService};
