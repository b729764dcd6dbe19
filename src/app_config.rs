use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles loading defaults and validating the pipeline settings
/// read from `conf.json`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Spoken language hint for transcription ("auto" lets the backend detect it)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Where videos are read from and outputs are written to
    #[serde(default)]
    pub directories: DirectoryConfig,

    /// Speech-to-text settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Subtitle burn-in settings
    #[serde(default)]
    pub burn: BurnConfig,

    /// Regenerate outputs that already exist
    #[serde(default)]
    pub overwrite: bool,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Input and output directories for each stage
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DirectoryConfig {
    #[serde(default = "default_videos_dir")]
    pub videos: PathBuf,

    #[serde(default = "default_audio_dir")]
    pub audio: PathBuf,

    #[serde(default = "default_subtitles_dir")]
    pub subtitles: PathBuf,

    #[serde(default = "default_translated_dir")]
    pub translated: PathBuf,

    #[serde(default = "default_burned_dir")]
    pub burned: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            videos: default_videos_dir(),
            audio: default_audio_dir(),
            subtitles: default_subtitles_dir(),
            translated: default_translated_dir(),
            burned: default_burned_dir(),
        }
    }
}

/// Speech-to-text service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    /// `whisper-1` returns segment timings, newer models return text only
    #[serde(default = "default_transcription_model")]
    pub model: String,

    /// API key, falls back to `OPENAI_API_KEY`
    #[serde(default = "String::new")]
    pub api_key: String,

    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: default_transcription_model(),
            api_key: String::new(),
            endpoint: default_openai_endpoint(),
            timeout_secs: default_transcription_timeout_secs(),
        }
    }
}

impl TranscriptionConfig {
    /// Configured key or the `OPENAI_API_KEY` environment variable
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        env_key(&["OPENAI_API_KEY"])
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: OpenAI
    OpenAI,
    // @provider: Ollama
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    /// Environment variables consulted when no key is configured
    fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            Self::OpenAI => &["OPENAI_API_KEY"],
            Self::Ollama => &[],
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model_for(provider_type),
            api_key: String::new(),
            endpoint: default_endpoint_for(provider_type),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Run the translation stage at all
    #[serde(default = "default_translation_enabled")]
    pub enabled: bool,

    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Maximum number of cues sent to the backend in one request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// How many times a failed batch is retried before the video is given up
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// Which subtitle file gets rendered into the video
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BurnSource {
    #[default]
    Translated,
    Original,
}

/// Container of the burned video
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BurnFormat {
    #[default]
    Mp4,
    Webm,
}

impl BurnFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }
}

/// Subtitle burn-in configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BurnConfig {
    /// Render subtitles into a copy of each video
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub source: BurnSource,

    /// Font family name, detected from the bundled fonts when unset
    #[serde(default)]
    pub font: Option<String>,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Bottom margin in pixels
    #[serde(default = "default_margin_v")]
    pub margin_v: u32,

    /// Directory with .ttf/.otf files for libass
    #[serde(default)]
    pub fonts_dir: Option<PathBuf>,

    #[serde(default)]
    pub format: BurnFormat,
}

impl Default for BurnConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source: BurnSource::default(),
            font: None,
            font_size: default_font_size(),
            margin_v: default_margin_v(),
            fonts_dir: None,
            format: BurnFormat::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_videos_dir() -> PathBuf {
    PathBuf::from("videos")
}

fn default_audio_dir() -> PathBuf {
    PathBuf::from("audio")
}

fn default_subtitles_dir() -> PathBuf {
    PathBuf::from("subs")
}

fn default_translated_dir() -> PathBuf {
    PathBuf::from("subs_zh")
}

fn default_burned_dir() -> PathBuf {
    PathBuf::from("burned")
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_transcription_timeout_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_translation_enabled() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    50
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_font_size() -> u32 {
    28
}

fn default_margin_v() -> u32 {
    40
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model_for(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::Gemini => "gemini-2.5-flash".to_string(),
        TranslationProvider::OpenAI => "gpt-4o-mini".to_string(),
        TranslationProvider::Ollama => "llama3.2:3b".to_string(),
    }
}

fn default_endpoint_for(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::Gemini => default_gemini_endpoint(),
        TranslationProvider::OpenAI => default_openai_endpoint(),
        TranslationProvider::Ollama => default_ollama_endpoint(),
    }
}

// First non-empty environment variable among `names`
fn env_key(names: &[&str]) -> String {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !self.source_language.eq_ignore_ascii_case("auto") {
            crate::language_utils::validate_language_code(&self.source_language)?;
        }

        if self.burn.enabled && self.burn.source == BurnSource::Translated && !self.translation.enabled {
            return Err(anyhow!(
                "Burning translated subtitles requires translation (set burn.source to \"original\")"
            ));
        }

        if self.translation.enabled {
            crate::language_utils::validate_language_code(&self.target_language)?;

            if self.translation.common.max_batch_size == 0 {
                return Err(anyhow!("translation.common.max_batch_size must be at least 1"));
            }
        }

        if self.transcription.get_api_key().is_empty() {
            return Err(anyhow!(
                "Transcription API key is required (set transcription.api_key or OPENAI_API_KEY)"
            ));
        }

        if !self.translation.enabled {
            return Ok(());
        }

        let provider = self.translation.provider;
        if provider != TranslationProvider::Ollama && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} provider (set it in conf.json or {})",
                provider.display_name(),
                provider.api_key_env_vars().join(" / ")
            ));
        }

        Ok(())
    }

    /// Language hint to pass to the transcription backend, if any
    pub fn transcription_language(&self) -> Option<&str> {
        if self.source_language.is_empty() || self.source_language.eq_ignore_ascii_case("auto") {
            None
        } else {
            Some(&self.source_language)
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            directories: DirectoryConfig::default(),
            transcription: TranscriptionConfig::default(),
            translation: TranslationConfig::default(),
            burn: BurnConfig::default(),
            overwrite: false,
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider entry, inserting defaults if missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let position = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(position) => position,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[position]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        default_model_for(self.provider)
    }

    /// Get the API key for the active provider, falling back to the environment
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        env_key(self.provider.api_key_env_vars())
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        default_endpoint_for(self.provider)
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: default_translation_enabled(),
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Gemini),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
