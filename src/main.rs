// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use vidsubs::app_config::{self, BurnFormat, BurnSource, Config, TranslationProvider};
use vidsubs::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Gemini,
    #[value(name = "openai")]
    OpenAI,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Gemini => TranslationProvider::Gemini,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for BurnSource to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliBurnSource {
    Translated,
    Original,
}

impl From<CliBurnSource> for BurnSource {
    fn from(cli_source: CliBurnSource) -> Self {
        match cli_source {
            CliBurnSource::Translated => BurnSource::Translated,
            CliBurnSource::Original => BurnSource::Original,
        }
    }
}

/// CLI Wrapper for BurnFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliBurnFormat {
    Mp4,
    Webm,
}

impl From<CliBurnFormat> for BurnFormat {
    fn from(cli_format: CliBurnFormat) -> Self {
        match cli_format {
            CliBurnFormat::Mp4 => BurnFormat::Mp4,
            CliBurnFormat::Webm => BurnFormat::Webm,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transcribe, translate and optionally burn subtitles (default command)
    Run(RunArgs),

    /// Generate shell completions for vidsubs
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Directory containing the videos to process
    #[arg(short, long, value_name = "DIR")]
    src: Option<PathBuf>,

    /// Target language code (e.g., 'zh', 'fr', 'es'); an empty code skips translation
    #[arg(short = 'l', long = "lang", alias = "target-language")]
    target_language: Option<String>,

    /// Stop after transcription, without translating
    #[arg(long)]
    no_translate: bool,

    /// Spoken language hint for transcription ('auto' to detect)
    #[arg(long)]
    source_language: Option<String>,

    /// Regenerate outputs that already exist
    #[arg(short = 'f', long)]
    overwrite: bool,

    /// Transcription model (whisper-1 returns timestamps)
    #[arg(long)]
    asr_model: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum number of cues sent per translation request
    #[arg(long)]
    max_batch_size: Option<usize>,

    /// Burn subtitles into a copy of each video
    #[arg(long)]
    burn_in: bool,

    /// Which subtitles to burn
    #[arg(long, value_enum)]
    burn_use: Option<CliBurnSource>,

    /// Font family for burned subtitles
    #[arg(long)]
    burn_font: Option<String>,

    /// Font size for burned subtitles
    #[arg(long)]
    burn_font_size: Option<u32>,

    /// Bottom margin for burned subtitles, in pixels
    #[arg(long)]
    burn_margin_v: Option<u32>,

    /// Directory with font files for burned subtitles
    #[arg(long)]
    burn_fonts_dir: Option<PathBuf>,

    /// Container of the burned video
    #[arg(long, value_enum)]
    burn_format: Option<CliBurnFormat>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// vidsubs - video subtitles with AI
///
/// Extracts audio from every video in a folder, transcribes it, translates the
/// subtitles with an AI provider and optionally burns them into the video.
#[derive(Parser, Debug)]
#[command(name = "vidsubs")]
#[command(version)]
#[command(about = "AI-powered video subtitle generation and translation")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "vidsubs transcribes videos and translates their subtitles using AI providers.

EXAMPLES:
    vidsubs                                     # Process ./videos with conf.json
    vidsubs --src ./clips -l fr                 # Translate ./clips into French
    vidsubs -f                                  # Regenerate existing outputs
    vidsubs -p openai -m gpt-4o-mini            # Use a specific provider and model
    vidsubs --burn-in --burn-format webm        # Also burn subtitles into webm copies
    vidsubs --log-level debug                   # Show per-batch progress
    vidsubs completions bash > vidsubs.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    gemini - Google Gemini API (default: gemini-2.5-flash, GEMINI_API_KEY)
    openai - OpenAI API (default: gpt-4o-mini, OPENAI_API_KEY)
    ollama - Local Ollama server (default: llama3.2:3b)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // Filtering happens through log::max_level so it can change after init
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config or the CLI says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vidsubs", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Run(args)) => run_pipeline(args).await,
        None => run_pipeline(cli.run).await,
    }
}

/// Load the config file, or write a default one when it does not exist
fn load_or_create_config(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        let file = File::open(config_path)
            .with_context(|| format!("Failed to open config file: {}", config_path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path.display());
        let config = Config::default();

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", config_path.display()))?;

        Ok(config)
    }
}

/// Apply command line overrides on top of the loaded config
fn apply_overrides(config: &mut Config, options: &RunArgs) {
    if let Some(src) = &options.src {
        config.directories.videos = src.clone();
    }
    match options.target_language.as_deref().map(str::trim) {
        Some("") => config.translation.enabled = false,
        Some(target_lang) => config.target_language = target_lang.to_string(),
        None => {}
    }
    if options.no_translate {
        config.translation.enabled = false;
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if options.overwrite {
        config.overwrite = true;
    }
    if let Some(asr_model) = &options.asr_model {
        config.transcription.model = asr_model.clone();
    }
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if let Some(max_batch_size) = options.max_batch_size {
        config.translation.common.max_batch_size = max_batch_size;
    }

    if options.burn_in {
        config.burn.enabled = true;
    }
    if let Some(source) = &options.burn_use {
        config.burn.source = source.clone().into();
    }
    if let Some(font) = &options.burn_font {
        config.burn.font = Some(font.clone());
    }
    if let Some(font_size) = options.burn_font_size {
        config.burn.font_size = font_size;
    }
    if let Some(margin_v) = options.burn_margin_v {
        config.burn.margin_v = margin_v;
    }
    if let Some(fonts_dir) = &options.burn_fonts_dir {
        config.burn.fonts_dir = Some(fonts_dir.clone());
    }
    if let Some(format) = &options.burn_format {
        config.burn.format = format.clone().into();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_pipeline(options: RunArgs) -> Result<()> {
    // A CLI log level applies before the config is even read
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config)?;
    apply_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    if config.translation.enabled {
        info!(
            "Translating into {} with {} ({})",
            vidsubs::language_utils::display_name(&config.target_language),
            config.translation.provider.display_name(),
            config.translation.get_model()
        );
    } else {
        info!("Translation disabled, writing source subtitles only");
    }

    let controller = Controller::with_config(config)?;
    let summary = controller.run().await?;

    if summary.failed.is_empty() {
        return Ok(());
    }
    for (video, reason) in &summary.failed {
        error!("{}: {}", video.display(), reason);
    }
    Err(anyhow!("{} of {} video(s) failed", summary.failed.len(), summary.total()))
}
