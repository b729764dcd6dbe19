use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::IncompleteTranslation;
use crate::file_utils::{ordinal, FileManager, OutputPaths};
use crate::language_utils;
use crate::media::{self, BurnOptions};
use crate::providers::openai::OpenAI;
use crate::providers::{TranscriptionBackend, TranslationBackend};
use crate::segment_adapter;
use crate::subtitle_processor::SubtitleTrack;
use crate::translation::{BatchTranslator, TokenUsageStats, TranslationService};

// @module: Application controller driving the video pipeline

/// What to do with one pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    Run,
    Skip,
}

impl StageAction {
    fn from_exists(exists: bool, overwrite: bool) -> Self {
        if exists && !overwrite { Self::Skip } else { Self::Run }
    }

    pub fn is_run(self) -> bool {
        self == Self::Run
    }
}

/// Run/skip decision for every stage of one video, fixed before any work starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePlan {
    pub audio: StageAction,
    pub transcribe: StageAction,
    /// `None` when translation is disabled
    pub translate: Option<StageAction>,
    /// `None` when burn-in is disabled
    pub burn: Option<StageAction>,
}

impl StagePlan {
    /// Decide each stage from which outputs already exist.
    ///
    /// Audio is only extracted when a transcription will consume it.
    pub fn from_outputs(paths: &OutputPaths, config: &Config) -> Self {
        let overwrite = config.overwrite;
        let transcribe = StageAction::from_exists(paths.subtitles.is_file(), overwrite);
        let audio = if transcribe.is_run() {
            StageAction::from_exists(paths.audio.is_file(), overwrite)
        } else {
            StageAction::Skip
        };

        StagePlan {
            audio,
            transcribe,
            translate: config
                .translation
                .enabled
                .then(|| StageAction::from_exists(paths.translated.is_file(), overwrite)),
            burn: config
                .burn
                .enabled
                .then(|| StageAction::from_exists(paths.burned.is_file(), overwrite)),
        }
    }

    /// Whether any planned stage shells out to ffmpeg
    pub fn needs_ffmpeg(&self) -> bool {
        self.audio.is_run() || self.burn.is_some_and(StageAction::is_run)
    }
}

/// Outcome of a folder run
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Videos whose every stage completed or was skipped
    pub completed: usize,
    /// Videos that stopped on an error, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Translation usage over the whole run, when the backend tracks it
    pub usage: Option<TokenUsageStats>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.completed + self.failed.len()
    }
}

/// Main application controller for the subtitle pipeline
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Speech-to-text backend
    transcriber: Box<dyn TranscriptionBackend>,

    // @field: Batch translator over the configured backend
    translator: BatchTranslator<Box<dyn TranslationBackend>>,
}

impl Controller {
    // @method: Create a new controller with the hosted backends from config
    pub fn with_config(config: Config) -> Result<Self> {
        let transcriber = OpenAI::new_with_timeout(
            config.transcription.get_api_key(),
            config.transcription.endpoint.clone(),
            config.transcription.model.clone(),
            config.transcription.timeout_secs,
        )
        .with_language(config.transcription_language().map(str::to_string));
        let translator = TranslationService::new(&config.translation)
            .context("Failed to create translation service")?;

        Ok(Self::with_backends(config, Box::new(transcriber), Box::new(translator)))
    }

    /// Create a controller around explicit backends
    pub fn with_backends(
        config: Config,
        transcriber: Box<dyn TranscriptionBackend>,
        translator: Box<dyn TranslationBackend>,
    ) -> Self {
        let max_batch_size = config.translation.common.max_batch_size;
        Self {
            config,
            transcriber,
            translator: BatchTranslator::new(translator, max_batch_size),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Output paths for one video under the configured layout
    pub fn output_paths(&self, video: &Path) -> OutputPaths {
        OutputPaths::for_video(
            video,
            &self.config.directories,
            &self.config.target_language,
            self.config.burn.source,
            self.config.burn.format,
        )
    }

    /// Stage plan for one video as of now
    pub fn plan(&self, paths: &OutputPaths) -> StagePlan {
        StagePlan::from_outputs(paths, &self.config)
    }

    /// Process every video in the configured source directory.
    ///
    /// A failing video is logged and counted; the remaining videos still run.
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let dirs = &self.config.directories;

        let videos = FileManager::find_videos(&dirs.videos)?;
        if videos.is_empty() {
            warn!("No videos found in {}", dirs.videos.display());
            return Ok(RunSummary::default());
        }

        for dir in [&dirs.audio, &dirs.subtitles] {
            FileManager::ensure_dir(dir)?;
        }
        if self.config.translation.enabled {
            FileManager::ensure_dir(&dirs.translated)?;
        }

        info!("Kicking off");
        info!("Source: {}", dirs.videos.display());
        info!("Videos to process: {}", videos.len());
        if !self.config.translation.enabled {
            info!("Translation: disabled");
        }
        info!("Burn-in: {}", if self.config.burn.enabled { "enabled" } else { "disabled" });
        if self.config.burn.enabled {
            info!("Output format: {}", self.config.burn.format.extension());
        }
        for (i, video) in videos.iter().enumerate() {
            info!("  {}. {}", i + 1, display_file_name(video));
        }

        let progress_bar = ProgressBar::new(videos.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let mut summary = RunSummary::default();
        for (i, video) in videos.iter().enumerate() {
            progress_bar.set_message(display_file_name(video));
            info!("Start processing the {} file", ordinal(i + 1));
            info!("{}", display_file_name(video));

            match self.process_video(video).await {
                Ok(()) => summary.completed += 1,
                Err(e) => {
                    error!("Failed to process {}: {:#}", video.display(), e);
                    summary.failed.push((video.clone(), format!("{:#}", e)));
                }
            }
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        summary.usage = self.translator.backend().usage();
        if let Some(usage) = summary.usage.as_ref().filter(|u| u.requests > 0) {
            info!("Translation usage: {}", usage.summary());
        }
        info!(
            "All done: {} of {} video(s) completed in {}",
            summary.completed,
            summary.total(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(summary)
    }

    /// Run every planned stage for one video
    pub async fn process_video(&self, video: &Path) -> Result<()> {
        let paths = self.output_paths(video);
        let plan = self.plan(&paths);
        debug!("Stage plan for {}: {:?}", video.display(), plan);

        if plan.needs_ffmpeg() {
            media::ensure_ffmpeg().await?;
        }

        info!("Processing audio");
        self.run_audio_stage(&paths, plan.audio).await?;

        info!("Transcribing");
        self.run_transcription_stage(&paths, plan.transcribe).await?;

        if let Some(action) = plan.translate {
            info!("Translating to {}", language_utils::display_name(&self.config.target_language));
            self.run_translation_stage(&paths, action).await?;
        }

        if let Some(action) = plan.burn {
            info!("Burning subtitles");
            self.run_burn_stage(&paths, action).await?;
        }

        Ok(())
    }

    async fn run_audio_stage(&self, paths: &OutputPaths, action: StageAction) -> Result<()> {
        if action == StageAction::Skip {
            if paths.audio.is_file() {
                warn!("Skip exists: {}", paths.audio.display());
            } else {
                debug!("Audio not needed, subtitles already exist");
            }
            return Ok(());
        }

        media::extract_audio(&paths.video, &paths.audio).await?;
        info!("Wrote: {}", paths.audio.display());
        Ok(())
    }

    async fn run_transcription_stage(&self, paths: &OutputPaths, action: StageAction) -> Result<()> {
        if action == StageAction::Skip {
            warn!("Skip exists: {}", paths.subtitles.display());
            return Ok(());
        }

        let transcript = self
            .transcriber
            .transcribe(&paths.audio)
            .await
            .with_context(|| format!("Transcription failed for {}", paths.audio.display()))?;

        let media_duration_ms = if transcript.needs_duration() {
            match media::probe_duration_ms(&paths.video).await {
                Ok(duration) => duration,
                Err(e) => {
                    warn!("Could not probe duration of {}: {}", paths.video.display(), e);
                    None
                }
            }
        } else {
            None
        };

        let track = segment_adapter::adapt(transcript.resolve(media_duration_ms))?;
        if track.is_empty() {
            warn!("Transcription of {} produced no cues", paths.audio.display());
        }
        track.write_to_srt(&paths.subtitles)?;
        info!("Wrote: {} ({} cues)", paths.subtitles.display(), track.len());
        Ok(())
    }

    async fn run_translation_stage(&self, paths: &OutputPaths, action: StageAction) -> Result<()> {
        if action == StageAction::Skip {
            warn!("Skip exists: {}", paths.translated.display());
            return Ok(());
        }

        let source = SubtitleTrack::read_from_srt(&paths.subtitles)?;
        let start_time = Instant::now();
        let translated = self
            .translate_with_retry(&source)
            .await
            .with_context(|| format!("Translation failed for {}", paths.subtitles.display()))?;

        translated.write_to_srt(&paths.translated)?;
        info!(
            "Wrote: {} ({} cues in {})",
            paths.translated.display(),
            translated.len(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(())
    }

    async fn run_burn_stage(&self, paths: &OutputPaths, action: StageAction) -> Result<()> {
        if action == StageAction::Skip {
            warn!("Skip exists: {}", paths.burned.display());
            return Ok(());
        }

        let input = paths.burn_input(self.config.burn.source);
        if !input.is_file() {
            return Err(anyhow!("SRT not found: {}", input.display()));
        }

        let options = BurnOptions::from_config(&self.config.burn, Path::new("."));
        if let Some(font) = &options.font {
            info!("Font: {}", font);
        }
        if let Some(dir) = &options.fonts_dir {
            info!("Fonts dir: {}", dir.display());
        }

        media::burn_subtitles(&paths.video, input, &paths.burned, &options).await?;
        info!("Wrote: {}", paths.burned.display());
        Ok(())
    }

    /// Translate a track, resuming from the failed batch with exponential backoff.
    ///
    /// Gives up after `retry_count` resumptions and returns the last
    /// incomplete result.
    pub async fn translate_with_retry(&self, track: &SubtitleTrack) -> Result<SubtitleTrack, IncompleteTranslation> {
        let common = &self.config.translation.common;
        let target = &self.config.target_language;

        let mut result = self.translator.translate_track(track, target).await;
        let mut attempt = 0;
        loop {
            match result {
                Ok(translated) => return Ok(translated),
                Err(incomplete) if attempt < common.retry_count => {
                    attempt += 1;
                    let backoff = Duration::from_millis(
                        common.retry_backoff_ms.saturating_mul(1u64 << (attempt - 1).min(16)),
                    );
                    warn!(
                        "Retrying from batch {}/{} in {:?} (attempt {}/{})",
                        incomplete.failed_batch + 1,
                        incomplete.total_batches,
                        backoff,
                        attempt,
                        common.retry_count
                    );
                    tokio::time::sleep(backoff).await;
                    result = self.translator.resume(track, target, incomplete.completed).await;
                }
                Err(incomplete) => return Err(incomplete),
            }
        }
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

fn display_file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
