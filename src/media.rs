use anyhow::{anyhow, Context, Result};
use log::{debug, error};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::{BurnConfig, BurnFormat};
use crate::file_utils::FileManager;

// @module: ffmpeg and ffprobe invocations

const PROBE_TIMEOUT: Duration = Duration::from_secs(60);
const AUDIO_TIMEOUT: Duration = Duration::from_secs(600);
const BURN_TIMEOUT: Duration = Duration::from_secs(4 * 3600);

// @const: Bundled font locations checked in order, with the family they hold
const FONT_CANDIDATES: [(&str, &str); 3] = [
    ("fonts/Noto_Sans_SC", "Noto Sans SC"),
    ("fonts/Noto Sans SC", "Noto Sans SC"),
    ("fonts", "Noto Sans SC"),
];

/// Styling and container options for burning subtitles into a video
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BurnOptions {
    pub font: Option<String>,
    pub font_size: Option<u32>,
    pub margin_v: Option<u32>,
    pub fonts_dir: Option<PathBuf>,
    pub format: BurnFormat,
}

impl BurnOptions {
    /// Options from config, filling font and fonts dir from bundled fonts under `base_dir`
    pub fn from_config(config: &BurnConfig, base_dir: &Path) -> Self {
        let mut options = BurnOptions {
            font: config.font.clone().filter(|f| !f.trim().is_empty()),
            font_size: Some(config.font_size).filter(|s| *s > 0),
            margin_v: Some(config.margin_v).filter(|m| *m > 0),
            fonts_dir: config.fonts_dir.clone(),
            format: config.format,
        };

        if options.font.is_none() || options.fonts_dir.is_none() {
            if let Some((dir, family)) = detect_default_font(base_dir) {
                options.font.get_or_insert(family);
                options.fonts_dir.get_or_insert(dir);
            }
        }
        options
    }

    /// Comma separated libass style overrides, if any
    fn force_style(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(font) = &self.font {
            parts.push(format!("FontName={}", font));
        }
        if let Some(size) = self.font_size {
            parts.push(format!("FontSize={}", size));
        }
        if let Some(margin) = self.margin_v {
            parts.push(format!("MarginV={}", margin));
        }
        if parts.is_empty() { None } else { Some(parts.join(",")) }
    }
}

/// Single-quote a value for an ffmpeg filter option, escaping inner quotes
pub fn quote_filter_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', "\\'"))
}

/// Build the `subtitles=` video filter for burning `srt_path`
pub fn build_subtitles_filter(srt_path: &Path, options: &BurnOptions) -> String {
    let mut filter = format!(
        "subtitles={}:charenc=UTF-8",
        quote_filter_value(&srt_path.to_string_lossy())
    );
    if let Some(dir) = &options.fonts_dir {
        filter.push_str(&format!(":fontsdir={}", quote_filter_value(&dir.to_string_lossy())));
    }
    if let Some(style) = options.force_style() {
        filter.push_str(&format!(":force_style={}", quote_filter_value(&style)));
    }
    filter
}

/// Codec arguments for the output container
pub fn codec_args(format: BurnFormat) -> &'static [&'static str] {
    match format {
        BurnFormat::Mp4 => &["-c:v", "libx264", "-c:a", "copy"],
        BurnFormat::Webm => &["-c:v", "libvpx-vp9", "-b:v", "2M", "-c:a", "libopus"],
    }
}

/// Look for a bundled CJK font directory under `base_dir`
pub fn detect_default_font(base_dir: &Path) -> Option<(PathBuf, String)> {
    FONT_CANDIDATES.iter().find_map(|(relative, family)| {
        let dir = base_dir.join(relative);
        if !dir.is_dir() {
            return None;
        }
        // The family-named directories count even when empty
        if *relative != "fonts" || contains_font_files(&dir) {
            Some((dir, family.to_string()))
        } else {
            None
        }
    })
}

fn contains_font_files(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                let name = e.file_name().to_string_lossy().to_lowercase();
                name.ends_with(".ttf") || name.ends_with(".otf")
            })
        })
        .unwrap_or(false)
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    // Indentation matters: "  lib" is the version banner, "libass:" is a real error
    let noise_prefixes = [
        "ffmpeg version",
        "ffprobe version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Chapter",
        "  Stream #",
        "    Metadata:",
        "      ",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| !line.trim().is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .map(str::trim)
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

/// Run a media tool to completion, killing it after `timeout`
async fn run_tool(program: &str, args: &[String], timeout: Duration) -> Result<Output> {
    debug!("Running {} {}", program, args.join(" "));
    let future = Command::new(program).args(args).kill_on_drop(true).output();

    let output = tokio::select! {
        result = future => {
            result.with_context(|| format!("Failed to execute {}", program))?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(anyhow!("{} timed out after {} seconds", program, timeout.as_secs()));
        }
    };

    if !output.status.success() {
        let filtered = filter_ffmpeg_stderr(&String::from_utf8_lossy(&output.stderr));
        error!("{} failed: {}", program, filtered);
        return Err(anyhow!("{} failed: {}", program, filtered));
    }
    Ok(output)
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Check that ffmpeg is installed and on PATH
pub async fn ensure_ffmpeg() -> Result<()> {
    run_tool("ffmpeg", &["-version".to_string()], PROBE_TIMEOUT)
        .await
        .map(|_| ())
        .context("ffmpeg not found. Please install ffmpeg and ensure it's on PATH")
}

/// Extract a 16 kHz mono track from `video` into `audio`
pub async fn extract_audio(video: &Path, audio: &Path) -> Result<()> {
    if let Some(parent) = audio.parent() {
        FileManager::ensure_dir(parent)?;
    }
    let args = vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(video),
        "-ac".to_string(),
        "1".to_string(),
        "-ar".to_string(),
        "16000".to_string(),
        "-vn".to_string(),
        path_arg(audio),
    ];
    run_tool("ffmpeg", &args, AUDIO_TIMEOUT).await?;
    Ok(())
}

/// Media duration in milliseconds, `None` if ffprobe cannot tell
pub async fn probe_duration_ms(path: &Path) -> Result<Option<u64>> {
    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        path_arg(path),
    ];
    let output = run_tool("ffprobe", &args, PROBE_TIMEOUT).await?;
    Ok(parse_duration_ms(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse ffprobe's seconds output into milliseconds
pub fn parse_duration_ms(stdout: &str) -> Option<u64> {
    let seconds: f64 = stdout.trim().parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some((seconds * 1000.0).round() as u64)
    } else {
        None
    }
}

/// Re-encode `video` with `srt` rendered into the picture
pub async fn burn_subtitles(video: &Path, srt: &Path, output: &Path, options: &BurnOptions) -> Result<()> {
    if let Some(parent) = output.parent() {
        FileManager::ensure_dir(parent)?;
    }
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        path_arg(video),
        "-vf".to_string(),
        build_subtitles_filter(srt, options),
    ];
    args.extend(codec_args(options.format).iter().map(|s| s.to_string()));
    args.push(path_arg(output));

    run_tool("ffmpeg", &args, BURN_TIMEOUT).await?;
    Ok(())
}
