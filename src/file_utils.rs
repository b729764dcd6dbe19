use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::app_config::{BurnFormat, BurnSource, DirectoryConfig};

// @module: File and directory utilities

// @const: Video container extensions picked up from the source directory
pub const SUPPORTED_VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "mkv", "avi", "m4v", "webm"];

// @const: Characters replaced in file stems used for output names
const UNSAFE_STEM_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Check whether a path has a supported video extension
    pub fn is_video_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| SUPPORTED_VIDEO_EXTENSIONS.contains(&ext.as_str()))
    }

    /// List video files directly inside `dir`, sorted by file name.
    ///
    /// A missing directory yields an empty list.
    pub fn find_videos<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut result = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if path.is_file() && Self::is_video_file(path) {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// File stem with path-unfriendly characters replaced by `_`
    pub fn safe_file_stem<P: AsRef<Path>>(path: P) -> String {
        let stem = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        stem.chars()
            .map(|c| if UNSAFE_STEM_CHARS.contains(&c) { '_' } else { c })
            .collect()
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}

/// Every file the pipeline reads or writes for one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub subtitles: PathBuf,
    pub translated: PathBuf,
    pub burned: PathBuf,
}

impl OutputPaths {
    /// Lay out output paths for `video` under the configured directories
    pub fn for_video(
        video: &Path,
        dirs: &DirectoryConfig,
        target_language: &str,
        burn_source: BurnSource,
        burn_format: BurnFormat,
    ) -> Self {
        let stem = FileManager::safe_file_stem(video);
        let burn_tag = match burn_source {
            BurnSource::Translated => target_language,
            BurnSource::Original => "orig",
        };

        OutputPaths {
            video: video.to_path_buf(),
            audio: dirs.audio.join(format!("{}.wav", stem)),
            subtitles: dirs.subtitles.join(format!("{}.srt", stem)),
            translated: dirs.translated.join(format!("{}.{}.srt", stem, target_language)),
            burned: dirs
                .burned
                .join(format!("{}.{}.burned.{}", stem, burn_tag, burn_format.extension())),
        }
    }

    /// Subtitle file the burn stage should render
    pub fn burn_input(&self, source: BurnSource) -> &Path {
        match source {
            BurnSource::Translated => &self.translated,
            BurnSource::Original => &self.subtitles,
        }
    }
}

/// English ordinal for a 1-based position: 1st, 2nd, 3rd, 4th, 11th, 21st
pub fn ordinal(n: usize) -> String {
    let suffix = if (11..=13).contains(&(n % 100)) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{}{}", n, suffix)
}
