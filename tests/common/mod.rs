/*!
 * Common test utilities for the vidsubs test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use vidsubs::app_config::{Config, DirectoryConfig};
use vidsubs::subtitle_processor::{SubtitleEntry, SubtitleTrack};

// Re-export the mock backends module
pub mod mock_backends;

/// Route library log output through the test harness, once per process
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    if let Some(parent) = dir.join(filename).parent() {
        fs::create_dir_all(parent)?;
    }
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Sample SRT content with three cues
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// Track with one cue per text, one second apart
pub fn track_from_texts(texts: &[&str]) -> SubtitleTrack {
    SubtitleTrack::from_entries(
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let start = i as u64 * 1000;
                SubtitleEntry::new(start, start + 800, *text)
            })
            .collect(),
    )
}

/// Config whose directories all live under `root`, with no network keys needed
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.directories = DirectoryConfig {
        videos: root.join("videos"),
        audio: root.join("audio"),
        subtitles: root.join("subs"),
        translated: root.join("subs_zh"),
        burned: root.join("burned"),
    };
    config.transcription.api_key = "test-key".to_string();
    config.translation.active_provider_config_mut().api_key = "test-key".to_string();
    config.translation.common.retry_backoff_ms = 0;
    config.burn.enabled = false;
    config
}
