/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::Path;

use vidsubs::app_config::{BurnFormat, BurnSource, DirectoryConfig};
use vidsubs::file_utils::{ordinal, FileManager, OutputPaths};
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_fileExists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(FileManager::dir_exists(temp_dir.path()));
    Ok(())
}

#[test]
fn test_findVideos_shouldListSupportedFilesSortedAndNonRecursive() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    for name in ["b.mkv", "a.MP4", "c.webm", "notes.txt", "clip.srt", "nested/d.mp4"] {
        common::create_test_file(dir, name, "")?;
    }

    let videos = FileManager::find_videos(dir)?;
    let names: Vec<String> = videos
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(names, vec!["a.MP4", "b.mkv", "c.webm"]);
    Ok(())
}

#[test]
fn test_findVideos_withMissingDir_shouldBeEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(FileManager::find_videos(temp_dir.path().join("nope"))?.is_empty());
    Ok(())
}

#[test]
fn test_safeFileStem_shouldReplaceUnsafeCharacters() {
    assert_eq!(FileManager::safe_file_stem(Path::new("videos/a:b?c*.mp4")), "a_b_c_");
    assert_eq!(FileManager::safe_file_stem(Path::new("videos/plain name.mov")), "plain name");
}

#[test]
fn test_outputPaths_forVideo_shouldFollowLayout() {
    let dirs = DirectoryConfig::default();
    let paths = OutputPaths::for_video(
        Path::new("videos/talk.mp4"),
        &dirs,
        "zh",
        BurnSource::Translated,
        BurnFormat::Mp4,
    );

    assert_eq!(paths.audio, Path::new("audio/talk.wav"));
    assert_eq!(paths.subtitles, Path::new("subs/talk.srt"));
    assert_eq!(paths.translated, Path::new("subs_zh/talk.zh.srt"));
    assert_eq!(paths.burned, Path::new("burned/talk.zh.burned.mp4"));
    assert_eq!(paths.burn_input(BurnSource::Translated), Path::new("subs_zh/talk.zh.srt"));
}

#[test]
fn test_outputPaths_withOriginalWebm_shouldTagOrig() {
    let paths = OutputPaths::for_video(
        Path::new("videos/talk.mkv"),
        &DirectoryConfig::default(),
        "fr",
        BurnSource::Original,
        BurnFormat::Webm,
    );

    assert_eq!(paths.burned, Path::new("burned/talk.orig.burned.webm"));
    assert_eq!(paths.burn_input(BurnSource::Original), Path::new("subs/talk.srt"));
}

#[test]
fn test_ensureDir_shouldCreateNestedDirs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;
    FileManager::ensure_dir(&nested)?;

    assert!(nested.is_dir());
    Ok(())
}

#[test]
fn test_ordinal_shouldHandleTeens() {
    let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 101, 111].iter().map(|n| ordinal(*n)).collect();
    assert_eq!(
        rendered,
        vec!["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "101st", "111th"]
    );
}
