/*!
 * Tests for ffmpeg filter and argument building
 */

use anyhow::Result;
use std::path::{Path, PathBuf};

use vidsubs::app_config::{BurnConfig, BurnFormat};
use vidsubs::media::{
    build_subtitles_filter, codec_args, detect_default_font, filter_ffmpeg_stderr, parse_duration_ms, BurnOptions,
};
use crate::common;

#[test]
fn test_buildSubtitlesFilter_withAllOptions_shouldQuoteEveryValue() {
    let options = BurnOptions {
        font: Some("Noto Sans SC".to_string()),
        font_size: Some(28),
        margin_v: Some(40),
        fonts_dir: Some(PathBuf::from("fonts")),
        format: BurnFormat::Mp4,
    };

    let filter = build_subtitles_filter(Path::new("subs/it's.srt"), &options);

    assert_eq!(
        filter,
        "subtitles='subs/it\\'s.srt':charenc=UTF-8:fontsdir='fonts':force_style='FontName=Noto Sans SC,FontSize=28,MarginV=40'"
    );
}

#[test]
fn test_buildSubtitlesFilter_withoutStyling_shouldOnlySetCharset() {
    let filter = build_subtitles_filter(Path::new("a.srt"), &BurnOptions::default());
    assert_eq!(filter, "subtitles='a.srt':charenc=UTF-8");
}

#[test]
fn test_codecArgs_shouldMatchContainer() {
    assert!(codec_args(BurnFormat::Mp4).contains(&"libx264"));
    assert!(codec_args(BurnFormat::Webm).contains(&"libvpx-vp9"));
    assert!(codec_args(BurnFormat::Webm).contains(&"libopus"));
}

#[test]
fn test_burnOptionsFromConfig_withBundledFontDir_shouldDetectFont() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    std::fs::create_dir_all(temp_dir.path().join("fonts").join("Noto_Sans_SC"))?;

    let options = BurnOptions::from_config(&BurnConfig::default(), temp_dir.path());

    assert_eq!(options.font.as_deref(), Some("Noto Sans SC"));
    assert_eq!(options.fonts_dir, Some(temp_dir.path().join("fonts").join("Noto_Sans_SC")));
    assert_eq!(options.font_size, Some(28));
    assert_eq!(options.margin_v, Some(40));
    Ok(())
}

#[test]
fn test_burnOptionsFromConfig_withExplicitFont_shouldKeepIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = BurnConfig::default();
    config.font = Some("Arial".to_string());
    config.fonts_dir = Some(PathBuf::from("/opt/fonts"));

    let options = BurnOptions::from_config(&config, temp_dir.path());

    assert_eq!(options.font.as_deref(), Some("Arial"));
    assert_eq!(options.fonts_dir, Some(PathBuf::from("/opt/fonts")));
    Ok(())
}

#[test]
fn test_detectDefaultFont_withEmptyFontsDir_shouldFindNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    std::fs::create_dir_all(temp_dir.path().join("fonts"))?;
    assert!(detect_default_font(temp_dir.path()).is_none());

    common::create_test_file(&temp_dir.path().join("fonts"), "NotoSansSC-Regular.otf", "")?;
    assert_eq!(
        detect_default_font(temp_dir.path()),
        Some((temp_dir.path().join("fonts"), "Noto Sans SC".to_string()))
    );
    Ok(())
}

#[test]
fn test_parseDurationMs_withGarbage_shouldBeNone() {
    assert_eq!(parse_duration_ms("5.0"), Some(5000));
    assert_eq!(parse_duration_ms(""), None);
    assert_eq!(parse_duration_ms("-3"), None);
}

#[test]
fn test_filterFfmpegStderr_shouldKeepLibassErrors() {
    let stderr = "ffmpeg version 6.0\n  libavutil      58.  2.100\n  Stream #0:0: Video: h264\nlibass: Error opening font\n";
    assert_eq!(filter_ffmpeg_stderr(stderr), "libass: Error opening font");
    assert!(filter_ffmpeg_stderr("").starts_with("unknown ffmpeg error"));
}
