use std::fmt;
use std::fs;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Context, Result};
use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;

// @module: Subtitle track model and SRT codec

// @const: SRT timing line, accepting ',' or '.' as the millisecond separator
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})(?:\s.*)?$")
        .expect("timestamp regex is valid")
});

// @returns: Milliseconds, or None when the hour count overflows
fn timestamp_to_ms(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes * 60_000 + seconds * 1_000 + millis)
}

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Display text, may span several lines
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry.
    ///
    /// SRT cannot carry trailing whitespace, so it is stripped from every line
    /// and trailing empty lines are dropped.
    pub fn new(start_time_ms: u64, end_time_ms: u64, text: impl Into<String>) -> Self {
        SubtitleEntry {
            start_time_ms,
            end_time_ms,
            text: Self::normalize_text(text.into()),
        }
    }

    /// Copy of this cue carrying different text and the same timing
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self::new(self.start_time_ms, self.end_time_ms, text)
    }

    fn normalize_text(text: String) -> String {
        let clean = text.lines().all(|line| line.len() == line.trim_end().len())
            && !text.ends_with('\n')
            && !text.contains('\r');
        if clean {
            return text;
        }
        text.lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end_matches('\n')
            .to_string()
    }

    /// Duration of the cue in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_time_ms.saturating_sub(self.start_time_ms)
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm` or `HH:MM:SS.mmm`) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 || parts[3].len() != 3 {
            return Err(anyhow::anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 {
            return Err(anyhow::anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        timestamp_to_ms(hours, minutes, seconds, millis)
            .ok_or_else(|| anyhow::anyhow!("Timestamp out of range: {}", timestamp))
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Timing line for this cue
    pub fn format_timing(&self) -> String {
        format!(
            "{} --> {}",
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms)
        )
    }
}

/// Ordered sequence of cues making up one subtitle file.
///
/// Sequence order is the rendering order. Cue numbers only exist in the
/// serialized form and are recomputed from position on every write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleTrack {
    /// Cues in rendering order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleTrack {
    /// Create an empty track
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already ordered list of cues
    pub fn from_entries(entries: Vec<SubtitleEntry>) -> Self {
        SubtitleTrack { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cue texts in track order
    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    /// True when the track is a single cue covering `[0, duration_ms]`,
    /// which is what an untimed transcription degrades to.
    pub fn spans_whole_media(&self, duration_ms: u64) -> bool {
        matches!(
            self.entries.as_slice(),
            [only] if only.start_time_ms == 0 && only.end_time_ms == duration_ms
        )
    }

    /// Parse SRT text into a track.
    ///
    /// Blank lines between blocks and trailing whitespace are tolerated. A blank
    /// line only ends a cue when the next non-blank line is a cue number followed
    /// by a timing line, so blank lines inside cue text survive. Cue text that
    /// itself contains a blank line, a number and a timing line in that order is
    /// indistinguishable from a new block.
    pub fn parse(content: &str) -> Result<Self, SubtitleError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let lines: Vec<&str> = content.lines().map(str::trim_end).collect();
        let mut entries = Vec::new();

        let mut pos = Self::skip_blank(&lines, 0);
        while pos < lines.len() {
            let (entry, next) = Self::parse_block(&lines, pos)?;
            entries.push(entry);
            pos = next;
        }

        let overlap_count = entries
            .windows(2)
            .filter(|pair| pair[0].end_time_ms > pair[1].start_time_ms)
            .count();
        if overlap_count > 0 {
            debug!("Track contains {} overlapping cue(s)", overlap_count);
        }

        Ok(SubtitleTrack { entries })
    }

    /// Parse one block starting at `start`, returning the cue and the line
    /// index where the next block begins.
    fn parse_block(lines: &[&str], start: usize) -> Result<(SubtitleEntry, usize), SubtitleError> {
        let index_line = lines[start].trim();
        if TIMESTAMP_REGEX.is_match(index_line) {
            return Err(SubtitleError::MalformedTrack {
                line: start + 1,
                reason: "cue is missing its index line".to_string(),
            });
        }
        if index_line.parse::<usize>().is_err() {
            return Err(SubtitleError::MalformedTrack {
                line: start + 1,
                reason: format!("invalid cue index '{}'", index_line),
            });
        }

        let timing_pos = start + 1;
        let timing_line = lines.get(timing_pos).map(|l| l.trim()).unwrap_or("");
        let (start_ms, end_ms) = Self::parse_timing_line(timing_line).ok_or_else(|| {
            SubtitleError::MalformedTrack {
                line: timing_pos + 1,
                reason: format!("invalid timestamp line '{}'", timing_line),
            }
        })?;
        if end_ms < start_ms {
            return Err(SubtitleError::MalformedTrack {
                line: timing_pos + 1,
                reason: format!("cue ends ({}ms) before it starts ({}ms)", end_ms, start_ms),
            });
        }

        let mut text_lines: Vec<&str> = Vec::new();
        let mut pos = timing_pos + 1;
        while pos < lines.len() {
            if lines[pos].trim().is_empty() {
                let next = Self::skip_blank(lines, pos);
                if next >= lines.len() || Self::starts_block(lines, next) {
                    pos = next;
                    break;
                }
                // Blank lines followed by more text belong to this cue
                text_lines.extend(std::iter::repeat("").take(next - pos));
                pos = next;
                continue;
            }
            text_lines.push(lines[pos]);
            pos += 1;
        }

        Ok((SubtitleEntry::new(start_ms, end_ms, text_lines.join("\n")), pos))
    }

    /// A block starts at a cue number directly followed by a valid timing line
    fn starts_block(lines: &[&str], pos: usize) -> bool {
        lines[pos].trim().parse::<usize>().is_ok()
            && lines
                .get(pos + 1)
                .is_some_and(|next| TIMESTAMP_REGEX.is_match(next.trim()))
    }

    fn skip_blank(lines: &[&str], mut pos: usize) -> usize {
        while pos < lines.len() && lines[pos].trim().is_empty() {
            pos += 1;
        }
        pos
    }

    fn parse_timing_line(line: &str) -> Option<(u64, u64)> {
        let caps = TIMESTAMP_REGEX.captures(line)?;
        let start = Self::timestamp_from_captures(&caps, 1)?;
        let end = Self::timestamp_from_captures(&caps, 5)?;
        Some((start, end))
    }

    fn timestamp_from_captures(caps: &regex::Captures, start_idx: usize) -> Option<u64> {
        let field = |offset: usize| -> Option<u64> { caps.get(start_idx + offset)?.as_str().parse().ok() };
        let (hours, minutes, seconds, millis) = (field(0)?, field(1)?, field(2)?, field(3)?);
        if minutes >= 60 || seconds >= 60 {
            return None;
        }
        timestamp_to_ms(hours, minutes, seconds, millis)
    }

    /// Render the track as SRT text with 1-based indices assigned by position
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}\n{}\n{}\n", i + 1, entry.format_timing(), entry.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Read and parse an SRT file
    pub fn read_from_srt<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        let track = Self::parse(&content)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;
        if track.is_empty() {
            warn!("Subtitle file contains no cues: {}", path.display());
        }
        Ok(track)
    }

    /// Write subtitles to an SRT file, creating parent directories as needed
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        FileManager::write_to_file(path, &self.serialize())
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
