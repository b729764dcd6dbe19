/*!
 * Conversion of raw transcription output into subtitle tracks.
 *
 * A transcription backend answers either with timed segments or with a single
 * untimed text blob. The shape is resolved once into a `TranscriptionResult`
 * and then adapted into a `SubtitleTrack`.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::subtitle_processor::{SubtitleEntry, SubtitleTrack};

/// One timed unit of transcribed speech
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl Segment {
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Segment {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Build a segment from second offsets as reported by speech APIs.
    ///
    /// Seconds are rounded to whole milliseconds, negatives clamp to zero and
    /// the text is trimmed.
    pub fn from_seconds(start: f64, end: f64, text: &str) -> Self {
        Segment {
            start_ms: seconds_to_ms(start),
            end_ms: seconds_to_ms(end),
            text: text.trim().to_string(),
        }
    }
}

fn seconds_to_ms(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

/// Shape of a transcription, decided once at the adapter boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionResult {
    /// Per-segment timings are available
    TimedSegments(Vec<Segment>),

    /// Only the full text is known, together with the media length
    UntimedText { text: String, duration_ms: u64 },
}

/// Raw answer of a transcription backend before its shape is resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    /// Timed segments, empty when the backend does not provide them
    pub segments: Vec<Segment>,

    /// Full transcribed text
    pub text: String,

    /// Media duration reported by the backend, if any
    pub duration_ms: Option<u64>,
}

impl Transcript {
    /// Resolve into a tagged result.
    ///
    /// Segments win when present. Otherwise the untimed duration comes from
    /// the transcript, then from `media_duration_ms`, then defaults to zero.
    pub fn resolve(self, media_duration_ms: Option<u64>) -> TranscriptionResult {
        if !self.segments.is_empty() {
            return TranscriptionResult::TimedSegments(self.segments);
        }

        let duration_ms = self.duration_ms.or(media_duration_ms).unwrap_or(0);
        TranscriptionResult::UntimedText {
            text: self.text,
            duration_ms,
        }
    }

    /// True when the transcript carries no timing and needs a media duration
    pub fn needs_duration(&self) -> bool {
        self.segments.is_empty() && self.duration_ms.is_none()
    }
}

/// Convert a transcription result into a subtitle track.
///
/// Timed segments map one to one onto cues, stable-sorted by start time.
/// Untimed text becomes a single cue spanning `[0, duration_ms]`. Empty input
/// gives an empty track.
pub fn adapt(result: TranscriptionResult) -> Result<SubtitleTrack, SubtitleError> {
    match result {
        TranscriptionResult::TimedSegments(segments) => adapt_timed(segments),
        TranscriptionResult::UntimedText { text, duration_ms } => Ok(adapt_untimed(text, duration_ms)),
    }
}

fn adapt_timed(mut segments: Vec<Segment>) -> Result<SubtitleTrack, SubtitleError> {
    for (position, segment) in segments.iter().enumerate() {
        if segment.end_ms < segment.start_ms {
            return Err(SubtitleError::InvalidTiming {
                position,
                start_ms: segment.start_ms,
                end_ms: segment.end_ms,
            });
        }
    }

    if !segments.is_sorted_by_key(|s| s.start_ms) {
        debug!("Reordering {} transcription segments by start time", segments.len());
        segments.sort_by_key(|s| s.start_ms);
    }

    let entries = segments
        .into_iter()
        .map(|s| SubtitleEntry::new(s.start_ms, s.end_ms, s.text))
        .collect();

    Ok(SubtitleTrack::from_entries(entries))
}

// The blob is the cue body as is, apart from the trailing whitespace every cue drops
fn adapt_untimed(text: String, duration_ms: u64) -> SubtitleTrack {
    if text.trim().is_empty() {
        return SubtitleTrack::new();
    }

    warn!(
        "Transcription has no segment timings; emitting a single cue spanning 0-{}ms",
        duration_ms
    );
    SubtitleTrack::from_entries(vec![SubtitleEntry::new(0, duration_ms, text)])
}
