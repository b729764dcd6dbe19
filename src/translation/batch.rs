/*!
 * Batch translation processing.
 *
 * A track is cut into consecutive batches of at most `max_batch_size` cues.
 * Batches are sent one after the other, every answer is checked against the
 * batch length, and the translated texts are put back onto the original
 * timings. When a batch fails, the cues of every earlier batch are returned
 * with the error so the caller can keep them or resume from the failed batch.
 */

use log::{debug, warn};

use crate::errors::{IncompleteTranslation, TranslationError};
use crate::providers::TranslationBackend;
use crate::subtitle_processor::{SubtitleEntry, SubtitleTrack};

/// A contiguous slice of cue texts sent to the backend in one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationBatch {
    /// Position of this batch in the partition
    pub index: usize,
    /// Track position of the first cue in this batch
    pub offset: usize,
    /// Cue texts, in track order
    pub lines: Vec<String>,
}

impl TranslationBatch {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Split a track's texts into `ceil(n / max_batch_size)` consecutive batches.
///
/// A `max_batch_size` of zero is treated as one.
pub fn partition(track: &SubtitleTrack, max_batch_size: usize) -> Vec<TranslationBatch> {
    let size = max_batch_size.max(1);
    track
        .entries
        .chunks(size)
        .enumerate()
        .map(|(index, chunk)| TranslationBatch {
            index,
            offset: index * size,
            lines: chunk.iter().map(|e| e.text.clone()).collect(),
        })
        .collect()
}

/// Batch translator for processing subtitle entries in batches
pub struct BatchTranslator<B: TranslationBackend> {
    /// The translation backend to use
    backend: B,

    /// Upper bound on cues per request
    max_batch_size: usize,
}

impl<B: TranslationBackend> BatchTranslator<B> {
    /// Create a new batch translator
    pub fn new(backend: B, max_batch_size: usize) -> Self {
        Self {
            backend,
            max_batch_size: max_batch_size.max(1),
        }
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Translate one batch and check the answer has one line per input line.
    ///
    /// Holds no state between calls, so a failed batch can simply be sent again.
    pub async fn translate_batch(
        &self,
        batch: &TranslationBatch,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        let translated = self
            .backend
            .translate_batch(&batch.lines, target_language)
            .await
            .map_err(|source| TranslationError::Backend {
                batch_index: batch.index,
                source,
            })?;

        if translated.len() != batch.len() {
            return Err(TranslationError::Alignment {
                batch_index: batch.index,
                expected: batch.len(),
                actual: translated.len(),
            });
        }

        Ok(translated)
    }

    /// Translate every cue of `track`, keeping cue count and timings.
    pub async fn translate_track(
        &self,
        track: &SubtitleTrack,
        target_language: &str,
    ) -> Result<SubtitleTrack, IncompleteTranslation> {
        self.resume(track, target_language, Vec::new()).await
    }

    /// Continue a translation whose first `completed.len()` cues are already done.
    ///
    /// `completed` must be the `completed` field of a previous
    /// `IncompleteTranslation` for the same track and batch size, so it always
    /// ends on a batch boundary.
    pub async fn resume(
        &self,
        track: &SubtitleTrack,
        target_language: &str,
        completed: Vec<SubtitleEntry>,
    ) -> Result<SubtitleTrack, IncompleteTranslation> {
        let batches = partition(track, self.max_batch_size);
        let total_batches = batches.len();
        let done = completed.len();
        let mut translated = completed;
        translated.reserve(track.len().saturating_sub(done));

        for batch in batches.iter().filter(|b| b.offset >= done) {
            debug!(
                "Translating batch {}/{} ({} cues)",
                batch.index + 1,
                total_batches,
                batch.len()
            );

            match self.translate_batch(batch, target_language).await {
                Ok(lines) => {
                    let sources = &track.entries[batch.offset..batch.offset + batch.len()];
                    translated.extend(sources.iter().zip(lines).map(|(cue, text)| cue.with_text(text)));
                }
                Err(error) => {
                    warn!("Batch {}/{} failed: {}", batch.index + 1, total_batches, error);
                    return Err(IncompleteTranslation {
                        error,
                        completed: translated,
                        failed_batch: batch.index,
                        total_batches,
                    });
                }
            }
        }

        Ok(SubtitleTrack::from_entries(translated))
    }
}
