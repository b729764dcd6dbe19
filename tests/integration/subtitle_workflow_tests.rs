/*!
 * Integration tests for the transcript to translated SRT workflow
 */

use anyhow::Result;

use vidsubs::errors::TranslationError;
use vidsubs::providers::mock::MockProvider;
use vidsubs::segment_adapter::{adapt, Segment, Transcript};
use vidsubs::subtitle_processor::{SubtitleEntry, SubtitleTrack};
use vidsubs::translation::{partition, BatchTranslator, TranslationService};
use crate::common::{self, mock_backends::{ScriptedBackend, Step}};

#[tokio::test]
async fn test_translateTrack_withThreeCuesInBatchesOfTwo_shouldKeepTimings() {
    let track = SubtitleTrack::from_entries(vec![
        SubtitleEntry::new(0, 900, "Hi"),
        SubtitleEntry::new(1000, 1800, "there"),
        SubtitleEntry::new(2500, 4000, "friend"),
    ]);
    let backend = ScriptedBackend::new(vec![Step::answer(&["Bonjour", "là"]), Step::answer(&["ami"])]);
    let translator = BatchTranslator::new(backend.clone(), 2);

    let translated = translator.translate_track(&track, "fr").await.unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            vec!["Hi".to_string(), "there".to_string()],
            vec!["friend".to_string()],
        ]
    );
    assert_eq!(translated.texts(), vec!["Bonjour", "là", "ami"]);
    for (out, source) in translated.entries.iter().zip(&track.entries) {
        assert_eq!((out.start_time_ms, out.end_time_ms), (source.start_time_ms, source.end_time_ms));
    }
}

#[tokio::test]
async fn test_translateTrack_withMisalignedSecondBatch_shouldNotProduceTrack() {
    let track = common::track_from_texts(&["Hi", "there", "friend"]);
    let backend = ScriptedBackend::new(vec![Step::answer(&["Bonjour", "là"]), Step::answer(&["ami", "extra"])]);
    let translator = BatchTranslator::new(backend, 2);

    let incomplete = translator.translate_track(&track, "fr").await.unwrap_err();

    assert!(matches!(
        incomplete.error,
        TranslationError::Alignment { batch_index: 1, expected: 1, actual: 2 }
    ));
    assert_eq!(
        incomplete.completed.iter().map(|c| c.text.as_str()).collect::<Vec<_>>(),
        vec!["Bonjour", "là"]
    );
}

#[tokio::test]
async fn test_workflow_fromSegmentsToTranslatedFile_shouldRoundTripThroughSrt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let transcript = Transcript {
        segments: vec![
            Segment::from_seconds(3.0, 4.5, " third "),
            Segment::from_seconds(0.0, 1.2, "first"),
            Segment::from_seconds(1.5, 2.75, "second"),
        ],
        text: "first second third".to_string(),
        duration_ms: Some(5000),
    };

    let source = adapt(transcript.resolve(None))?;
    let source_path = temp_dir.path().join("subs").join("clip.srt");
    source.write_to_srt(&source_path)?;

    let reloaded = SubtitleTrack::read_from_srt(&source_path)?;
    assert_eq!(reloaded, source);
    assert_eq!(reloaded.texts(), vec!["first", "second", "third"]);

    let service = TranslationService::with_provider(Box::new(MockProvider::working()), 0.3);
    let translator = BatchTranslator::new(service, 2);
    let translated = translator.translate_track(&reloaded, "ja").await?;

    let translated_path = temp_dir.path().join("subs_zh").join("clip.ja.srt");
    translated.write_to_srt(&translated_path)?;
    let written = std::fs::read_to_string(&translated_path)?;

    assert!(written.starts_with("1\n00:00:00,000 --> 00:00:01,200\n[ja] first\n\n2\n"));
    assert!(written.contains("3\n00:00:03,000 --> 00:00:04,500\n[ja] third\n"));
    assert_eq!(translator.backend().usage().requests, 2);
    Ok(())
}

#[test]
fn test_workflow_withUntimedTranscript_shouldBeDetectableDownstream() -> Result<()> {
    let transcript = Transcript {
        segments: Vec::new(),
        text: "Everything said in one go".to_string(),
        duration_ms: None,
    };

    let track = adapt(transcript.resolve(Some(61_500)))?;
    let reparsed = SubtitleTrack::parse(&track.serialize())?;

    assert!(reparsed.spans_whole_media(61_500));
    assert_eq!(partition(&reparsed, 50).len(), 1);
    Ok(())
}
