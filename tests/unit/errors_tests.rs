/*!
 * Tests for error types
 */

use vidsubs::errors::{AppError, IncompleteTranslation, ProviderError, SubtitleError, TranslationError};
use vidsubs::subtitle_processor::SubtitleEntry;

#[test]
fn test_fromStatus_shouldClassifyByCode() {
    assert!(matches!(ProviderError::from_status(401, "no"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "no"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, "slow"), ProviderError::RateLimitExceeded(_)));
    assert!(matches!(
        ProviderError::from_status(500, "boom"),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_malformedTrack_display_shouldNameLine() {
    let error = SubtitleError::MalformedTrack {
        line: 7,
        reason: "invalid cue index 'x'".to_string(),
    };
    assert_eq!(error.to_string(), "Malformed subtitle track at line 7: invalid cue index 'x'");
}

#[test]
fn test_translationError_batchIndex_shouldComeFromEitherVariant() {
    let alignment = TranslationError::Alignment {
        batch_index: 4,
        expected: 2,
        actual: 3,
    };
    let backend = TranslationError::Backend {
        batch_index: 1,
        source: ProviderError::ConnectionError("down".to_string()),
    };

    assert_eq!(alignment.batch_index(), 4);
    assert_eq!(backend.batch_index(), 1);
    assert!(backend.to_string().contains("Connection error: down"));
}

#[test]
fn test_incompleteTranslation_shouldConvertIntoAppError() {
    let incomplete = IncompleteTranslation {
        error: TranslationError::Alignment {
            batch_index: 2,
            expected: 5,
            actual: 4,
        },
        completed: vec![SubtitleEntry::new(0, 1, "a"), SubtitleEntry::new(1, 2, "b")],
        failed_batch: 2,
        total_batches: 3,
    };

    let message = incomplete.to_string();
    assert!(message.contains("2 cues translated before batch 2 of 3"));

    let app_error: AppError = incomplete.into();
    assert!(matches!(app_error, AppError::Incomplete(_)));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.srt");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(_)));
}
