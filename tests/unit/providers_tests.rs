/*!
 * Tests for provider implementations and the provider-backed translation service
 */

use vidsubs::app_config::{TranslationConfig, TranslationProvider};
use vidsubs::errors::{ProviderError, TranslationError};
use vidsubs::providers::gemini::normalize_model_name;
use vidsubs::providers::mock::MockProvider;
use vidsubs::providers::ollama::Ollama;
use vidsubs::providers::{Provider, TranslationBackend};
use vidsubs::translation::{BatchTranslator, TranslationPromptBuilder, TranslationService};
use crate::common;

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_normalizeModelName_withAliases_shouldMapToPublishedNames() {
    assert_eq!(normalize_model_name("gemini-flash"), "gemini-2.5-flash");
    assert_eq!(normalize_model_name("models/gemini-pro"), "gemini-2.5-pro");
    assert_eq!(normalize_model_name("gemini-2.0-flash"), "gemini-2.0-flash");
}

#[test]
fn test_ollamaNew_withoutScheme_shouldDefaultToHttp() {
    let ollama = Ollama::new("localhost:11434/", "llama3.2:3b", 30).unwrap();
    assert_eq!(ollama.base_url(), "http://localhost:11434");
}

#[test]
fn test_translationServiceNew_withEachProvider_shouldBuild() {
    for provider in [TranslationProvider::Gemini, TranslationProvider::OpenAI, TranslationProvider::Ollama] {
        let mut config = TranslationConfig::default();
        config.provider = provider;
        config.active_provider_config_mut().api_key = "test-key".to_string();
        assert!(TranslationService::new(&config).is_ok(), "{} should build", provider);
    }
}

#[tokio::test]
async fn test_mockProvider_withWorkingBehavior_shouldTranslateEachItem() {
    let provider = MockProvider::working();
    let request = TranslationPromptBuilder::new("es")
        .with_items(&lines(&["one", "two"]))
        .build();

    let response = provider.complete(request).await.unwrap();

    assert_eq!(response.text, r#"["[es] one","[es] two"]"#);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translationService_withScriptedFencedAnswer_shouldParse() {
    let provider = MockProvider::scripted(["```json\n[\"Bonjour\", \"là\"]\n```"]);
    let service = TranslationService::with_provider(Box::new(provider), 0.2);

    let translated = service.translate_batch(&lines(&["Hi", "there"]), "fr").await.unwrap();

    assert_eq!(translated, lines(&["Bonjour", "là"]));
    assert_eq!(service.usage().requests, 1);
}

#[tokio::test]
async fn test_translationService_withFailingProvider_shouldSurfaceApiError() {
    let service = TranslationService::with_provider(Box::new(MockProvider::failing()), 0.3);

    let result = service.translate_batch(&lines(&["x"]), "fr").await;

    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 500, .. })));
    assert!(service.test_connection().await.is_err());
}

#[tokio::test]
async fn test_batchTranslator_withWrongLengthProvider_shouldReportAlignment() {
    let service = TranslationService::with_provider(Box::new(MockProvider::wrong_length()), 0.3);
    let translator = BatchTranslator::new(service, 2);
    let track = common::track_from_texts(&["a", "b", "c"]);

    let incomplete = translator.translate_track(&track, "de").await.unwrap_err();

    assert!(matches!(
        incomplete.error,
        TranslationError::Alignment { batch_index: 0, expected: 2, actual: 1 }
    ));
    assert!(incomplete.completed.is_empty());
}

#[tokio::test]
async fn test_batchTranslator_withIntermittentProvider_shouldStopAtFailingBatch() {
    let provider = MockProvider::intermittent(3);
    let counter = provider.clone();
    let service = TranslationService::with_provider(Box::new(provider), 0.3);
    let translator = BatchTranslator::new(service, 1);
    let track = common::track_from_texts(&["a", "b", "c"]);

    let incomplete = translator.translate_track(&track, "de").await.unwrap_err();

    assert_eq!(incomplete.failed_batch, 2);
    assert_eq!(incomplete.completed[1].text, "[de] b");
    assert_eq!(counter.request_count(), 3);

    let translated = translator.resume(&track, "de", incomplete.completed).await.unwrap();
    assert_eq!(translated.texts(), lines(&["[de] a", "[de] b", "[de] c"]));
}
