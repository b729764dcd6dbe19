/*!
 * Tests for translation request building and response parsing
 */

use vidsubs::errors::ProviderError;
use vidsubs::translation::prompts::TRANSLATE_TASK;
use vidsubs::translation::{parse_translation_response, TranslationPayload, TranslationPromptBuilder};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_build_shouldEmbedOrderedPayloadAndRequestJson() {
    let items = strings(&["Hi", "there", "friend"]);
    let request = TranslationPromptBuilder::new("fr")
        .with_items(&items)
        .with_temperature(0.1)
        .build();

    assert!(request.json);
    assert_eq!(request.temperature, 0.1);
    assert!(request.system.contains("French (fr)"));
    assert!(request.system.contains("JSON array"));
    assert!(request.user.contains("3 strings"));

    let payload = TranslationPayload::extract(&request.user).unwrap();
    assert_eq!(payload.task, TRANSLATE_TASK);
    assert_eq!(payload.target_language, "fr");
    assert_eq!(payload.items, items);
}

#[test]
fn test_buildSystemPrompt_withUnknownCode_shouldUseCodeAsIs() {
    let prompt = TranslationPromptBuilder::new("xx").build_system_prompt();
    assert!(prompt.contains("into xx while"));
}

#[test]
fn test_parse_withBareArray_shouldReturnStrings() {
    let parsed = parse_translation_response(r#"["Bonjour", "là"]"#).unwrap();
    assert_eq!(parsed, strings(&["Bonjour", "là"]));
}

#[test]
fn test_parse_withCodeFence_shouldStripIt() {
    let parsed = parse_translation_response("```json\n[\"a\", \"b\\nc\"]\n```").unwrap();
    assert_eq!(parsed, strings(&["a", "b\nc"]));
}

#[test]
fn test_parse_withWrappedObject_shouldUseTranslationsField() {
    let parsed = parse_translation_response(r#"{"translations": ["x", "y"]}"#).unwrap();
    assert_eq!(parsed, strings(&["x", "y"]));

    let parsed = parse_translation_response(r#"{"items": ["z"]}"#).unwrap();
    assert_eq!(parsed, strings(&["z"]));
}

#[test]
fn test_parse_withSurroundingProse_shouldFindArray() {
    let parsed = parse_translation_response("Sure! Here it is:\n[\"uno\", \"dos\"]\nAnything else?").unwrap();
    assert_eq!(parsed, strings(&["uno", "dos"]));
}

#[test]
fn test_parse_withEmptyArray_shouldReturnEmpty() {
    assert!(parse_translation_response("[]").unwrap().is_empty());
}

#[test]
fn test_parse_withNonStringElement_shouldBeParseError() {
    let result = parse_translation_response(r#"["ok", 2, "fine"]"#);
    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[test]
fn test_parse_withFreeText_shouldBeParseError() {
    let result = parse_translation_response("Bonjour\nlà\nami");
    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}

#[test]
fn test_parse_withEmptyOrBlank_shouldBeParseError() {
    assert!(matches!(parse_translation_response(""), Err(ProviderError::ParseError(_))));
    assert!(matches!(parse_translation_response("  \n"), Err(ProviderError::ParseError(_))));
}

#[test]
fn test_parse_withObjectWithoutArray_shouldBeParseError() {
    let result = parse_translation_response(r#"{"result": "Bonjour"}"#);
    assert!(matches!(result, Err(ProviderError::ParseError(_))));
}
