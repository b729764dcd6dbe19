/*!
 * Request and response contract for batch translation.
 *
 * A batch goes out as a JSON payload listing the cue texts in order, framed by
 * instructions that demand a JSON array of strings of the same length back.
 * The response parser tolerates the usual wrapping models add (code fences,
 * surrounding prose, an object around the array) but nothing else: any
 * element that is not a string fails the batch.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::CompletionRequest;

/// Task tag carried in every request payload
pub const TRANSLATE_TASK: &str = "translate_subtitles";

/// Object fields that may wrap the translated array
const WRAPPER_FIELDS: [&str; 2] = ["translations", "items"];

/// System prompt template for subtitle translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for subtitle translation.
    pub const SUBTITLE_TRANSLATOR: &'static str = "You are a professional subtitle translator. Translate each input string into \
{target_language} while preserving meaning, brevity, and readability.
Rules:
- Return ONLY a JSON array of strings, no commentary.
- If a JSON object is required, put the array under a \"translations\" key.
- Keep order and number of items exactly the same as input.
- Do not add or remove items, and never merge or split them.
- Keep line breaks inside an item where they appear in the original.
- Do not include timestamps or numbers unless in the original text.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default subtitle translator template.
    pub fn subtitle_translator() -> Self {
        Self::new(Self::SUBTITLE_TRANSLATOR)
    }

    /// Render the template for a target language
    pub fn render(&self, target_language: &str) -> String {
        self.template.replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::subtitle_translator()
    }
}

/// JSON payload describing one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationPayload {
    pub task: String,
    pub target_language: String,
    pub items: Vec<String>,
}

impl TranslationPayload {
    pub fn new(target_language: &str, items: &[String]) -> Self {
        Self {
            task: TRANSLATE_TASK.to_string(),
            target_language: target_language.to_string(),
            items: items.to_vec(),
        }
    }

    /// Recover the payload embedded in a user prompt
    pub fn extract(prompt: &str) -> Option<Self> {
        let start = prompt.find('{')?;
        let end = prompt.rfind('}')?;
        if end <= start {
            return None;
        }
        serde_json::from_str(&prompt[start..=end]).ok()
    }
}

/// Builder for the prompt of a single batch
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    template: PromptTemplate,
    target_language: String,
    items: Vec<String>,
    temperature: f32,
}

impl TranslationPromptBuilder {
    /// Create a new prompt builder.
    pub fn new(target_language: &str) -> Self {
        Self {
            template: PromptTemplate::default(),
            target_language: target_language.to_string(),
            items: Vec::new(),
            temperature: 0.3,
        }
    }

    /// Set the lines to translate.
    pub fn with_items(mut self, items: &[String]) -> Self {
        self.items = items.to_vec();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the system prompt.
    pub fn build_system_prompt(&self) -> String {
        let name = language_utils::display_name(&self.target_language);
        let target = if name == self.target_language {
            name
        } else {
            format!("{} ({})", name, self.target_language)
        };
        self.template.render(&target)
    }

    /// Build the user prompt around the JSON payload.
    pub fn build_user_prompt(&self) -> String {
        let payload = TranslationPayload::new(&self.target_language, &self.items);
        let json = serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string());
        format!(
            "Input JSON:\n{}\nRespond with only a JSON array of {} strings matching the items.",
            json,
            self.items.len()
        )
    }

    /// Build the full completion request.
    pub fn build(&self) -> CompletionRequest {
        CompletionRequest::new(self.build_system_prompt(), self.build_user_prompt())
            .temperature(self.temperature)
            .json()
    }
}

/// Parse a backend answer into an ordered list of strings.
///
/// Accepted shapes, after stripping Markdown code fences:
/// a bare JSON array of strings, an object whose `translations` or `items`
/// field is such an array, or the outermost `[...]` found inside prose.
pub fn parse_translation_response(text: &str) -> Result<Vec<String>, ProviderError> {
    let body = strip_code_fences(text.trim());
    if body.is_empty() {
        return Err(ProviderError::ParseError("Empty translation response".to_string()));
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return strings_from_value(value);
    }

    let start = body.find('[');
    let end = body.rfind(']');
    match (start, end) {
        (Some(start), Some(end)) if end > start => {
            let value = serde_json::from_str::<Value>(&body[start..=end]).map_err(|e| {
                ProviderError::ParseError(format!("Translation array is not valid JSON: {}", e))
            })?;
            strings_from_value(value)
        }
        _ => Err(ProviderError::ParseError(format!(
            "No JSON array found in translation response: {}",
            preview(body)
        ))),
    }
}

fn strings_from_value(value: Value) -> Result<Vec<String>, ProviderError> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s),
                other => Err(ProviderError::ParseError(format!(
                    "Translation item {} is not a string: {}",
                    i, other
                ))),
            })
            .collect(),
        Value::Object(mut map) => {
            let inner = WRAPPER_FIELDS
                .iter()
                .find_map(|field| map.remove(*field))
                .ok_or_else(|| {
                    ProviderError::ParseError("Translation object has no translations array".to_string())
                })?;
            match inner {
                Value::Array(_) => strings_from_value(inner),
                _ => Err(ProviderError::ParseError(
                    "Translation object field is not an array".to_string(),
                )),
            }
        }
        other => Err(ProviderError::ParseError(format!(
            "Expected a JSON array of strings, got: {}",
            preview(&other.to_string())
        ))),
    }
}

fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
