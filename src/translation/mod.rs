/*!
 * Translation of subtitle tracks using AI providers.
 *
 * It is split into several submodules:
 *
 * - `batch`: Partitioning a track and translating it batch by batch
 * - `core`: The provider-backed translation service
 * - `prompts`: Request payloads and strict response parsing
 */

// Re-export main types for easier usage
pub use self::batch::{partition, BatchTranslator, TranslationBatch};
pub use self::core::{TokenUsageStats, TranslationService};
pub use self::prompts::{parse_translation_response, TranslationPayload, TranslationPromptBuilder};

// Submodules
pub mod batch;
pub mod core;
pub mod prompts;
