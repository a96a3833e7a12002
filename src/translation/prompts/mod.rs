/*!
 * Prompt construction for subtitle translation.
 *
 * This module provides:
 * - The system prompt for each translation mode, with optional domains
 * - JSON request payloads built from context batches
 * - The response entry shape returned for batch requests
 */

pub mod templates;

// Re-export main types
pub use templates::{BatchRequest, LineRequest, PromptTemplate, TranslatedEntry, TranslationPromptBuilder};
