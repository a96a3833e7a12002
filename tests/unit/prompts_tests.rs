/*!
 * Tests for prompt construction
 */

use srtwai::app_config::TranslationMode;
use srtwai::translation::TranslationPromptBuilder;
use srtwai::translation::context::build_batches;
use srtwai::translation::prompts::{BatchRequest, LineRequest};
use crate::common;

/// Test the batch-mode system prompt
#[test]
fn test_build_system_prompt_withBatchMode_shouldAskForJsonArray() {
    let prompt = TranslationPromptBuilder::new("English", "Spanish").build_system_prompt();

    assert!(prompt.contains("translate English subtitles into Spanish"));
    assert!(prompt.contains("\"batch\""));
    assert!(prompt.contains("Return ONLY a JSON array"));
    assert!(!prompt.contains("{target_language}"));
    assert!(!prompt.contains("Specialist domains"));
}

/// Test the line-mode system prompt
#[test]
fn test_build_system_prompt_withLineMode_shouldAskForPlainText() {
    let prompt = TranslationPromptBuilder::new("English", "German")
        .with_mode(TranslationMode::Line)
        .build_system_prompt();

    assert!(prompt.contains("\"current_line\""));
    assert!(prompt.contains("Return only the German translation"));
    assert!(!prompt.contains("JSON array"));
}

/// Test the domain section
#[test]
fn test_build_system_prompt_withDomains_shouldListNonBlankDomains() {
    let domains = vec!["medicine".to_string(), " ".to_string(), "biology".to_string()];

    let prompt = TranslationPromptBuilder::new("English", "French")
        .with_domains(&domains)
        .build_system_prompt();

    assert!(prompt.contains("This content involves the following fields: medicine, biology"));
}

/// Test the batch-mode user message
#[test]
fn test_build_user_prompt_withBatchMode_shouldSerializeBatchWithContext() {
    let lines = common::sample_entries(6);
    let batches = build_batches(&lines, 2);
    let builder = TranslationPromptBuilder::new("English", "French");

    let message = builder.build_user_prompt(&batches[1]);
    let request: BatchRequest = serde_json::from_str(&message).unwrap();

    assert_eq!(request.context_before, vec!["line 1", "line 2"]);
    assert_eq!(request.context_after, vec!["line 5", "line 6"]);
    let numbers: Vec<usize> = request.batch.iter().map(|item| item.number).collect();
    assert_eq!(numbers, vec![3, 4]);
    assert_eq!(request.batch[0].text, "line 3");
}

/// Test the line-mode user message
#[test]
fn test_build_user_prompt_withLineMode_shouldSerializeCurrentLine() {
    let lines = common::sample_entries(3);
    let batches = build_batches(&lines, 1);
    let builder = TranslationPromptBuilder::new("English", "French").with_mode(TranslationMode::Line);

    let message = builder.build_user_prompt(&batches[0]);
    let request: LineRequest = serde_json::from_str(&message).unwrap();

    assert!(request.context_before.is_empty());
    assert_eq!(request.current_line, "line 1");
    assert_eq!(request.context_after, vec!["line 2", "line 3"]);
}
