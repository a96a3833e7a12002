/*!
 * Common test utilities for the srtwai test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use srtwai::app_config::{Config, TranslationMode};
use srtwai::providers::Provider;
use srtwai::subtitle_processor::SubtitleEntry;
use srtwai::translation::{
    BatchTranslator, ModelSettings, Retrier, RetryPolicy, TranslationModel, TranslationPromptBuilder,
};


/// Route library logs through env_logger (RUST_LOG) once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
"#;
    create_test_file(dir, filename, content)
}

/// `count` entries numbered from 1, text `line N`
pub fn sample_entries(count: usize) -> Vec<SubtitleEntry> {
    (1..=count)
        .map(|n| {
            SubtitleEntry::new(
                n,
                format!("00:00:{:02},000 --> 00:00:{:02},500", n, n),
                format!("line {}", n),
            )
        })
        .collect()
}

/// Valid configuration that never needs network access
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.target_language = "fr".to_string();
    config.translation.api_key = "test-key".to_string();
    config.translation.max_workers = 4;
    config.translation.retry.max_retries = 1;
    config.translation.retry.initial_delay_ms = 1;
    config
}

/// Translator over `provider` with fast retries
pub fn translator(
    provider: Arc<dyn Provider>,
    mode: TranslationMode,
    batch_size: usize,
    max_workers: usize,
) -> BatchTranslator {
    let settings = ModelSettings {
        model: "mock".to_string(),
        temperature: 1.3,
        system_prompt: "translate".to_string(),
        request_timeout: None,
    };
    let retrier = Retrier::new(RetryPolicy::new(1, Duration::from_millis(1), 2.0));
    let model = TranslationModel::new(provider, settings, max_workers, retrier);
    BatchTranslator::new(
        Arc::new(model),
        TranslationPromptBuilder::new("English", "French"),
        mode,
        batch_size,
    )
}
