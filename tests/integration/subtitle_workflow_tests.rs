/*!
 * End-to-end subtitle processing tests: parse, translate, write, read back
 */

use anyhow::Result;
use std::sync::Arc;
use srtwai::app_config::TranslationMode;
use srtwai::providers::mock::MockProvider;
use srtwai::subtitle_processor::SubtitleCollection;
use crate::common;

/// Test a full round trip through a subtitle file
#[test]
fn test_workflow_withWorkingProvider_shouldTranslateEveryEntry() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;
    let output = temp_dir.path().join("episode_fr.srt");

    let collection = SubtitleCollection::from_file(&input)?;
    let translator = common::translator(Arc::new(MockProvider::working()), TranslationMode::Batch, 2, 2);
    let run = tokio_test::block_on(translator.translate(&collection.entries, |_, _| {}));
    collection.write_translated(&run.results, &output)?;

    let written = SubtitleCollection::from_file(&output)?;
    assert_eq!(written.entries.len(), collection.entries.len());
    for (original, translated) in collection.entries.iter().zip(&written.entries) {
        assert_eq!(translated.number, original.number);
        assert_eq!(translated.timestamp, original.timestamp);
        assert_eq!(translated.text, format!("[TRANSLATED] {}", original.text));
    }
    Ok(())
}

/// Test that a failed run still writes a complete file
#[test]
fn test_workflow_withFailingProvider_shouldWriteOriginalText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;
    let output = temp_dir.path().join("episode_fr.srt");

    let collection = SubtitleCollection::from_file(&input)?;
    let translator = common::translator(Arc::new(MockProvider::failing()), TranslationMode::Batch, 3, 2);
    let run = tokio_test::block_on(translator.translate(&collection.entries, |_, _| {}));
    collection.write_translated(&run.results, &output)?;

    let written = SubtitleCollection::from_file(&output)?;
    assert_eq!(written.entries, collection.entries);
    Ok(())
}

/// Test that line mode and batch mode produce the same file
#[test]
fn test_workflow_withLineMode_shouldMatchBatchModeOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "episode.srt")?;
    let collection = SubtitleCollection::from_file(&input)?;

    let batch_run = tokio_test::block_on(
        common::translator(Arc::new(MockProvider::working()), TranslationMode::Batch, 3, 2)
            .translate(&collection.entries, |_, _| {}),
    );
    let line_run = tokio_test::block_on(
        common::translator(Arc::new(MockProvider::working()), TranslationMode::Line, 3, 2)
            .translate(&collection.entries, |_, _| {}),
    );

    let batch_texts: Vec<_> = batch_run.results.iter().map(|r| r.text.clone()).collect();
    let line_texts: Vec<_> = line_run.results.iter().map(|r| r.text.clone()).collect();
    assert_eq!(batch_texts, line_texts);
    assert_eq!(batch_run.batch_count, 1);
    assert_eq!(line_run.batch_count, 3);
    Ok(())
}
