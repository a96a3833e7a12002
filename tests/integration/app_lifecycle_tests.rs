/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use srtwai::app_config::Config;
use srtwai::app_controller::Controller;
use srtwai::providers::mock::{MockBehavior, MockProvider};
use srtwai::subtitle_processor::SubtitleCollection;
use crate::common;

fn mock_controller(provider: MockProvider) -> Controller {
    Controller::with_provider(common::test_config(), Arc::new(provider)).without_progress()
}

/// Test that an unusable configuration is rejected up front
#[test]
fn test_with_config_withMissingApiKey_shouldFail() {
    let result = Controller::with_config(Config::default());

    let message = format!("{:#}", result.err().unwrap());
    assert!(message.contains("translation.api_key"), "{}", message);
}

/// Test building the real client without touching the network
#[test]
fn test_with_config_withValidConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::with_config(common::test_config())?;

    assert_eq!(controller.config().target_language, "fr");
    Ok(())
}

/// Test connection checks
#[tokio::test]
async fn test_test_connection_withMockProviders_shouldReportFailure() {
    assert!(mock_controller(MockProvider::working()).test_connection().await.is_ok());
    assert!(
        mock_controller(MockProvider::new(MockBehavior::Unauthorized))
            .test_connection()
            .await
            .is_err()
    );
}

/// Test translating a single file
#[tokio::test]
async fn test_run_withSubtitleFile_shouldWriteTranslatedFile() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output_dir = temp_dir.path().join("output");

    mock_controller(MockProvider::working())
        .run(input.clone(), output_dir.clone(), false)
        .await?;

    let output = output_dir.join("movie_fr.srt");
    let written = SubtitleCollection::from_file(&output)?;
    assert_eq!(written.entries.len(), 3);
    assert_eq!(written.entries[0].text, "[TRANSLATED] This is a test subtitle.");
    assert!(!output_dir.join("srtwai.issues.log").exists());
    Ok(())
}

/// Test that existing outputs are kept unless forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&output_dir)?;
    let output = common::create_test_file(&output_dir, "movie_fr.srt", "keep me")?;

    let provider = MockProvider::working();
    let controller = mock_controller(provider.clone());

    controller.run(input.clone(), output_dir.clone(), false).await?;
    assert_eq!(fs::read_to_string(&output)?, "keep me");
    assert_eq!(provider.request_count(), 0);

    controller.run(input, output_dir, true).await?;
    assert!(fs::read_to_string(&output)?.contains("[TRANSLATED]"));
    Ok(())
}

/// Test that lines the model skipped are logged as issues
#[tokio::test]
async fn test_run_withDroppedLine_shouldRecordIssue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output_dir = temp_dir.path().join("output");

    mock_controller(MockProvider::dropping(2))
        .run(input, output_dir.clone(), false)
        .await?;

    let written = SubtitleCollection::from_file(output_dir.join("movie_fr.srt"))?;
    assert_eq!(written.entries[1].text, "It contains multiple entries.");

    let issues = fs::read_to_string(output_dir.join("srtwai.issues.log"))?;
    assert!(issues.contains("1 line(s) kept the original text: 2"), "{}", issues);
    Ok(())
}

/// Test translating a folder twice
#[tokio::test]
async fn test_run_folder_withSeveralFiles_shouldProcessThenSkip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_dir = temp_dir.path();
    common::create_test_subtitle(input_dir, "a.srt")?;
    common::create_test_subtitle(input_dir, "b.srt")?;
    common::create_test_file(input_dir, "notes.txt", "not a subtitle")?;
    let output_dir = input_dir.join("translated");

    let controller = mock_controller(MockProvider::working());

    let first = controller.run_folder(input_dir, &output_dir, false).await?;
    assert_eq!((first.processed, first.skipped, first.failed), (2, 0, 0));
    assert!(output_dir.join("a_fr.srt").exists());
    assert!(output_dir.join("b_fr.srt").exists());

    // Outputs inside the input folder are not picked up as inputs
    let second = controller.run_folder(input_dir, &output_dir, false).await?;
    assert_eq!((second.processed, second.skipped, second.failed), (0, 2, 0));

    let issues = fs::read_to_string(output_dir.join("srtwai.issues.log"))?;
    assert_eq!(issues.lines().filter(|l| l.contains("Folder processing completed")).count(), 2);
    Ok(())
}

/// Test a folder without subtitles
#[tokio::test]
async fn test_run_folder_withNoSubtitles_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "notes.txt", "nothing here")?;

    let result = mock_controller(MockProvider::working())
        .run_folder(temp_dir.path(), &temp_dir.path().join("out"), false)
        .await;

    assert!(result.is_err());
    Ok(())
}

/// Test inputs that cannot be translated
#[tokio::test]
async fn test_run_withInvalidInputs_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let not_subtitle = common::create_test_file(temp_dir.path(), "readme.md", "# Title")?;
    let controller = mock_controller(MockProvider::working());
    let output_dir = temp_dir.path().join("out");

    assert!(controller.run(temp_dir.path().join("missing.srt"), output_dir.clone(), false).await.is_err());
    assert!(controller.run(not_subtitle, output_dir, false).await.is_err());
    Ok(())
}
