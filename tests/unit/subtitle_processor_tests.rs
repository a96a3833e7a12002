/*!
 * Tests for subtitle processing functionality
 */

use anyhow::Result;
use std::fs;
use srtwai::subtitle_processor::{SubtitleCollection, SubtitleEntry, write_translated_srt};
use srtwai::translation::TranslationResult;
use crate::common;

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withValidEntry_shouldFormatAsSrtBlock() {
    let entry = SubtitleEntry::new(7, "00:00:05,000 --> 00:00:10,000", "Test subtitle");

    assert_eq!(entry.to_string(), "7\n00:00:05,000 --> 00:00:10,000\nTest subtitle\n\n");
}

/// Test replacing the text of an entry
#[test]
fn test_with_text_withNewText_shouldKeepNumberAndTimestamp() {
    let entry = SubtitleEntry::new(3, "00:00:01,000 --> 00:00:02,000", "Hello");
    let translated = entry.with_text("Bonjour");

    assert_eq!(translated.number, 3);
    assert_eq!(translated.timestamp, entry.timestamp);
    assert_eq!(translated.text, "Bonjour");
}

/// Test parsing well-formed SRT content
#[test]
fn test_parse_srt_string_withValidContent_shouldParseEntriesInOrder() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:04,000\nFirst line\nsecond row\n\n2\n00:00:05,000 --> 00:00:09,000\nSecond\n";

    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].number, 1);
    assert_eq!(entries[0].timestamp, "00:00:01,000 --> 00:00:04,000");
    assert_eq!(entries[0].text, "First line second row");
    assert_eq!(entries[1].text, "Second");
    Ok(())
}

/// Test BOM, CRLF and broken blocks
#[test]
fn test_parse_srt_string_withBomCrlfAndBrokenBlocks_shouldSkipInvalidBlocks() -> Result<()> {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nKept\r\n\r\nabc\r\n00:00:03,000 --> 00:00:04,000\r\nBad number\r\n\r\n3\r\n00:00:05,000 --> 00:00:06,000\r\n";

    let entries = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Kept");
    Ok(())
}

/// Test empty input
#[test]
fn test_parse_srt_string_withEmptyContent_shouldReturnNoEntries() -> Result<()> {
    assert!(SubtitleCollection::parse_srt_string("")?.is_empty());
    assert!(SubtitleCollection::parse_srt_string("  \n\n ")?.is_empty());
    Ok(())
}

/// Test reading a subtitle file
#[test]
fn test_from_file_withSubtitleFile_shouldRememberSource() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;

    let collection = SubtitleCollection::from_file(&path)?;

    assert_eq!(collection.source_file, path);
    assert_eq!(collection.entries.len(), 3);
    assert_eq!(collection.entries[2].text, "For testing purposes.");
    Ok(())
}

/// Test reading a missing file
#[test]
fn test_from_file_withMissingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(SubtitleCollection::from_file(temp_dir.path().join("missing.srt")).is_err());
    Ok(())
}

/// Test writing translations with fallbacks
#[test]
fn test_write_translated_srt_withMissingResults_shouldKeepOriginalText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("nested").join("out.srt");
    let entries = common::sample_entries(3);
    let results = vec![
        TranslationResult::from_text("ligne 1"),
        TranslationResult::from_text("   "),
        TranslationResult::empty(),
    ];

    write_translated_srt(&entries, &results, &output)?;

    let written = SubtitleCollection::parse_srt_string(&fs::read_to_string(&output)?)?;
    let texts: Vec<&str> = written.iter().map(|entry| entry.text.as_str()).collect();
    assert_eq!(texts, vec!["ligne 1", "line 2", "line 3"]);
    assert_eq!(written[1].timestamp, entries[1].timestamp);
    Ok(())
}

/// Test writing with fewer results than entries
#[test]
fn test_write_translated_withShortResults_shouldWriteEveryEntry() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;
    let collection = SubtitleCollection::from_file(&path)?;
    let output = temp_dir.path().join("sample_fr.srt");

    collection.write_translated(&[TranslationResult::from_text("Ceci est un test.")], &output)?;

    let written = SubtitleCollection::from_file(&output)?;
    assert_eq!(written.entries.len(), 3);
    assert_eq!(written.entries[0].text, "Ceci est un test.");
    assert_eq!(written.entries[1].text, "It contains multiple entries.");
    Ok(())
}
