use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;
use crate::translation::TranslationResult;

// @module: Subtitle parsing and writing

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number as written in the source file
    pub number: usize,

    // @field: Timing line, kept verbatim
    pub timestamp: String,

    // @field: Subtitle text, multi-line text joined with spaces
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(number: usize, timestamp: impl Into<String>, text: impl Into<String>) -> Self {
        SubtitleEntry {
            number,
            timestamp: timestamp.into(),
            text: text.into(),
        }
    }

    // @returns: Copy of this entry carrying different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        SubtitleEntry {
            number: self.number,
            timestamp: self.timestamp.clone(),
            text: text.into(),
        }
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.number)?;
        writeln!(f, "{}", self.timestamp)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Collection of subtitle entries read from one file
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Read and parse an SRT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow!("Subtitle file not found: {}", path.display()));
        }

        info!("Reading subtitle file: {}", path.display());
        let content = FileManager::read_to_string(path)?;
        let entries = Self::parse_srt_string(&content)?;
        info!("Read {} subtitle entries", entries.len());

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Parse SRT content.
    ///
    /// Blocks with fewer than three lines or a non-numeric sequence line are
    /// skipped and logged; everything else is kept in file order.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>> {
        let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
        let content = content.trim();
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();

        for block in content.split("\n\n") {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }

            let lines: Vec<&str> = block.lines().collect();
            if lines.len() < 3 {
                warn!("Skipping invalid subtitle block: {}", block);
                continue;
            }

            let number = match lines[0].trim().parse::<usize>() {
                Ok(number) => number,
                Err(e) => {
                    error!("Failed to parse subtitle block: {}, block content: {}", e, block);
                    continue;
                }
            };

            let text = lines[2..]
                .iter()
                .map(|line| line.trim())
                .collect::<Vec<_>>()
                .join(" ");

            entries.push(SubtitleEntry::new(number, lines[1].trim(), text));
        }

        debug!("Parsed {} subtitle entries", entries.len());
        Ok(entries)
    }

    /// Write the collection with translated text.
    ///
    /// Entries whose result is missing or blank keep their original text.
    pub fn write_translated<P: AsRef<Path>>(&self, results: &[TranslationResult], path: P) -> Result<()> {
        write_translated_srt(&self.entries, results, path)
    }
}

/// Write `entries` to `path`, substituting each translation where present
pub fn write_translated_srt<P: AsRef<Path>>(
    entries: &[SubtitleEntry],
    results: &[TranslationResult],
    path: P,
) -> Result<()> {
    let path = path.as_ref();

    if entries.len() != results.len() {
        warn!(
            "Writing {} entries with {} translation results; unmatched entries keep their original text",
            entries.len(),
            results.len()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            FileManager::ensure_dir(parent)?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for (index, entry) in entries.iter().enumerate() {
        let translated = results
            .get(index)
            .and_then(|result| result.text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty());

        let text = match translated {
            Some(text) => text,
            None => {
                warn!("Subtitle #{} has no translation, keeping the original text", entry.number);
                entry.text.as_str()
            }
        };

        write!(writer, "{}", entry.with_text(text))?;
    }

    writer.flush()
        .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;
    info!("Wrote translated subtitle file: {}", path.display());
    Ok(())
}
