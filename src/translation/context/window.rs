/*!
 * Sliding context windows over a subtitle sequence.
 *
 * The line sequence is cut into contiguous batches. Each batch carries up to
 * [`CONTEXT_WINDOW`] lines of text from immediately before and after it, so the
 * model sees the surrounding dialogue without being asked to translate it.
 */

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::subtitle_processor::SubtitleEntry;

/// Number of neighbouring lines shown on each side of a batch
pub const CONTEXT_WINDOW: usize = 2;

/// One line to translate, identified by its source sequence number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub number: usize,
    pub text: String,
}

impl From<&SubtitleEntry> for BatchItem {
    fn from(entry: &SubtitleEntry) -> Self {
        Self {
            number: entry.number,
            text: entry.text.clone(),
        }
    }
}

/// A contiguous slice of lines plus read-only context around it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBatch {
    /// First line index covered by `items`
    pub start_index: usize,

    /// One past the last line index covered by `items`
    pub end_index: usize,

    /// Texts of up to two lines right before `start_index`
    pub context_before: Vec<String>,

    /// Texts of up to two lines right after `end_index`
    pub context_after: Vec<String>,

    /// Lines to translate, in source order
    pub items: Vec<BatchItem>,
}

impl ContextBatch {
    /// Build the batch covering `range` of `lines`.
    ///
    /// `range` must lie within `lines`.
    pub fn new(lines: &[SubtitleEntry], range: Range<usize>) -> Self {
        let before_start = range.start.saturating_sub(CONTEXT_WINDOW);
        let after_end = (range.end + CONTEXT_WINDOW).min(lines.len());

        let texts = |slice: &[SubtitleEntry]| slice.iter().map(|e| e.text.clone()).collect();

        Self {
            start_index: range.start,
            end_index: range.end,
            context_before: texts(&lines[before_start..range.start]),
            context_after: texts(&lines[range.end..after_end]),
            items: lines[range].iter().map(BatchItem::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index range into the original line sequence
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }
}

/// Partition `lines` into batches of `batch_size` (the last one may be shorter).
///
/// A `batch_size` of zero is treated as one.
pub fn build_batches(lines: &[SubtitleEntry], batch_size: usize) -> Vec<ContextBatch> {
    let batch_size = batch_size.max(1);

    (0..lines.len())
        .step_by(batch_size)
        .map(|start| {
            let end = (start + batch_size).min(lines.len());
            ContextBatch::new(lines, start..end)
        })
        .collect()
}
