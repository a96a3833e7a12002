/*!
 * Tests for context batching
 */

use srtwai::translation::context::{CONTEXT_WINDOW, ContextBatch, build_batches};
use crate::common;

/// Test the batch boundaries for an uneven split
#[test]
fn test_build_batches_withSevenLinesOfThree_shouldSplitThreeThreeOne() {
    let lines = common::sample_entries(7);

    let batches = build_batches(&lines, 3);

    let ranges: Vec<_> = batches.iter().map(ContextBatch::range).collect();
    assert_eq!(ranges, vec![0..3, 3..6, 6..7]);
    assert_eq!(batches[2].items[0].number, 7);
    assert_eq!(batches[2].items[0].text, "line 7");
}

/// Test that batches partition the input for many sizes
#[test]
fn test_build_batches_withVariousSizes_shouldCoverEveryLineOnceInOrder() {
    for line_count in [0usize, 1, 2, 5, 10, 31] {
        let lines = common::sample_entries(line_count);

        for batch_size in 1..=12 {
            let batches = build_batches(&lines, batch_size);

            let numbers: Vec<usize> = batches
                .iter()
                .flat_map(|batch| batch.items.iter().map(|item| item.number))
                .collect();
            let expected: Vec<usize> = (1..=line_count).collect();
            assert_eq!(numbers, expected, "lines {} batch size {}", line_count, batch_size);

            assert_eq!(batches.len(), line_count.div_ceil(batch_size));
            for pair in batches.windows(2) {
                assert_eq!(pair[0].end_index, pair[1].start_index);
                assert_eq!(pair[0].len(), batch_size);
            }
        }
    }
}

/// Test context sizes at the edges and in the middle
#[test]
fn test_build_batches_withSizeOne_shouldClampContextAtEdges() {
    let lines = common::sample_entries(6);

    let batches = build_batches(&lines, 1);

    for (start, batch) in batches.iter().enumerate() {
        assert_eq!(batch.context_before.len(), start.min(CONTEXT_WINDOW));
        assert_eq!(batch.context_after.len(), (lines.len() - start - 1).min(CONTEXT_WINDOW));
    }
    assert_eq!(batches[3].context_before, vec!["line 2", "line 3"]);
    assert_eq!(batches[3].context_after, vec!["line 5", "line 6"]);
}

/// Test that context lines come from outside the batch
#[test]
fn test_context_batch_new_withMiddleRange_shouldTakeNeighbouringLines() {
    let lines = common::sample_entries(10);

    let batch = ContextBatch::new(&lines, 4..7);

    assert_eq!(batch.context_before, vec!["line 3", "line 4"]);
    assert_eq!(batch.context_after, vec!["line 8", "line 9"]);
    assert_eq!(batch.len(), 3);
    assert!(!batch.is_empty());
}

/// Test the degenerate inputs
#[test]
fn test_build_batches_withEmptyInputOrZeroSize_shouldBehave() {
    assert!(build_batches(&[], 3).is_empty());

    let lines = common::sample_entries(3);
    let batches = build_batches(&lines, 0);
    assert_eq!(batches.len(), 3);

    let single = build_batches(&lines, 10);
    assert_eq!(single.len(), 1);
    assert!(single[0].context_before.is_empty());
    assert!(single[0].context_after.is_empty());
}
