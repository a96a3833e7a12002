/*!
 * Context construction for subtitle translation.
 *
 * This module provides:
 * - Fixed-size batching of the subtitle sequence
 * - Bounded before/after context windows for each batch
 */

pub mod window;

// Re-export main types
pub use window::{BatchItem, CONTEXT_WINDOW, ContextBatch, build_batches};
