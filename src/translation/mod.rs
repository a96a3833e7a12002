/*!
 * Concurrent subtitle translation.
 *
 * This module contains the orchestration core, split into several submodules:
 *
 * - `retry`: Bounded retry with exponential backoff
 * - `executor`: Task registry and admission-controlled executor
 * - `context`: Batching with surrounding context windows
 * - `prompts`: System prompt and request payloads
 * - `reconcile`: Mapping batch responses back onto lines
 * - `usage`: Token usage accounting
 * - `core`: Model session tying provider, retry and executor together
 * - `batch`: Whole-file translation runs
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, TranslationRun};
pub use self::core::{ModelSettings, TranslationModel, TranslationResult};
pub use self::executor::{BoundedExecutor, TaskId, TaskRegistry, WorkItem};
pub use self::retry::{Retrier, RetryPolicy};
pub use self::usage::{RunningUsage, TokenUsage, UsageAccumulator};

// Re-export context and prompt types
pub use self::context::{BatchItem, ContextBatch, build_batches};
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};
pub use self::reconcile::{ReconcileStatus, Reconciliation, reconcile};

// Submodules
pub mod batch;
pub mod context;
pub mod core;
pub mod executor;
pub mod prompts;
pub mod reconcile;
pub mod retry;
pub mod usage;
