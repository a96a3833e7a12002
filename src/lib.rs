/*!
 * # SRTwAI - Subtitle translation with AI
 *
 * A Rust library for translating SRT subtitles with an OpenAI-compatible chat
 * model, many requests at a time.
 *
 * ## Features
 *
 * - Bounded concurrent execution of model calls with awaitable task handles
 * - Retry with exponential backoff for transient API failures
 * - Batches of subtitle lines with surrounding context windows
 * - Reconciliation of batch answers back onto individual lines, with
 *   fallback to the original text for anything the model missed
 * - Token usage accounting across a whole run
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing and writing
 * - `translation`: Orchestration core:
 *   - `translation::executor`: Task registry and bounded executor
 *   - `translation::retry`: Backoff retrier
 *   - `translation::context`: Context batching
 *   - `translation::reconcile`: Response reconciliation
 *   - `translation::usage`: Usage accumulation
 *   - `translation::batch`: Whole-file translation runs
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Chat completion clients:
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod translation;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use translation::{BatchTranslator, TranslationModel, TranslationResult, TranslationRun};
pub use language_utils::get_language_name;
pub use errors::{ConfigError, ProviderError, TaskError};
