/*!
 * Batch translation processing.
 *
 * The subtitle sequence is cut into context batches, every batch is submitted
 * to the model at once (the model's executor bounds how many run), and the
 * responses are reconciled as they complete. Results are placed by line index,
 * so the output order never depends on completion order.
 */

use futures::stream::{FuturesUnordered, StreamExt};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::TranslationMode;
use crate::subtitle_processor::SubtitleEntry;

use super::context::{ContextBatch, build_batches};
use super::core::{TranslationModel, TranslationResult};
use super::prompts::TranslationPromptBuilder;
use super::reconcile::{Reconciliation, reconcile, reconcile_failed, reconcile_line};
use super::usage::RunningUsage;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct TranslationRun {
    /// One result per input line, in input order
    pub results: Vec<TranslationResult>,

    /// Model usage totals at the end of the run
    pub usage: RunningUsage,

    /// Number of requests sent
    pub batch_count: usize,

    /// Indexes of batches that produced no usable response
    pub failed_batches: Vec<usize>,

    /// Line numbers left in the source language
    pub fallback_lines: Vec<usize>,

    pub elapsed: Duration,
}

impl TranslationRun {
    /// Number of lines that received a translation
    pub fn translated_count(&self) -> usize {
        self.results.len().saturating_sub(self.fallback_lines.len())
    }
}

/// Batch translator for processing subtitle entries in batches
pub struct BatchTranslator {
    /// The model session shared by every batch
    model: Arc<TranslationModel>,

    /// Builds the user message for each batch
    prompts: TranslationPromptBuilder,

    /// Lines per request in batch mode
    batch_size: usize,

    mode: TranslationMode,

    /// How long to wait for one batch before giving up on it
    await_timeout: Option<Duration>,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(
        model: Arc<TranslationModel>,
        prompts: TranslationPromptBuilder,
        mode: TranslationMode,
        batch_size: usize,
    ) -> Self {
        Self {
            model,
            prompts: prompts.with_mode(mode),
            batch_size,
            mode,
            await_timeout: None,
        }
    }

    /// Stop waiting for a batch after `timeout`; the batch then falls back
    pub fn with_await_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.await_timeout = timeout;
        self
    }

    pub fn model(&self) -> &TranslationModel {
        &self.model
    }

    /// Lines sent per request for the configured mode
    pub fn effective_batch_size(&self) -> usize {
        match self.mode {
            TranslationMode::Batch => self.batch_size.max(1),
            TranslationMode::Line => 1,
        }
    }

    /// Translate every line, reporting `(completed_batches, total_batches)`
    /// after each batch is reconciled.
    ///
    /// Never fails: lines that could not be translated come back as their
    /// original text or as empty results for the writer to fill in.
    pub async fn translate(
        &self,
        lines: &[SubtitleEntry],
        progress_callback: impl Fn(usize, usize),
    ) -> TranslationRun {
        let start_time = Instant::now();
        let batches = build_batches(lines, self.effective_batch_size());
        let total_batches = batches.len();
        info!(
            "Translating {} lines in {} requests ({} mode)",
            lines.len(),
            total_batches,
            self.mode
        );

        let task_ids: Vec<_> = batches
            .iter()
            .map(|batch| self.model.submit(self.prompts.build_user_prompt(batch)))
            .collect();

        let mut pending: FuturesUnordered<_> = task_ids
            .into_iter()
            .enumerate()
            .map(|(index, id)| {
                let model = &self.model;
                let timeout = self.await_timeout;
                async move { (index, model.await_completion(id, timeout).await) }
            })
            .collect();

        let mut results = vec![TranslationResult::empty(); lines.len()];
        let mut failed_batches = Vec::new();
        let mut fallback_lines = Vec::new();
        let mut completed = 0;

        while let Some((index, response)) = pending.next().await {
            let batch = &batches[index];
            let reconciliation = self.reconcile_response(response, batch);

            if reconciliation.is_unparsable() {
                error!(
                    "Batch {} of {} failed, lines {}..{} keep their original text",
                    index + 1,
                    total_batches,
                    batch.start_index,
                    batch.end_index
                );
                failed_batches.push(index);
            }
            fallback_lines.extend(reconciliation.untranslated_numbers(batch));

            for (slot, result) in results[batch.range()].iter_mut().zip(reconciliation.results) {
                *slot = result;
            }

            completed += 1;
            progress_callback(completed, total_batches);
        }

        failed_batches.sort_unstable();
        fallback_lines.sort_unstable();
        if !fallback_lines.is_empty() {
            warn!("{} of {} lines were not translated", fallback_lines.len(), lines.len());
        }

        TranslationRun {
            results,
            usage: self.model.total_usage(),
            batch_count: total_batches,
            failed_batches,
            fallback_lines,
            elapsed: start_time.elapsed(),
        }
    }

    fn reconcile_response(&self, response: Option<TranslationResult>, batch: &ContextBatch) -> Reconciliation {
        let Some(response) = response else {
            return reconcile_failed(batch, "no response from the model");
        };

        match self.mode {
            TranslationMode::Batch => reconcile(response.text.as_deref().unwrap_or_default(), batch),
            TranslationMode::Line => reconcile_line(&response, batch),
        }
    }
}
