/*!
 * Mapping batch responses back onto subtitle lines.
 *
 * A batch response is expected to contain a JSON array of
 * `{number, translation}` objects, possibly wrapped in commentary or a code
 * fence. The reconciled output always holds exactly one result per batch item,
 * in batch order:
 * - an item missing from an otherwise valid array keeps its original text
 * - when no array can be found or decoded, every item gets an empty result so
 *   the writer falls back to the original text
 */

use log::{debug, error, warn};
use std::collections::HashMap;

use crate::translation::context::ContextBatch;
use crate::translation::core::TranslationResult;
use crate::translation::prompts::TranslatedEntry;

/// How a batch response was matched against its items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileStatus {
    /// Every item had a translation
    Complete,

    /// Listed line numbers kept their original text
    Partial { missing: Vec<usize> },

    /// No translation could be extracted; every result is empty
    Unparsable { reason: String },
}

/// Per-item results for one batch
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// One result per batch item, in batch order
    pub results: Vec<TranslationResult>,
    pub status: ReconcileStatus,
}

impl Reconciliation {
    pub fn is_unparsable(&self) -> bool {
        matches!(self.status, ReconcileStatus::Unparsable { .. })
    }

    /// Line numbers that were not translated by the model
    pub fn untranslated_numbers(&self, batch: &ContextBatch) -> Vec<usize> {
        match &self.status {
            ReconcileStatus::Complete => Vec::new(),
            ReconcileStatus::Partial { missing } => missing.clone(),
            ReconcileStatus::Unparsable { .. } => batch.items.iter().map(|item| item.number).collect(),
        }
    }
}

/// Extract and decode the translation array embedded in `raw`.
///
/// Each `[` is tried in turn and the first position that decodes as a
/// translation array wins, so brackets in surrounding prose are skipped. An
/// empty array is only returned when no non-empty one follows it.
pub fn parse_translations(raw: &str) -> Result<Vec<TranslatedEntry>, String> {
    let mut first_error = None;
    let mut empty_found = false;

    for (start, _) in raw.match_indices('[') {
        let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Vec<TranslatedEntry>>();
        match stream.next() {
            Some(Ok(entries)) if entries.is_empty() => empty_found = true,
            Some(Ok(entries)) => return Ok(entries),
            Some(Err(e)) => {
                debug!("No translation array at offset {}: {}", start, e);
                first_error.get_or_insert_with(|| e.to_string());
            }
            None => {}
        }
    }

    if empty_found {
        return Ok(Vec::new());
    }
    Err(match first_error {
        Some(e) => format!("invalid translation array: {}", e),
        None => "no JSON array found in response".to_string(),
    })
}

/// Reconcile a raw batch-mode response against its batch
pub fn reconcile(raw: &str, batch: &ContextBatch) -> Reconciliation {
    let entries = match parse_translations(raw) {
        Ok(entries) => entries,
        Err(reason) => {
            error!(
                "Failed to parse batch translation for lines {}..{}: {}",
                batch.start_index, batch.end_index, reason
            );
            error!("Raw response: {}", raw);
            return reconcile_failed(batch, reason);
        }
    };

    // Later duplicates win, as with a plain map insert
    let translations: HashMap<usize, String> = entries
        .into_iter()
        .map(|entry| (entry.number, entry.translation))
        .collect();

    let mut missing = Vec::new();
    let results = batch
        .items
        .iter()
        .map(|item| match translations.get(&item.number).filter(|t| !t.trim().is_empty()) {
            Some(translation) => TranslationResult::from_text(translation.trim()),
            None => {
                warn!("Subtitle #{} missing from batch translation, using the original text", item.number);
                missing.push(item.number);
                TranslationResult::from_text(item.text.clone())
            }
        })
        .collect();

    let status = if missing.is_empty() {
        ReconcileStatus::Complete
    } else {
        ReconcileStatus::Partial { missing }
    };

    Reconciliation { results, status }
}

/// Whole-batch fallback: one empty result per item
pub fn reconcile_failed(batch: &ContextBatch, reason: impl Into<String>) -> Reconciliation {
    Reconciliation {
        results: vec![TranslationResult::empty(); batch.len()],
        status: ReconcileStatus::Unparsable { reason: reason.into() },
    }
}

/// Reconcile a line-mode response, where the whole text is the translation
pub fn reconcile_line(response: &TranslationResult, batch: &ContextBatch) -> Reconciliation {
    let text = response.text.as_deref().map(str::trim).filter(|t| !t.is_empty());

    match text {
        Some(text) => {
            let mut result = response.clone();
            result.text = Some(text.to_string());
            result.usage = None;

            let mut results = vec![result];
            results.resize(batch.len(), TranslationResult::empty());
            Reconciliation {
                results,
                status: ReconcileStatus::Complete,
            }
        }
        None => reconcile_failed(batch, "empty line translation"),
    }
}
