/*!
 * Token usage accounting.
 *
 * One `UsageAccumulator` lives as long as its translation session. Completed
 * requests report their usage once; concurrent reports never lose updates.
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Token counts reported for a single model call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of prompt tokens
    #[serde(default)]
    pub prompt_tokens: u64,

    /// Number of completion tokens
    #[serde(default)]
    pub completion_tokens: u64,

    /// Total number of tokens
    #[serde(default)]
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Totals across every recorded call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunningUsage {
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
    pub total_tokens: u64,
}

impl RunningUsage {
    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "Token Usage Summary:\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}",
            self.total_prompt_tokens, self.total_completion_tokens, self.total_tokens
        )
    }
}

/// Lock-free running totals
#[derive(Debug, Default)]
pub struct UsageAccumulator {
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, usage: &TokenUsage) {
        self.prompt_tokens.fetch_add(usage.prompt_tokens, Ordering::Relaxed);
        self.completion_tokens.fetch_add(usage.completion_tokens, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RunningUsage {
        let total_prompt_tokens = self.prompt_tokens.load(Ordering::Relaxed);
        let total_completion_tokens = self.completion_tokens.load(Ordering::Relaxed);
        RunningUsage {
            total_prompt_tokens,
            total_completion_tokens,
            total_tokens: total_prompt_tokens + total_completion_tokens,
        }
    }
}
