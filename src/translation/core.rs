/*!
 * Core translation model.
 *
 * `TranslationModel` owns one provider client, one bounded executor and one
 * usage accumulator. Each chat completion is submitted as a unit of work that
 * runs under the retry policy; callers get a task id back immediately and
 * await the result separately.
 */

use anyhow::{Result, anyhow};
use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{ChatRequest, ChatResponse, Provider};
use super::executor::{BoundedExecutor, TaskId};
use super::retry::Retrier;
use super::usage::{RunningUsage, TokenUsage, UsageAccumulator};

/// Outcome of one model call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationResult {
    /// Translated text, `None` when nothing usable came back
    pub text: Option<String>,

    /// Reasoning trace returned by reasoning models
    pub reasoning: Option<String>,

    /// Tokens consumed by the call
    pub usage: Option<TokenUsage>,
}

impl TranslationResult {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Marker for a line that must fall back to its original text
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

impl From<ChatResponse> for TranslationResult {
    fn from(response: ChatResponse) -> Self {
        Self {
            text: Some(response.text),
            reasoning: response.reasoning,
            usage: response.usage,
        }
    }
}

/// Per-request model parameters
#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Model name sent to the provider
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// System prompt prepended to every request
    pub system_prompt: String,

    /// Upper bound for a single attempt; `None` leaves it to the provider
    pub request_timeout: Option<Duration>,
}

/// Chat model session with bounded concurrency and usage accounting
pub struct TranslationModel {
    provider: Arc<dyn Provider>,
    settings: Arc<ModelSettings>,
    executor: BoundedExecutor<TranslationResult>,
    retrier: Arc<Retrier>,
    usage: Arc<UsageAccumulator>,
}

impl TranslationModel {
    pub fn new(provider: Arc<dyn Provider>, settings: ModelSettings, max_workers: usize, retrier: Retrier) -> Self {
        debug!(
            "Translation model ready: model={}, temperature={}, max_workers={}",
            settings.model, settings.temperature, max_workers
        );
        Self {
            provider,
            settings: Arc::new(settings),
            executor: BoundedExecutor::new(max_workers),
            retrier: Arc::new(retrier),
            usage: Arc::new(UsageAccumulator::new()),
        }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn system_prompt(&self) -> &str {
        &self.settings.system_prompt
    }

    pub fn executor(&self) -> &BoundedExecutor<TranslationResult> {
        &self.executor
    }

    /// Token totals of every successful call so far
    pub fn total_usage(&self) -> RunningUsage {
        self.usage.snapshot()
    }

    /// Submit one chat completion and return its task id without waiting.
    ///
    /// The task fails when every attempt failed or came back empty.
    pub fn submit(&self, user_message: String) -> TaskId {
        let provider = Arc::clone(&self.provider);
        let settings = Arc::clone(&self.settings);
        let retrier = Arc::clone(&self.retrier);
        let usage = Arc::clone(&self.usage);

        self.executor.submit(move || async move {
            let request = ChatRequest {
                system_prompt: settings.system_prompt.clone(),
                messages: vec![user_message],
                temperature: settings.temperature,
                model: settings.model.clone(),
            };

            let outcome = retrier
                .run("Chat completion", || {
                    let provider = Arc::clone(&provider);
                    let request = request.clone();
                    let timeout = settings.request_timeout;
                    async move { complete_once(provider.as_ref(), request, timeout).await }
                })
                .await;

            match outcome {
                Some(result) => {
                    if let Some(tokens) = &result.usage {
                        usage.record(tokens);
                    }
                    Ok(result)
                }
                None => Err(anyhow!("No translation after retries")),
            }
        })
    }

    /// Wait for a submitted completion and release its task slot.
    ///
    /// Returns `None` on failure and on timeout. A timed-out task keeps running
    /// and its id stays registered.
    pub async fn await_completion(&self, id: TaskId, timeout: Option<Duration>) -> Option<TranslationResult> {
        let item = match self.executor.await_result(id, timeout).await {
            Some(item) => item,
            None => {
                warn!("Translation task {} did not complete in time", id);
                return None;
            }
        };
        self.executor.registry().discard(id);

        if let Some(e) = &item.error {
            error!("Translation task {} produced no result: {}", id, e);
        }
        item.result
    }

    /// Submit a completion and wait for it
    pub async fn chat_completion(&self, user_message: String) -> Result<TranslationResult> {
        let id = self.submit(user_message);
        self.await_completion(id, None)
            .await
            .ok_or_else(|| anyhow!("Chat completion failed"))
    }
}

/// One provider call, bounded by `timeout`. Blank text is reported as `None`.
async fn complete_once(
    provider: &dyn Provider,
    request: ChatRequest,
    timeout: Option<Duration>,
) -> std::result::Result<Option<TranslationResult>, ProviderError> {
    let response = match timeout {
        Some(limit) => tokio::time::timeout(limit, provider.complete(request))
            .await
            .map_err(|_| ProviderError::Timeout(limit))??,
        None => provider.complete(request).await?,
    };

    if response.text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(TranslationResult::from(response)))
}
