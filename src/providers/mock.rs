/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always answers with translated text
 * - `MockProvider::dropping(n)` - Leaves line `n` out of batch answers
 * - `MockProvider::failing()` - Always fails with an error
 *
 * Batch requests are answered with a JSON array, line requests and free text
 * with plain text. Every successful answer reports 10 prompt and 5 completion
 * tokens.
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{ChatRequest, ChatResponse, Provider};
use crate::translation::TokenUsage;
use crate::translation::prompts::{BatchRequest, LineRequest};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Succeeds but omits one line number from batch answers
    DropLine { number: usize },
    /// Succeeds with text that contains no JSON array
    Malformed,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Fails the first N requests, then works
    FailFirst { failures: usize },
    /// Always fails with a retryable error
    Failing,
    /// Always fails with an authentication error
    Unauthorized,
    /// Returns empty response
    Empty,
    /// Simulates slow response (for timeout and concurrency testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Requests currently inside `complete`
    active: Arc<AtomicUsize>,
    /// Highest value `active` has reached
    peak_active: Arc<AtomicUsize>,
}

/// Tracks one request inside `complete`
struct ActiveGuard<'a> {
    active: &'a AtomicUsize,
}

impl<'a> ActiveGuard<'a> {
    fn enter(active: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { active }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            active: Arc::new(AtomicUsize::new(0)),
            peak_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that leaves one line out of batch answers
    pub fn dropping(number: usize) -> Self {
        Self::new(MockBehavior::DropLine { number })
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Highest number of requests that were in progress at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }

    /// Translate a request the way a cooperative model would
    pub fn translate(message: &str, skip: Option<usize>) -> String {
        if let Ok(request) = serde_json::from_str::<BatchRequest>(message) {
            let entries: Vec<serde_json::Value> = request
                .batch
                .iter()
                .filter(|item| Some(item.number) != skip)
                .map(|item| {
                    serde_json::json!({
                        "number": item.number,
                        "translation": format!("[TRANSLATED] {}", item.text),
                    })
                })
                .collect();
            return serde_json::Value::Array(entries).to_string();
        }

        if let Ok(request) = serde_json::from_str::<LineRequest>(message) {
            return format!("[TRANSLATED] {}", request.current_line);
        }

        format!("[TRANSLATED] {}", message)
    }

    fn answer(text: String) -> ChatResponse {
        ChatResponse {
            text,
            reasoning: None,
            usage: Some(TokenUsage::new(10, 5)),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let _active = ActiveGuard::enter(&self.active, &self.peak_active);
        let message = request.messages.last().map(String::as_str).unwrap_or_default();

        match self.behavior {
            MockBehavior::Working => Ok(Self::answer(Self::translate(message, None))),

            MockBehavior::DropLine { number } => Ok(Self::answer(Self::translate(message, Some(number)))),

            MockBehavior::Malformed => Ok(Self::answer("I cannot answer in the requested format.".to_string())),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::answer(Self::translate(message, None)))
                }
            }

            MockBehavior::FailFirst { failures } => {
                if count < failures {
                    Err(ProviderError::ConnectionError(format!(
                        "Simulated connection failure (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(Self::answer(Self::translate(message, None)))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError("Invalid API key".to_string())),

            MockBehavior::Empty => Ok(ChatResponse::default()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::answer(Self::translate(message, None)))
            }
        }
    }

    async fn test_connection(&self, _model: &str) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated provider failure".to_string())),
            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError("Invalid API key".to_string())),
            _ => Ok(()),
        }
    }
}
