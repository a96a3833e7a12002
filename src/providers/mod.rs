/*!
 * Provider implementations for chat completion services.
 *
 * This module contains client implementations for LLM providers:
 * - OpenAI: OpenAI-compatible chat completions API (DeepSeek, OpenAI, ...)
 * - Mock: scripted provider used by tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::translation::TokenUsage;

/// One chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// System prompt sent first
    pub system_prompt: String,

    /// User messages, in order
    pub messages: Vec<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Model name
    pub model: String,
}

/// What a provider returns for a completed chat request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    /// Assistant message content
    pub text: String,

    /// Reasoning content, when the model exposes it
    pub reasoning: Option<String>,

    /// Reported token usage
    pub usage: Option<TokenUsage>,
}

/// Common trait for all LLM providers
///
/// Implementations perform exactly one request per call; retrying is left to
/// the caller.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a chat request
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<ChatResponse, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self, model: &str) -> Result<(), ProviderError>;
}

pub mod mock;
pub mod openai;
