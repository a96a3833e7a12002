/*!
 * Error types for the srtwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request did not complete within the configured time
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Authentication failures and client-side request errors (4xx other than 429)
    /// will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::AuthenticationError(_) => false,
            Self::ApiError { status_code, .. } => *status_code == 429 || *status_code >= 500,
            _ => true,
        }
    }
}

/// Errors recorded on a work item that did not produce a result
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    /// The operation returned an error
    #[error("Task failed: {0}")]
    Failed(String),

    /// The operation panicked while running
    #[error("Task panicked: {0}")]
    Panicked(String),
}

/// Configuration problems detected before any work is submitted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required value is empty
    #[error("Missing required configuration value: {0}")]
    Missing(&'static str),

    /// A value is present but unusable
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}
