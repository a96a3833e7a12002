use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::errors::ConfigError;
use crate::file_utils::FileManager;
use crate::translation::RetryPolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How subtitle lines are grouped into requests
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    // @mode: Several lines per request, JSON array answers
    #[default]
    Batch,
    // @mode: One line per request, plain text answers
    Line,
}

impl std::fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Batch => write!(f, "batch"),
            Self::Line => write!(f, "line"),
        }
    }
}

impl std::str::FromStr for TranslationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "batch" => Ok(Self::Batch),
            "line" => Ok(Self::Line),
            _ => Err(anyhow!("Invalid translation mode: {}", s)),
        }
    }
}

/// Retry settings for model calls
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RetryConfig {
    // @field: Extra attempts after the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    // @field: Delay before the first retry
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    // @field: Delay multiplier per failed attempt
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Model name (e.g., "deepseek-chat")
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum number of requests in flight
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Lines per request in batch mode
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Batch or line mode
    #[serde(default)]
    pub mode: TranslationMode,

    /// Timeout for a single request attempt, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long to wait for one batch before falling back; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub await_timeout_secs: Option<u64>,

    /// Specialist domains of the content (terminology hints)
    #[serde(default)]
    pub domains: Vec<String>,

    /// Retry settings
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_workers: default_max_workers(),
            batch_size: default_batch_size(),
            mode: TranslationMode::default(),
            request_timeout_secs: default_request_timeout_secs(),
            await_timeout_secs: None,
            domains: Vec::new(),
            retry: RetryConfig::default(),
        }
    }
}

impl TranslationConfig {
    /// Retry policy built from the retry settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_retries,
            Duration::from_millis(self.retry.initial_delay_ms),
            self.retry.backoff_factor,
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn await_timeout(&self) -> Option<Duration> {
        self.await_timeout_secs.map(Duration::from_secs)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_endpoint() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_temperature() -> f32 {
    1.3
}

fn default_max_workers() -> usize {
    15
}

fn default_batch_size() -> usize {
    3
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000 // 1 second, multiplied by backoff_factor on each retry
}

fn default_backoff_factor() -> f64 {
    2.0
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = FileManager::read_to_string(&path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.as_ref().display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize configuration")?;
        FileManager::write_to_file(path, &content)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        for (field, code) in [
            ("source_language", &self.source_language),
            ("target_language", &self.target_language),
        ] {
            crate::language_utils::get_language_name(code).map_err(|e| ConfigError::Invalid {
                field,
                reason: e.to_string(),
            })?;
        }

        let translation = &self.translation;
        if translation.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("translation.api_key"));
        }
        if translation.model.trim().is_empty() {
            return Err(ConfigError::Missing("translation.model"));
        }
        if translation.endpoint.trim().is_empty() {
            return Err(ConfigError::Missing("translation.endpoint"));
        }
        Url::parse(&translation.endpoint).map_err(|e| ConfigError::Invalid {
            field: "translation.endpoint",
            reason: e.to_string(),
        })?;

        if translation.max_workers == 0 {
            return Err(ConfigError::Invalid {
                field: "translation.max_workers",
                reason: "must be at least 1".to_string(),
            });
        }
        if translation.batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "translation.batch_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if translation.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "translation.request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&translation.temperature) {
            return Err(ConfigError::Invalid {
                field: "translation.temperature",
                reason: format!("{} is outside 0.0..=2.0", translation.temperature),
            });
        }
        if translation.retry.backoff_factor.is_nan() || translation.retry.backoff_factor < 1.0 {
            return Err(ConfigError::Invalid {
                field: "translation.retry.backoff_factor",
                reason: format!("{} is below 1.0", translation.retry.backoff_factor),
            });
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "zh".to_string(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
