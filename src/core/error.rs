//! Error type system for the MangaDex extension
//!
//! This module provides the error taxonomy shared by the gateway, the
//! enrichment pipeline and the extension facade:
//! - Local cooldown rejections (`RateLimited`)
//! - Non-success responses from the catalogue (`ApiError`)
//! - Transport and parsing failures, propagated as-is

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for the extension
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    /// The local cooldown is active, or the server just answered 429
    #[error("RATE_LIMITED")]
    RateLimited,

    /// The catalogue answered with a non-2xx, non-429 status
    #[error("API Error: {0}")]
    ApiError(u16),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ExtensionError {
    /// Get the error type name used in serialized error reports
    pub fn error_type(&self) -> &'static str {
        match self {
            ExtensionError::RateLimited => "RateLimited",
            ExtensionError::ApiError(_) => "ApiError",
            ExtensionError::NetworkError(_) => "NetworkError",
            ExtensionError::DeserializationError(_) => "DeserializationError",
            ExtensionError::ConfigError(_) => "ConfigError",
        }
    }

    /// Check if this error is worth retrying later
    ///
    /// Nothing in this crate retries on its own; callers use this to decide
    /// whether to surface the error or try again after the cooldown.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtensionError::RateLimited | ExtensionError::NetworkError(_) => true,
            ExtensionError::ApiError(status) => *status >= 500,
            ExtensionError::DeserializationError(_) | ExtensionError::ConfigError(_) => false,
        }
    }

    /// HTTP status carried by an `ApiError`
    pub fn status(&self) -> Option<u16> {
        match self {
            ExtensionError::ApiError(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ExtensionError {
    fn from(err: reqwest::Error) -> Self {
        ExtensionError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for ExtensionError {
    fn from(err: serde_json::Error) -> Self {
        ExtensionError::DeserializationError(err.to_string())
    }
}

/// Serializable error report printed by the CLI
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn from_error(error: &ExtensionError) -> Self {
        Self {
            error: error.error_type().to_string(),
            message: error.to_string(),
            status: error.status(),
            retryable: error.is_retryable(),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error, self.message)
    }
}

/// Result type alias for operations that can fail with ExtensionError
pub type Result<T> = std::result::Result<T, ExtensionError>;
