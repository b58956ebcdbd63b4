// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client construction or low-level request failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Request reached the network layer but did not yield a usable envelope
    /// (connection failure, timeout, non-2xx status, malformed JSON body)
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The platform answered with `success: false`
    #[error("Platform rejected {context}: {message}")]
    Business { context: String, message: String },

    /// Signature derivation failed; the request will go out unsigned
    #[error("Signing degraded: {0}")]
    Signing(String),

    /// A detail payload was missing its required top-level shape
    #[error("Normalization error: {0}")]
    Normalization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Run parameter validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a transport error with the target URL as context.
    pub fn transport(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a business failure carrying the platform message.
    pub fn business(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Business {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a normalization error.
    pub fn normalization(message: impl Into<String>) -> Self {
        Self::Normalization(message.into())
    }
}
