//! Error types for i18n operations

use thiserror::Error;

/// Errors that can occur while loading or resolving messages.
#[derive(Debug, Error)]
pub enum I18nError {
    /// Invalid locale string
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Failed to parse message file
    #[error("Failed to parse message file: {0}")]
    ParseError(String),

    /// Domain name is not usable as a file stem
    #[error("Invalid message domain: {0}")]
    InvalidDomain(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}
