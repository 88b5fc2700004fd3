//! Unified error types for sitecheck

use thiserror::Error;

/// Unified error type for all sitecheck operations
#[derive(Error, Debug)]
pub enum SiteCheckError {
    // Browser errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Unsupported browser engine: {0}")]
    UnsupportedEngine(String),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using SiteCheckError
pub type Result<T> = std::result::Result<T, SiteCheckError>;
