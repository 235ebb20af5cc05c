//! Error handling for the console
//!
//! This module defines the crate-level error type. Backend failures are
//! classified once in [`crate::sdk::errors`] and carried here unchanged.

use crate::sdk::errors::{ApiError, ErrorClass};
use thiserror::Error;

/// Result type alias for the console
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Main error type for the console
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend errors
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Client-side state persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Action refused by the client-side permission gate
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl ConsoleError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Failure class, if this error came from the backend
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            ConsoleError::Api(e) => Some(e.class()),
            _ => None,
        }
    }

    /// Short message suitable for an alert
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
