//! Error handling
//!
//! Backend failures are turned into an [`ApiError`] exactly once, where the
//! HTTP response or transport failure is observed. Everything downstream
//! switches on [`ApiError::class`] rather than re-reading status codes.

use serde::Deserialize;
use thiserror::Error;

/// Failure of a backend call, classified where it happened
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection refused, DNS failure, reset...
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Session missing or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource does not exist or is no longer visible
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflicting state (duplicate account, ...)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Too many requests
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Backend rejected the payload
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Backend failed (5xx)
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client misconfiguration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request rejected before being sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Failure class used to decide how callers degrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Expired or missing session
    Unauthorized,
    /// The user lost access
    Forbidden,
    /// The resource no longer exists
    NotFound,
    /// Worth retrying: network blips, timeouts, overload
    Transient,
    /// Everything else
    Unknown,
}

impl ErrorClass {
    /// Whether the failure means access is definitively gone
    pub fn revokes_access(self) -> bool {
        matches!(self, ErrorClass::Forbidden | ErrorClass::NotFound)
    }
}

/// SDK result type
pub type Result<T> = std::result::Result<T, ApiError>;

/// Error body shapes returned by the backend
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<ErrorDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetails {
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Build an error from a non-success status and its raw body
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| body.trim().to_string());

        match status {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            408 => ApiError::Timeout(message),
            409 => ApiError::Conflict(message),
            422 => ApiError::Validation(message),
            429 => ApiError::RateLimited(message),
            500..=599 => ApiError::Server { status, message },
            _ => ApiError::Http { status, message },
        }
    }

    /// Classify the error
    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::Unauthorized(_) => ErrorClass::Unauthorized,
            ApiError::Forbidden(_) => ErrorClass::Forbidden,
            ApiError::NotFound(_) => ErrorClass::NotFound,
            ApiError::Network(_)
            | ApiError::Timeout(_)
            | ApiError::RateLimited(_)
            | ApiError::Server { .. } => ErrorClass::Transient,
            ApiError::Conflict(_)
            | ApiError::Validation(_)
            | ApiError::Http { .. }
            | ApiError::Parse(_)
            | ApiError::Config(_)
            | ApiError::InvalidRequest(_) => ErrorClass::Unknown,
        }
    }

    /// HTTP status, when the failure came with one
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Conflict(_) => Some(409),
            ApiError::Validation(_) => Some(422),
            ApiError::RateLimited(_) => Some(429),
            ApiError::Server { status, .. } | ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Short text for alerts and form errors
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { status: 400, message } => {
                if message.to_lowercase().contains("email") {
                    "This email address is already registered.".to_string()
                } else {
                    "Please check your information and try again.".to_string()
                }
            }
            ApiError::Conflict(_) => "An account with this email already exists.".to_string(),
            ApiError::Validation(_) => "Please verify your information and try again.".to_string(),
            ApiError::RateLimited(_) => {
                "Too many attempts. Please wait a moment and try again.".to_string()
            }
            ApiError::Server { .. } => {
                "Service temporarily unavailable. Please try again later.".to_string()
            }
            ApiError::Unauthorized(_) => "Your session has expired. Please sign in again.".to_string(),
            ApiError::Forbidden(_) => "You no longer have access to this resource.".to_string(),
            ApiError::NotFound(_) => "The requested resource was not found.".to_string(),
            ApiError::Network(_) | ApiError::Timeout(_) => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            ApiError::Http { message, .. } => {
                if !message.is_empty()
                    && message.len() < 100
                    && !message.to_lowercase().contains("error")
                {
                    message.clone()
                } else {
                    "Unable to complete the request. Please try again.".to_string()
                }
            }
            ApiError::Parse(_) | ApiError::Config(_) | ApiError::InvalidRequest(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Timeout(error.to_string())
        } else if error.is_decode() {
            ApiError::Parse(error.to_string())
        } else if let Some(status) = error.status() {
            ApiError::from_status(status.as_u16(), &error.to_string())
        } else if error.is_builder() {
            ApiError::InvalidRequest(error.to_string())
        } else {
            ApiError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Parse(error.to_string())
    }
}

fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.message.or_else(|| {
        parsed
            .error
            .and_then(|e| e.details.into_iter().find_map(|d| d.message))
    })
}
