//! Error classification for the gateway
//!
//! Every upstream call returns one of these kinds. Absence of a result is an
//! `Err` carrying its reason, never a sentinel value.

use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing matched: empty search, unknown video id, missing format
    #[error("Not found: {what}")]
    NotFound {
        /// What was looked up
        what: String,
        /// The query, URL or id the caller supplied
        subject: Option<String>,
    },

    /// CDN, search or extraction endpoint failed or answered unusably
    #[error("Upstream {service} unavailable: {message}")]
    UpstreamUnavailable {
        /// Which collaborator failed (cdn, search, direct)
        service: String,
        /// Error message describing the failure
        message: String,
        /// HTTP status returned by the upstream, if any
        status: Option<u16>,
    },

    /// Envelope could not be decoded, decrypted or parsed
    #[error("Decryption failed: {reason}")]
    Decryption {
        /// The reason why decryption failed
        reason: String,
    },

    /// Every quality resolution attempt came back empty
    #[error("No download links available for {video_id}")]
    NoLinksAvailable {
        /// Video that was resolved
        video_id: String,
    },

    /// Configuration errors
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },

    /// Timeout errors
    #[error("Operation timed out after {duration_secs} seconds: {operation}")]
    Timeout {
        /// The operation that timed out
        operation: String,
        /// Duration in seconds before timing out
        duration_secs: u64,
    },

    /// Validation errors
    #[error("Validation failed for {field}: {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Error message describing the validation failure
        message: String,
        /// The invalid value that caused the validation to fail
        value: Option<String>,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal issue
        message: String,
        /// Additional context about where the error occurred
        context: Option<String>,
    },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a not-found error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound {
            what: what.into(),
            subject: None,
        }
    }

    /// Create a not-found error that echoes the caller's input
    pub fn not_found_for<S: Into<String>>(what: S, subject: S) -> Self {
        Self::NotFound {
            what: what.into(),
            subject: Some(subject.into()),
        }
    }

    /// Create an upstream failure without a status code
    pub fn upstream<S: Into<String>>(service: S, message: S) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create an upstream failure from a non-success HTTP status
    pub fn upstream_status<S: Into<String>>(service: S, status: u16) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: format!("unexpected status {}", status),
            status: Some(status),
        }
    }

    /// Create a decryption error
    pub fn decryption<S: Into<String>>(reason: S) -> Self {
        Self::Decryption {
            reason: reason.into(),
        }
    }

    /// Create a no-links error
    pub fn no_links<S: Into<String>>(video_id: S) -> Self {
        Self::NoLinksAvailable {
            video_id: video_id.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(field: S, message: S) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, duration_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration_secs,
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    /// Create a validation error carrying the rejected value
    pub fn validation_with_value<S: Into<String>>(field: S, message: S, value: S) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
            value: Some(value.into()),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Convert a transport error from `reqwest` into the upstream kind for `service`
    ///
    /// Timeouts stay distinguishable so logs can tell a slow CDN from a dead one.
    pub fn from_transport(service: &str, err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::timeout(service.to_string(), timeout_secs)
        } else if let Some(status) = err.status() {
            Self::upstream_status(service.to_string(), status.as_u16())
        } else {
            Self::upstream(service.to_string(), err.to_string())
        }
    }

    /// Whether trying a different upstream or host could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::Timeout { .. } => true,
            Error::UpstreamUnavailable { status, .. } => {
                !matches!(status, Some(code) if (400..500).contains(code))
            }
            _ => false,
        }
    }

    /// Stable category name used in API error bodies and logs
    pub fn category(&self) -> &'static str {
        match self {
            Error::Http(_) => "http",
            Error::Json(_) => "json",
            Error::Toml(_) => "toml",
            Error::Url(_) => "url",
            Error::Io(_) => "io",
            Error::NotFound { .. } => "not_found",
            Error::UpstreamUnavailable { .. } => "upstream_unavailable",
            Error::Decryption { .. } => "decryption",
            Error::NoLinksAvailable { .. } => "no_links_available",
            Error::Config { .. } => "config",
            Error::Timeout { .. } => "timeout",
            Error::Validation { .. } => "validation",
            Error::Internal { .. } => "internal",
        }
    }

    /// HTTP status used by the strict `/api/*` routes
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } | Error::NoLinksAvailable { .. } => StatusCode::NOT_FOUND,
            Error::UpstreamUnavailable { .. }
            | Error::Decryption { .. }
            | Error::Timeout { .. }
            | Error::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
