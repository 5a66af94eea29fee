//! Error formatting utilities
//!
//! Renders errors for `ErrorResponse` bodies and structured logs.

use crate::Error;
use std::error::Error as StdError;

/// Format error for display, appending nested causes
pub fn format_error(error: &Error) -> String {
    let formatted = match error {
        Error::NotFound { what, subject } => match subject {
            Some(subject) => format!("No {} found for '{}'", what, subject),
            None => format!("No {} found", what),
        },

        Error::UpstreamUnavailable {
            service,
            message,
            status,
        } => match status {
            Some(code) => format!("{} returned HTTP {}: {}", service, code, message),
            None => format!("{} unavailable: {}", service, message),
        },

        Error::Timeout {
            operation,
            duration_secs,
        } => {
            format!(
                "Operation '{}' timed out after {} seconds",
                operation, duration_secs
            )
        }

        Error::Validation {
            field,
            message,
            value,
        } => match value {
            Some(val) => format!(
                "Validation failed for {} (value: '{}'): {}",
                field, val, message
            ),
            None => format!("Validation failed for {}: {}", field, message),
        },

        // For standard errors, use their Display implementation
        _ => error.to_string(),
    };

    let mut result = formatted;
    let mut source = error.source();

    while let Some(cause) = source {
        if !result.contains(&cause.to_string()) {
            result = format!("{} (caused by {})", result, cause);
        }
        source = cause.source();
    }

    result
}

/// Format error for logging with structured data
pub fn format_error_for_logging(error: &Error) -> serde_json::Value {
    let mut log_data = serde_json::json!({
        "message": format_error(error),
        "category": error.category(),
        "retryable": error.is_retryable(),
    });

    match error {
        Error::UpstreamUnavailable {
            service,
            status: Some(code),
            ..
        } => {
            log_data["service"] = serde_json::Value::String(service.clone());
            log_data["upstream_status"] = serde_json::Value::Number((*code).into());
        }
        Error::Timeout { duration_secs, .. } => {
            log_data["timeout_duration"] = serde_json::Value::Number((*duration_secs).into());
        }
        _ => {}
    }

    log_data
}
