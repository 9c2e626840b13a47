// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with consistent messages for the front end.

use crate::store::StoreError;
use serde_json::Value;

/// Error returned by every client operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connect failure, DNS, transport timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend rejected our credentials and refresh could not recover.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A 4xx response; `message` is the server's own text when it sent one.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// A 5xx, an unexpected status, a body we could not decode, or a client
    /// that could not be set up.
    #[error("Server error: {message}")]
    Server { status: Option<u16>, message: String },

    /// Input rejected locally before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Credential store error: {0}")]
    Storage(#[from] StoreError),
}

impl ApiError {
    /// Fallback text when the server gives us nothing structured.
    pub const GENERIC_SERVER_ERROR: &'static str = "Something went wrong. Please try again.";

    /// Fallback text for a 401 with no usable body.
    pub const SESSION_EXPIRED: &'static str = "Session expired. Please log in again.";

    /// Build the error for a non-success response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = extract_message(body);

        match status {
            401 => ApiError::Authentication(
                message.unwrap_or_else(|| Self::SESSION_EXPIRED.to_string()),
            ),
            400..=499 => ApiError::Validation {
                status,
                message: message
                    .unwrap_or_else(|| format!("Request failed with status {}", status)),
            },
            _ => ApiError::Server {
                status: Some(status),
                message: message.unwrap_or_else(|| Self::GENERIC_SERVER_ERROR.to_string()),
            },
        }
    }

    /// The HTTP client itself could not be built. No request was attempted,
    /// so this is not a network failure.
    pub fn client_setup(err: impl std::fmt::Display) -> Self {
        ApiError::Server {
            status: None,
            message: format!("Failed to build HTTP client: {}", err),
        }
    }

    /// True when this error should send the user back to the login screen.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, ApiError::Authentication(_))
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authentication(_) => Some(401),
            ApiError::Validation { status, .. } => Some(*status),
            ApiError::Server { status, .. } => *status,
            _ => None,
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Handles `{"error": ..}`, `{"message": ..}`, `{"detail": ..}` and
/// serializer error maps such as `{"username": ["already exists"]}`.
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["error", "message", "detail"] {
        if let Some(text) = object.get(key).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
        }
    }

    // Field errors: first field with a non-empty list of strings
    object.iter().find_map(|(field, errors)| {
        let first = match errors {
            Value::Array(items) => items.iter().find_map(Value::as_str),
            Value::String(text) => Some(text.as_str()),
            _ => None,
        }?;
        if field == "non_field_errors" {
            Some(first.to_string())
        } else {
            Some(format!("{}: {}", field, first))
        }
    })
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;
