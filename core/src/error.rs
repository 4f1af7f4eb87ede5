//! Error types for the resource access layer.
//!
//! # Design
//! `Api` is the channel for business-rule failures reported by the server
//! inside the envelope's `errors` list. It is kept apart from `Transport` and
//! `Decoding` so callers can tell "the server said no" from "we never got a
//! usable answer". `UnexpectedStatus` covers error statuses whose body carries
//! no error entries at all.

use serde::{Deserialize, Serialize};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MnoError>;

/// A structured error entry from an envelope's `errors` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Resource attribute the error refers to, for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            attribute: None,
        }
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.attribute) {
            (Some(code), Some(attr)) => write!(f, "[{code}] {attr}: {}", self.message),
            (Some(code), None) => write!(f, "[{code}] {}", self.message),
            (None, Some(attr)) => write!(f, "{attr}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

/// Failure raised by the HTTP executor.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors returned by `MnoClient` operations.
#[derive(Debug, thiserror::Error)]
pub enum MnoError {
    /// Unknown preset name or unusable preset configuration.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The HTTP executor failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response body did not match the expected envelope shape.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// The envelope carried a non-empty `errors` list.
    #[error("API error (HTTP {status}): {}", join_details(.errors))]
    Api {
        status: u16,
        errors: Vec<ErrorDetail>,
    },

    /// Error status without any error entry in the body.
    ///
    /// Treat it as an API-level failure that carries no details.
    #[error("unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request payload could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl MnoError {
    pub(crate) fn unknown_preset(name: &str) -> Self {
        MnoError::Configuration {
            message: format!("unknown preset '{name}'"),
        }
    }

    /// True when the server reported a business-rule failure.
    pub fn is_api(&self) -> bool {
        matches!(self, MnoError::Api { .. })
    }

    /// Error entries carried by an `Api` failure, empty otherwise.
    pub fn api_errors(&self) -> &[ErrorDetail] {
        match self {
            MnoError::Api { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn join_details(errors: &[ErrorDetail]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
