//! Error types for the Kayako client.
//!
//! This module defines `KayakoError`, the unified error type used by the
//! attribute registry, the entity lifecycle and the HTTP transport.
//!
//! The variants fall into four classes:
//!
//! - **Configuration**: a mismatch between code and schema (unregistered
//!   attribute, wrong identification state, unsupported operation, bad
//!   environment). Never retried.
//! - **Caller data**: `DuplicateCreate`, `MissingRequiredField`,
//!   `MissingIdentifier`, `ConflictingFields`. Raised before any network
//!   exchange.
//! - **Transport**: produced by a [`Transport`](crate::transport::Transport)
//!   and propagated unchanged.
//! - **Response format**: the server violated the wire contract.
//!
//! # Security
//!
//! Error messages built from server output are sanitized so the API key and
//! secret never leak. Use `sanitize_message()` when constructing messages from
//! external sources.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for all Kayako operations.
#[derive(Error, Debug)]
pub enum KayakoError {
    /// Registry misuse or invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `add` was called on an instance that already has an identifier.
    #[error("cannot add a pre-existing {entity}, use save instead (id: {id})")]
    DuplicateCreate {
        /// Entity type name.
        entity: &'static str,
        /// The identifier the instance already carries.
        id: String,
    },

    /// A field required for the requested write is unset.
    #[error("cannot {operation} {entity}: missing required field: {field}")]
    MissingRequiredField {
        /// Entity type name.
        entity: &'static str,
        /// `add` or `save`.
        operation: &'static str,
        /// Name of the missing attribute.
        field: String,
    },

    /// An identifier needed to address the remote entity is unset.
    #[error("cannot {operation} {entity}: identifier {field} has not been specified")]
    MissingIdentifier {
        /// Entity type name.
        entity: &'static str,
        /// The operation that needed the identifier.
        operation: &'static str,
        /// Name of the identifying attribute.
        field: &'static str,
    },

    /// Two mutually exclusive fields were both supplied.
    #[error("cannot {operation} {entity}: {first} and {second} are mutually exclusive")]
    ConflictingFields {
        /// Entity type name.
        entity: &'static str,
        /// The operation being validated.
        operation: &'static str,
        /// First conflicting attribute.
        first: &'static str,
        /// Second conflicting attribute.
        second: &'static str,
    },

    /// A response value did not match the attribute's declared wire type.
    #[error("malformed response value for {field}: {raw:?} ({reason})")]
    ResponseFormat {
        /// Attribute being hydrated.
        field: String,
        /// Raw text received from the server.
        raw: String,
        /// Why the text was rejected.
        reason: String,
    },

    /// The response body was not a well-formed XML document.
    #[error("malformed XML response: {0}")]
    Xml(String),

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, sanitized and truncated.
        body: String,
    },

    /// Request timed out.
    #[error("request timed out after {duration:?} - the server may be slow or unreachable")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// Rate limited by the server (HTTP 429).
    #[error("rate limited by server - please wait before retrying")]
    RateLimited {
        /// Suggested retry delay, if provided by server.
        retry_after: Option<Duration>,
    },

    /// Server temporarily unavailable (HTTP 502/503/504).
    #[error("service temporarily unavailable ({status})")]
    ServiceUnavailable {
        /// The specific status code.
        status: reqwest::StatusCode,
    },

    /// The addressed resource does not exist (HTTP 404).
    #[error("resource not found: {path}")]
    NotFound {
        /// The API path that was requested.
        path: String,
    },

    /// Authentication failed - likely an invalid API key or signature.
    #[error("authentication failed - check KAYAKO_API_KEY and KAYAKO_SECRET_KEY")]
    Authentication,

    /// Connection test failed.
    #[error("connection test failed: {message}")]
    ConnectionTest {
        /// Details about why the connection test failed.
        message: String,
    },
}

impl KayakoError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        KayakoError::Configuration(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        KayakoError::Configuration(message.into())
    }

    /// Creates the error for an attribute name the entity does not register.
    pub fn unknown_attribute(entity: &str, name: &str) -> Self {
        KayakoError::Configuration(format!("{} has no attribute named {:?}", entity, name))
    }

    /// Creates a missing required field error.
    pub fn missing_required(
        entity: &'static str,
        operation: &'static str,
        field: impl Into<String>,
    ) -> Self {
        KayakoError::MissingRequiredField {
            entity,
            operation,
            field: field.into(),
        }
    }

    /// Creates a missing identifier error.
    pub fn missing_identifier(
        entity: &'static str,
        operation: &'static str,
        field: &'static str,
    ) -> Self {
        KayakoError::MissingIdentifier {
            entity,
            operation,
            field,
        }
    }

    /// Creates a response format error for a value that failed coercion.
    pub fn response_format(
        field: impl Into<String>,
        raw: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        KayakoError::ResponseFormat {
            field: field.into(),
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Creates a not found error for an API path.
    pub fn not_found(path: impl Into<String>) -> Self {
        KayakoError::NotFound { path: path.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        KayakoError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Creates a connection test error.
    pub fn connection_test(message: impl Into<String>) -> Self {
        KayakoError::ConnectionTest {
            message: message.into(),
        }
    }

    /// Returns true if the transport reported that the resource does not exist.
    ///
    /// Single fetches turn this class of error into an absent result.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            KayakoError::NotFound { .. } => true,
            KayakoError::HttpStatus { status, .. } => *status == reqwest::StatusCode::NOT_FOUND,
            _ => false,
        }
    }

    /// Returns true if this error is transient and the exchange could be retried.
    ///
    /// Only the HTTP transport consults this; the entity lifecycle never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            KayakoError::RateLimited { .. } => true,
            KayakoError::ServiceUnavailable { .. } => true,
            KayakoError::Timeout { .. } => true,
            KayakoError::Http(e) => e.is_timeout() || e.is_connect(),
            KayakoError::HttpStatus { status, .. } => {
                status.as_u16() == 429 || status.is_server_error()
            }
            _ => false,
        }
    }

    /// Returns true if the request timed out. The server may still have
    /// processed it.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            KayakoError::Timeout { .. } => true,
            KayakoError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns true if this is a rate limit error, indicating we should back off.
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, KayakoError::RateLimited { .. })
            || matches!(self, KayakoError::HttpStatus { status, .. } if status.as_u16() == 429)
    }

    /// Returns the suggested delay before retry, if any.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            KayakoError::RateLimited { retry_after } => *retry_after,
            KayakoError::ServiceUnavailable { .. } => Some(Duration::from_millis(500)),
            KayakoError::Timeout { .. } => Some(Duration::from_millis(100)),
            _ => None,
        }
    }

    /// Replaces every occurrence of each secret in `message` with `[REDACTED]`.
    ///
    /// Empty secrets are ignored.
    #[must_use]
    pub fn sanitize_message(message: &str, secrets: &[&str]) -> String {
        secrets
            .iter()
            .filter(|secret| !secret.is_empty())
            .fold(message.to_string(), |acc, secret| {
                acc.replace(secret, "[REDACTED]")
            })
    }

    /// Creates a sanitized version of this error's display message.
    #[must_use]
    pub fn sanitized_display(&self, secrets: &[&str]) -> String {
        Self::sanitize_message(&self.to_string(), secrets)
    }
}
