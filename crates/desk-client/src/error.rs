//! Client error types.

use std::sync::Arc;

/// Errors from office desk API calls.
#[derive(Debug, thiserror::Error)]
pub enum DeskApiError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Backend returned a non-2xx status.
    #[error("API {endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },
    /// Request body could not be encoded.
    #[error("failed to encode request body for {endpoint}: {source}")]
    Serialization {
        endpoint: String,
        source: serde_json::Error,
    },
    /// The single nonce refresh this request waited on failed. Every request
    /// queued behind the same refresh carries the same shared error.
    #[error("nonce refresh failed: {0}")]
    NonceRefresh(Arc<DeskApiError>),
    /// The refresh this request waited on was cancelled before it settled.
    #[error("nonce refresh was abandoned before completing")]
    RefreshAbandoned,
    /// Request rejected locally before it was sent.
    #[error("invalid request: {0}")]
    Invalid(String),
    /// No credentials in the session.
    #[error("not authenticated: log in first")]
    NotAuthenticated,
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
    /// Persisted state could not be read or written.
    #[error("state store error: {0}")]
    Store(#[from] super::store::StoreError),
}

impl DeskApiError {
    /// HTTP status of the failure, when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            DeskApiError::ApiError { status, .. } => Some(*status),
            DeskApiError::NonceRefresh(inner) => inner.status(),
            _ => None,
        }
    }
}
