//! # Error Types
//!
//! Validation and formatting errors raised by `desk-core`. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level error type for `desk-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeskError {
    /// Input could not be interpreted as a phone number.
    #[error("invalid phone number {input:?}: {reason}")]
    InvalidPhone {
        /// The raw input as given by the caller.
        input: String,
        /// Why the input was rejected.
        reason: String,
    },

    /// Input could not be interpreted as a monetary amount.
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    /// Identifier was empty, zero, or not numeric.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier {
        /// Identifier namespace (e.g. `client`).
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
}
