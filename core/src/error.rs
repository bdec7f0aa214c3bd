//! Error types for the curlish client.
//!
//! # Design
//! Only the transport can fail a request in practice: a successful transfer
//! always carries at least one status line. `ParseError` exists for raw
//! bytes that did not come from a transport (fixtures, hand-built input).
//! Malformed header lines are tolerated by the decomposer and never surface
//! here.

use thiserror::Error;

/// Failure reported by the underlying HTTP engine: connection refused,
/// timeout, DNS or TLS failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct TransportError {
    message: String,
    code: i64,
}

impl TransportError {
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Engine-specific numeric code (a `CURLcode` for the curl transport).
    pub fn code(&self) -> i64 {
        self.code
    }
}

/// Raw response bytes that cannot be decomposed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("response contains no HTTP status line")]
    MissingStatusLine,
}

/// Rejected transport option given by name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("unknown transport option `{0}`")]
    Unknown(String),

    #[error("invalid value `{value}` for transport option `{name}`")]
    InvalidValue { name: String, value: String },
}

/// Errors returned by `Client` request methods.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed response: {0}")]
    Parse(#[from] ParseError),
}
