//! Error types for encoding and decoding.

use thiserror::Error;

use sizeguard_buffers::CapacityExceeded;

/// Errors an [`Encoder`](crate::Encoder) can report.
///
/// Encoding is all-or-nothing: whenever one of these is returned, no output
/// was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Containers nested deeper than `EncodeOptions::max_nesting`.
    #[error("nesting of {depth} is too deep (max {max})")]
    NestingTooDeep { depth: usize, max: usize },
    /// A container reachable from itself.
    #[error("circular reference detected")]
    Cycle,
    /// NaN or infinity has no JSON representation.
    #[error("{0} is not allowed in JSON")]
    NonFiniteFloat(String),
    /// Mapping key that cannot be written as a JSON object key.
    #[error("{kind} cannot be used as an object key")]
    UnsupportedKey { kind: &'static str },
    /// Value rejected by the configured options.
    #[error("{kind} is not a JSON value")]
    UnsupportedValue { kind: String },
    /// The payload outgrew the backend's size register.
    #[error("output exceeds the {limit}-byte size register")]
    CapacityExceeded { limit: usize },
    #[error("i/o failure: {0}")]
    Io(String),
}

impl From<CapacityExceeded> for EncodeError {
    fn from(err: CapacityExceeded) -> Self {
        EncodeError::CapacityExceeded { limit: err.limit }
    }
}

/// Errors from [`decode`](crate::json::decode).
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
