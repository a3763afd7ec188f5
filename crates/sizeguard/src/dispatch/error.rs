use thiserror::Error;

use sizeguard_json_pack::EncodeError;

use super::route::{Backend, EstimatedSize};

/// Failures surfaced by [`DispatchSerializer`](super::DispatchSerializer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The chosen backend failed. It is never retried on the other backend.
    #[error("{backend} backend failed (estimate: {estimate}): {source}")]
    Backend {
        backend: Backend,
        estimate: EstimatedSize,
        #[source]
        source: EncodeError,
    },
    /// The fast backend was about to be called at or above the threshold.
    /// Indicates a bug in routing, never a retryable condition.
    #[error(
        "refused to call the fast backend (estimate: {estimate}, max_fast_bytes: {max_fast_bytes})"
    )]
    UnsafeInvocationPrevented {
        estimate: EstimatedSize,
        max_fast_bytes: u64,
    },
}

impl DispatchError {
    /// Backend that failed, if one was called.
    pub fn backend(&self) -> Option<Backend> {
        match self {
            DispatchError::Backend { backend, .. } => Some(*backend),
            DispatchError::UnsafeInvocationPrevented { .. } => None,
        }
    }

    /// Estimate at decision time.
    pub fn estimate(&self) -> EstimatedSize {
        match self {
            DispatchError::Backend { estimate, .. }
            | DispatchError::UnsafeInvocationPrevented { estimate, .. } => *estimate,
        }
    }
}
