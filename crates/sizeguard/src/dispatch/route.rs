//! Routing decisions.

use std::fmt;

use crate::json_size::{EstimationOverflow, SizeEstimate};
use crate::policy::ThresholdPolicy;

/// Which encoder a payload is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Register-bounded encoder; only below the threshold.
    Fast,
    /// Unbounded reference encoder.
    Safe,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Fast => "fast",
            Backend::Safe => "safe",
        })
    }
}

/// The size estimate a decision was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatedSize {
    Bytes(SizeEstimate),
    /// The estimate did not fit in a `u64`.
    Overflow,
}

impl EstimatedSize {
    /// Estimated total, if the estimate completed.
    pub fn total(&self) -> Option<u64> {
        match self {
            EstimatedSize::Bytes(estimate) => Some(estimate.total),
            EstimatedSize::Overflow => None,
        }
    }
}

impl From<Result<SizeEstimate, EstimationOverflow>> for EstimatedSize {
    fn from(result: Result<SizeEstimate, EstimationOverflow>) -> Self {
        match result {
            Ok(estimate) => EstimatedSize::Bytes(estimate),
            Err(_) => EstimatedSize::Overflow,
        }
    }
}

impl fmt::Display for EstimatedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatedSize::Bytes(estimate) => write!(f, "{} bytes", estimate.total),
            EstimatedSize::Overflow => f.write_str("overflow"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteReason {
    WithinThreshold,
    AboveThreshold,
    EstimateOverflow,
}

/// A backend choice together with the estimate it was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub backend: Backend,
    pub estimate: EstimatedSize,
    pub reason: RouteReason,
}

impl Route {
    /// Applies `policy` to an estimate.
    pub fn decide(estimate: EstimatedSize, policy: &ThresholdPolicy) -> Route {
        let (backend, reason) = match &estimate {
            EstimatedSize::Overflow => (Backend::Safe, RouteReason::EstimateOverflow),
            EstimatedSize::Bytes(e) if policy.allows_fast(e) => {
                (Backend::Fast, RouteReason::WithinThreshold)
            }
            EstimatedSize::Bytes(_) => (Backend::Safe, RouteReason::AboveThreshold),
        };
        Route {
            backend,
            estimate,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(total: u64) -> EstimatedSize {
        EstimatedSize::Bytes(SizeEstimate {
            total,
            largest_leaf: total,
            composites: 0,
        })
    }

    #[test]
    fn overflow_always_routes_safe() {
        let policy = ThresholdPolicy::default();
        let route = Route::decide(EstimatedSize::Overflow, &policy);
        assert_eq!(route.backend, Backend::Safe);
        assert_eq!(route.reason, RouteReason::EstimateOverflow);
    }

    #[test]
    fn boundary() {
        let policy = ThresholdPolicy::new(10).unwrap();
        assert_eq!(Route::decide(bytes(9), &policy).backend, Backend::Fast);
        let at = Route::decide(bytes(10), &policy);
        assert_eq!(at.backend, Backend::Safe);
        assert_eq!(at.reason, RouteReason::AboveThreshold);
    }

    #[test]
    fn display() {
        assert_eq!(Backend::Fast.to_string(), "fast");
        assert_eq!(bytes(12).to_string(), "12 bytes");
        assert_eq!(EstimatedSize::Overflow.to_string(), "overflow");
        assert_eq!(EstimatedSize::Overflow.total(), None);
    }
}
