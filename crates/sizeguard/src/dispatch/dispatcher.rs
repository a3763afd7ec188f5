use sizeguard_json_pack::json::{FastJsonEncoder, SafeJsonEncoder};
use sizeguard_json_pack::{EncodeOptions, Encoder, Value};

use super::error::DispatchError;
use super::route::{Backend, EstimatedSize, Route, RouteReason};
use crate::json_size::SizeEstimator;
use crate::policy::ThresholdPolicy;

/// Serializes through exactly one of two backends per call.
///
/// Every payload is sized first. The fast backend is only called when the
/// estimate is strictly below the policy threshold; everything else, including
/// payloads whose estimate overflowed, goes to the safe backend. Backend
/// failures are returned as they are and never retried on the other backend.
///
/// The dispatcher holds no mutable state and can be shared across threads.
///
/// ```
/// use serde_json::json;
/// use sizeguard::{Backend, DispatchSerializer, ThresholdPolicy};
/// use sizeguard_json_pack::{EncodeOptions, Value};
///
/// let dispatcher = DispatchSerializer::new(ThresholdPolicy::default());
/// let value = Value::from(json!({"html": "<div>x</div>"}));
/// assert_eq!(dispatcher.route(&value).backend, Backend::Fast);
/// let bytes = dispatcher.serialize(&value, &EncodeOptions::default()).unwrap();
/// assert_eq!(bytes, br#"{"html":"<div>x</div>"}"#);
/// ```
#[derive(Debug, Clone)]
pub struct DispatchSerializer<F = FastJsonEncoder, S = SafeJsonEncoder> {
    fast: F,
    safe: S,
    policy: ThresholdPolicy,
    estimator: SizeEstimator,
}

impl DispatchSerializer {
    /// Dispatcher over the built-in JSON backends.
    pub fn new(policy: ThresholdPolicy) -> Self {
        Self::with_backends(FastJsonEncoder::new(), SafeJsonEncoder::new(), policy)
    }
}

impl Default for DispatchSerializer {
    /// Uses the process-wide [`ThresholdPolicy::global`].
    fn default() -> Self {
        Self::new(ThresholdPolicy::global())
    }
}

impl<F: Encoder, S: Encoder> DispatchSerializer<F, S> {
    pub fn with_backends(fast: F, safe: S, policy: ThresholdPolicy) -> Self {
        Self {
            fast,
            safe,
            policy,
            estimator: SizeEstimator::new(),
        }
    }

    /// Replaces the size estimator (e.g. one with a different size model).
    pub fn with_estimator(mut self, estimator: SizeEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    pub fn fast(&self) -> &F {
        &self.fast
    }

    pub fn safe(&self) -> &S {
        &self.safe
    }

    /// Decides which backend `value` goes to under the configured policy,
    /// without encoding anything.
    pub fn route(&self, value: &Value) -> Route {
        self.route_with(value, &self.policy)
    }

    /// Decides which backend `value` goes to under `policy`.
    pub fn route_with(&self, value: &Value, policy: &ThresholdPolicy) -> Route {
        let estimate = EstimatedSize::from(self.estimator.estimate(value));
        let route = Route::decide(estimate, policy);
        tracing::debug!(
            backend = %route.backend,
            estimate = %route.estimate,
            max_fast_bytes = policy.max_fast_bytes(),
            "routing payload"
        );
        match route.reason {
            RouteReason::WithinThreshold => {}
            RouteReason::AboveThreshold => tracing::warn!(
                estimate = %route.estimate,
                max_fast_bytes = policy.max_fast_bytes(),
                "payload at or above fast threshold, using safe backend"
            ),
            RouteReason::EstimateOverflow => {
                tracing::warn!("payload size estimate overflowed, using safe backend")
            }
        }
        route
    }

    /// Serializes `value` under the configured policy.
    pub fn serialize(
        &self,
        value: &Value,
        options: &EncodeOptions,
    ) -> Result<Vec<u8>, DispatchError> {
        self.serialize_with(value, options, &self.policy)
    }

    /// Serializes `value` under an explicit `policy`.
    ///
    /// `options` reach the chosen backend unchanged.
    pub fn serialize_with(
        &self,
        value: &Value,
        options: &EncodeOptions,
        policy: &ThresholdPolicy,
    ) -> Result<Vec<u8>, DispatchError> {
        let route = self.route_with(value, policy);
        self.encode_routed(value, options, route, policy)
    }

    fn encode_routed(
        &self,
        value: &Value,
        options: &EncodeOptions,
        route: Route,
        policy: &ThresholdPolicy,
    ) -> Result<Vec<u8>, DispatchError> {
        let result = match route.backend {
            Backend::Fast => {
                guard_fast(&route, policy)?;
                self.fast.encode(value, options)
            }
            Backend::Safe => self.safe.encode(value, options),
        };
        result.map_err(|source| {
            tracing::error!(
                backend = %route.backend,
                estimate = %route.estimate,
                error = %source,
                "backend encode failed"
            );
            DispatchError::Backend {
                backend: route.backend,
                estimate: route.estimate,
                source,
            }
        })
    }
}

/// Last check before the fast backend is called: the estimate must still be
/// below `policy`, independent of how the route was produced.
fn guard_fast(route: &Route, policy: &ThresholdPolicy) -> Result<(), DispatchError> {
    let allowed = match &route.estimate {
        EstimatedSize::Bytes(estimate) => policy.allows_fast(estimate),
        EstimatedSize::Overflow => false,
    };
    if allowed {
        return Ok(());
    }
    tracing::error!(
        estimate = %route.estimate,
        max_fast_bytes = policy.max_fast_bytes(),
        "fast backend invocation prevented"
    );
    Err(DispatchError::UnsafeInvocationPrevented {
        estimate: route.estimate,
        max_fast_bytes: policy.max_fast_bytes(),
    })
}
