//! Threshold policy: the largest estimate the fast backend may be handed.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::json_size::SizeEstimate;

/// Largest payload the fast backend's signed 32-bit size register holds.
/// One byte more is undefined behavior in a register-bounded encoder.
pub const FAST_REGISTER_MAX: u64 = i32::MAX as u64;

static GLOBAL: OnceLock<ThresholdPolicy> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max_fast_bytes {requested} is above the fast backend's {limit}-byte register")]
    AboveRegisterLimit { requested: u64, limit: u64 },
    #[error("invalid max_fast_bytes: {0}")]
    Parse(String),
    #[error("a process-wide threshold policy is already installed")]
    AlreadyInstalled,
}

/// Immutable routing threshold.
///
/// A payload may go to the fast backend only while its estimate is strictly
/// below `max_fast_bytes`. The value can never exceed [`FAST_REGISTER_MAX`].
///
/// ```
/// use sizeguard::ThresholdPolicy;
///
/// let policy: ThresholdPolicy = "1_048_576".parse().unwrap();
/// assert_eq!(policy.max_fast_bytes(), 1 << 20);
/// assert!(ThresholdPolicy::new(1 << 31).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPolicy", into = "RawPolicy")]
pub struct ThresholdPolicy {
    max_fast_bytes: u64,
}

impl ThresholdPolicy {
    pub const DEFAULT_MAX_FAST_BYTES: u64 = FAST_REGISTER_MAX;

    pub const DEFAULT: ThresholdPolicy = ThresholdPolicy {
        max_fast_bytes: Self::DEFAULT_MAX_FAST_BYTES,
    };

    /// Validates `max_fast_bytes` against the fast backend's register.
    pub fn new(max_fast_bytes: u64) -> Result<Self, PolicyError> {
        if max_fast_bytes > FAST_REGISTER_MAX {
            return Err(PolicyError::AboveRegisterLimit {
                requested: max_fast_bytes,
                limit: FAST_REGISTER_MAX,
            });
        }
        Ok(Self { max_fast_bytes })
    }

    pub fn max_fast_bytes(&self) -> u64 {
        self.max_fast_bytes
    }

    /// Whether a payload with this estimate may be handed to the fast backend.
    pub fn allows_fast(&self, estimate: &SizeEstimate) -> bool {
        estimate.total < self.max_fast_bytes && estimate.largest_leaf < self.max_fast_bytes
    }

    /// Installs the process-wide policy. Succeeds at most once.
    pub fn install(policy: ThresholdPolicy) -> Result<(), PolicyError> {
        GLOBAL.set(policy).map_err(|_| PolicyError::AlreadyInstalled)?;
        tracing::debug!(max_fast_bytes = policy.max_fast_bytes, "threshold policy installed");
        Ok(())
    }

    /// The installed process-wide policy, or the default.
    pub fn global() -> ThresholdPolicy {
        GLOBAL.get().copied().unwrap_or_default()
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ThresholdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "max_fast_bytes={}", self.max_fast_bytes)
    }
}

impl FromStr for ThresholdPolicy {
    type Err = PolicyError;

    /// Parses a decimal byte count; `_` separators are allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.trim().chars().filter(|&c| c != '_').collect();
        let max = digits
            .parse::<u64>()
            .map_err(|e| PolicyError::Parse(format!("{s:?}: {e}")))?;
        Self::new(max)
    }
}

/// Unvalidated wire shape of [`ThresholdPolicy`].
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPolicy {
    #[serde(default = "default_max_fast_bytes")]
    max_fast_bytes: u64,
}

fn default_max_fast_bytes() -> u64 {
    ThresholdPolicy::DEFAULT_MAX_FAST_BYTES
}

impl TryFrom<RawPolicy> for ThresholdPolicy {
    type Error = PolicyError;

    fn try_from(raw: RawPolicy) -> Result<Self, Self::Error> {
        ThresholdPolicy::new(raw.max_fast_bytes)
    }
}

impl From<ThresholdPolicy> for RawPolicy {
    fn from(policy: ThresholdPolicy) -> Self {
        RawPolicy {
            max_fast_bytes: policy.max_fast_bytes,
        }
    }
}
