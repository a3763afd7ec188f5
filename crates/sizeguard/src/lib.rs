//! sizeguard - size-bounded serialization dispatch.
//!
//! Some encoders track the payload length in a fixed-width register and
//! misbehave once a payload outgrows it. [`DispatchSerializer`] sizes every
//! value graph up front with [`json_size::SizeEstimator`] and hands payloads
//! at or above the [`ThresholdPolicy`] to an unbounded backend instead.
//!
//! Sub-modules:
//! - [`json_size`]: cycle-safe, overflow-checked size estimation.
//! - [`policy`]: the routing threshold and its configuration surface.
//! - [`dispatch`]: backend selection and error reporting.

pub mod dispatch;
pub mod json_size;
pub mod policy;

pub use dispatch::{Backend, DispatchError, DispatchSerializer, EstimatedSize, Route, RouteReason};
pub use json_size::{estimate, EstimationOverflow, SizeEstimate, SizeEstimator, SizeModel};
pub use policy::{PolicyError, ThresholdPolicy, FAST_REGISTER_MAX};

pub use sizeguard_json_pack::{EncodeError, EncodeOptions, Encoder, Value};
