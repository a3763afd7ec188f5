//! json-size - cycle-safe size estimation for [`Value`](sizeguard_json_pack::Value) graphs.

mod arith;
mod estimate;

pub use arith::{widen, EstimationOverflow, SizeAccumulator};
pub use estimate::{estimate, SizeEstimate, SizeEstimator, SizeModel};
