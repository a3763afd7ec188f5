//! Value graph and JSON backends for sizeguard.
//!
//! - [`Value`]: the graph being serialized. Arrays, objects and opaque values
//!   are shared handles, so graphs may share children or contain cycles.
//! - [`Encoder`]: the uniform backend contract, `encode(value, options) -> bytes`.
//! - [`json`]: the two concrete JSON backends and a decoder.

mod encoder;
mod equal;
mod error;
mod options;
mod value;

pub mod json;

pub use encoder::Encoder;
pub use equal::deep_equal;
pub use error::{DecodeError, EncodeError};
pub use options::{EncodeOptions, OpaqueMode, DEFAULT_MAX_NESTING};
pub use value::{Array, DisplayOpaque, NodeId, Object, Opaque, Value};
