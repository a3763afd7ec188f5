//! sizeguard-buffers - output buffers for the sizeguard encoders.
//!
//! The [`Writer`] here models an encoder whose payload length lives in a
//! fixed-width register: the cursor can never move past [`Writer::limit`].

mod writer;

pub use writer::{CapacityExceeded, Writer, I32_REGISTER_LIMIT};
