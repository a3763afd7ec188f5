//! JSON backends over [`Value`](crate::Value): a register-bounded fast
//! encoder, a `serde_json` reference encoder, and a decoder.

mod decoder;
mod encoder_fast;
mod encoder_safe;
pub mod text;

pub use decoder::decode;
pub use encoder_fast::FastJsonEncoder;
pub use encoder_safe::SafeJsonEncoder;
