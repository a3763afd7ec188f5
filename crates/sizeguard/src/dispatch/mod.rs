//! Size-bounded dispatch between a fast, register-bounded encoder and a
//! safe, unbounded one.

mod dispatcher;
mod error;
mod route;

pub use dispatcher::DispatchSerializer;
pub use error::DispatchError;
pub use route::{Backend, EstimatedSize, Route, RouteReason};
