use crate::{EncodeError, EncodeOptions, Value};

/// A JSON backend: turns a [`Value`] graph into bytes, or fails as a whole.
pub trait Encoder: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    fn encode(&self, value: &Value, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError>;
}

impl<E: Encoder + ?Sized> Encoder for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn encode(&self, value: &Value, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
        (**self).encode(value, options)
    }
}

impl<E: Encoder + ?Sized> Encoder for std::sync::Arc<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn encode(&self, value: &Value, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
        (**self).encode(value, options)
    }
}
