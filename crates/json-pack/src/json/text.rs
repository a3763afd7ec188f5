//! JSON text rules both backends agree on byte for byte.

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::value::{Opaque, Value};
use crate::{EncodeError, OpaqueMode};

/// `data:application/octet-stream;base64,` prefix for byte sequences.
pub const BIN_URI_PREFIX: &str = "data:application/octet-stream;base64,";

/// Byte sequences are written as data URI strings.
pub fn data_uri(buf: &[u8]) -> String {
    let mut uri = String::with_capacity(BIN_URI_PREFIX.len() + buf.len().div_ceil(3) * 4);
    uri.push_str(BIN_URI_PREFIX);
    STANDARD.encode_string(buf, &mut uri);
    uri
}

/// Formats a float exactly as `serde_json` writes it.
pub fn format_float(f: f64) -> Result<String, EncodeError> {
    serde_json::Number::from_f64(f)
        .map(|n| n.to_string())
        .ok_or_else(|| EncodeError::NonFiniteFloat(f.to_string()))
}

/// Text of an opaque value under `mode`; `None` means write `null`.
pub fn opaque_text(opaque: &dyn Opaque, mode: OpaqueMode) -> Result<Option<String>, EncodeError> {
    match mode {
        OpaqueMode::ToString => Ok(Some(opaque.fallback())),
        OpaqueMode::Null => Ok(None),
        OpaqueMode::Reject => Err(EncodeError::UnsupportedValue {
            kind: opaque.type_name().to_owned(),
        }),
    }
}

/// Object key text for a mapping key.
///
/// Scalars use their JSON text, `null` becomes the empty string, opaque keys
/// use their fallback. Containers and byte sequences cannot be keys.
pub fn key_text(key: &Value, mode: OpaqueMode) -> Result<Cow<'_, str>, EncodeError> {
    match key {
        Value::Str(s) => Ok(Cow::Borrowed(s)),
        Value::Null => Ok(Cow::Borrowed("")),
        Value::Bool(true) => Ok(Cow::Borrowed("true")),
        Value::Bool(false) => Ok(Cow::Borrowed("false")),
        Value::Integer(i) => Ok(Cow::Owned(i.to_string())),
        Value::UInteger(u) => Ok(Cow::Owned(u.to_string())),
        Value::Float(f) => format_float(*f).map(Cow::Owned),
        Value::Opaque(o) => match mode {
            OpaqueMode::Reject => Err(EncodeError::UnsupportedValue {
                kind: o.type_name().to_owned(),
            }),
            _ => Ok(Cow::Owned(o.fallback())),
        },
        Value::Bytes(_) | Value::Array(_) | Value::Object(_) => {
            Err(EncodeError::UnsupportedKey { kind: key.kind() })
        }
    }
}
