//! JSON decoding back into [`Value`].

use crate::{DecodeError, Value};

/// Parses JSON bytes into a fresh, acyclic [`Value`].
///
/// Object key order is kept as it appears in the input.
///
/// ```
/// use sizeguard_json_pack::json::decode;
///
/// let value = decode(br#"{"b":1,"a":[true,null]}"#).unwrap();
/// let sizeguard_json_pack::Value::Object(obj) = value else { panic!() };
/// assert_eq!(obj.snapshot()[0].0.as_str(), Some("b"));
/// ```
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    let parsed: serde_json::Value = serde_json::from_slice(bytes)?;
    Ok(Value::from(parsed))
}
