//! Formatting options shared by every encoder backend.

use serde::Deserialize;

/// Default container depth limit.
pub const DEFAULT_MAX_NESTING: usize = 100;

/// How [`Value::Opaque`](crate::Value::Opaque) values are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpaqueMode {
    /// The fallback text, as a JSON string.
    #[default]
    ToString,
    /// `null`.
    Null,
    /// Fail with [`EncodeError::UnsupportedValue`](crate::EncodeError::UnsupportedValue).
    Reject,
}

/// Caller-supplied formatting options.
///
/// Every backend accepts this one shape, so a dispatcher can hand the same
/// options to whichever backend it picks.
///
/// ```
/// use sizeguard_json_pack::{EncodeOptions, OpaqueMode};
///
/// let options: EncodeOptions = serde_json::from_str(r#"{"indent": 2}"#).unwrap();
/// assert_eq!(options.indent, 2);
/// assert_eq!(options.max_nesting, 100);
/// assert_eq!(options.opaque_mode, OpaqueMode::ToString);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Spaces per nesting level; 0 writes compact output.
    pub indent: usize,
    /// Escape every non-ASCII character as `\uXXXX`.
    pub ascii_only: bool,
    /// Maximum container depth; 0 disables the check.
    ///
    /// The encoders and [`deep_equal`](crate::deep_equal) recurse once per
    /// nesting level. With the check disabled, a deep enough value overflows
    /// the thread's stack instead of failing with
    /// [`EncodeError::NestingTooDeep`](crate::EncodeError::NestingTooDeep).
    pub max_nesting: usize,
    pub opaque_mode: OpaqueMode,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: 0,
            ascii_only: false,
            max_nesting: DEFAULT_MAX_NESTING,
            opaque_mode: OpaqueMode::default(),
        }
    }
}

impl EncodeOptions {
    pub fn pretty(indent: usize) -> Self {
        Self {
            indent,
            ..Self::default()
        }
    }

    /// Checks that entering a container at `depth` stays within `max_nesting`.
    pub fn check_depth(&self, depth: usize) -> Result<(), crate::EncodeError> {
        if self.max_nesting != 0 && depth > self.max_nesting {
            return Err(crate::EncodeError::NestingTooDeep {
                depth,
                max: self.max_nesting,
            });
        }
        Ok(())
    }
}
