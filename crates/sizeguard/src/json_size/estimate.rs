use std::collections::HashSet;

use sizeguard_json_pack::json::text::BIN_URI_PREFIX;
use sizeguard_json_pack::{NodeId, Value};

use super::arith::{widen, EstimationOverflow, SizeAccumulator};

/// Per-kind sizing constants used by [`SizeEstimator`].
///
/// The defaults bound the compact output of the JSON encoders from above:
/// every scalar fits in [`SizeModel::scalar`] (a finite `f64` prints in at most
/// 24 bytes), strings pay for their quotes, and byte sequences are sized as
/// the quoted base64 data URI they are written as.
///
/// Two things are not covered. Escapes (`\n`, `\u0001`, and non-ASCII text
/// under `ascii_only`) can grow a string up to six times its byte length, and
/// indentation adds whitespace per line. Payloads near the threshold that rely
/// on either are caught by the fast encoder's own register check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeModel {
    /// Null, booleans and numbers.
    pub scalar: u64,
    /// Quotes around a string, byte sequence or opaque fallback.
    pub string: u64,
    /// Brackets of a sequence.
    pub array: u64,
    /// Separator per sequence element.
    pub array_element: u64,
    /// Braces of a mapping.
    pub object: u64,
    /// Separators per mapping entry, plus quotes for a non-string scalar key.
    pub object_entry: u64,
}

impl SizeModel {
    pub const DEFAULT: SizeModel = SizeModel {
        scalar: 24,
        string: 2,
        array: 2,
        array_element: 1,
        object: 2,
        object_entry: 1 + 1 + 2,
    };

    /// Byte length of a string leaf of `len` bytes.
    fn quoted(&self, len: u64) -> Option<u64> {
        len.checked_add(self.string)
    }

    /// Byte length of `len` raw bytes written as a quoted data URI.
    fn data_uri(&self, len: u64) -> Option<u64> {
        len.div_ceil(3)
            .checked_mul(4)?
            .checked_add(widen(BIN_URI_PREFIX.len()))
            .and_then(|uri| self.quoted(uri))
    }
}

impl Default for SizeModel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Result of a completed estimation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeEstimate {
    /// Estimated encoded size in bytes.
    pub total: u64,
    /// Largest single encoded string, byte sequence or opaque fallback seen.
    pub largest_leaf: u64,
    /// Distinct arrays, mappings and opaque values visited.
    pub composites: u64,
}

/// Walks a [`Value`] graph and estimates the bytes an encoder would need.
///
/// Each array, mapping and opaque value is counted once, the first time it
/// is reached; later references to it (shared children, cycles) add nothing
/// beyond the parent's per-element overhead. Strings and byte sequences are
/// leaves and are counted at every occurrence, so `total >= largest_leaf`.
///
/// For values without shared children the total is at least the length of
/// the compact encoding, up to the escapes noted on [`SizeModel`]. Encoders
/// write a shared child once per reference, so sharing is under-counted.
///
/// The walk uses an explicit stack, so depth is not limited by the call stack.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sizeguard::json_size::SizeEstimator;
/// use sizeguard_json_pack::Value;
///
/// let value = Value::from(json!({"a": "xyz", "b": []}));
/// let estimate = SizeEstimator::new().estimate(&value).unwrap();
/// // braces 2, two entries at 4, quoted keys 3 + 3, "xyz" 5, [] 2
/// assert_eq!(estimate.total, 23);
/// assert!(estimate.total >= br#"{"a":"xyz","b":[]}"#.len() as u64);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeEstimator {
    model: SizeModel,
}

impl SizeEstimator {
    pub const fn new() -> Self {
        Self {
            model: SizeModel::DEFAULT,
        }
    }

    pub const fn with_model(model: SizeModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &SizeModel {
        &self.model
    }

    /// Estimates the encoded size of `root`.
    ///
    /// Stops at the first addition that would overflow `u64`.
    pub fn estimate(&self, root: &Value) -> Result<SizeEstimate, EstimationOverflow> {
        self.walk(root).inspect_err(|overflow| {
            tracing::debug!(counted = overflow.counted, "size estimate overflowed");
        })
    }

    fn walk(&self, root: &Value) -> Result<SizeEstimate, EstimationOverflow> {
        let model = &self.model;
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut acc = SizeAccumulator::new();
        let mut largest_leaf = 0u64;
        let mut composites = 0u64;
        let mut stack = vec![root.clone()];

        while let Some(value) = stack.pop() {
            if let Some(id) = value.node_id() {
                if !visited.insert(id) {
                    continue;
                }
                composites += 1;
            }
            let leaf = match &value {
                Value::Null
                | Value::Bool(_)
                | Value::Integer(_)
                | Value::UInteger(_)
                | Value::Float(_) => {
                    acc.add(model.scalar)?;
                    continue;
                }
                Value::Str(s) => model.quoted(widen(s.len())),
                Value::Bytes(b) => model.data_uri(widen(b.len())),
                // `null` under `OpaqueMode::Null`.
                Value::Opaque(o) => model.quoted(o.fallback_len()).map(|len| len.max(4)),
                Value::Array(arr) => {
                    let items = arr.snapshot();
                    acc.add(model.array)?;
                    acc.add_many(widen(items.len()), model.array_element)?;
                    // Reversed so elements pop in order.
                    stack.extend(items.into_iter().rev());
                    continue;
                }
                Value::Object(obj) => {
                    let entries = obj.snapshot();
                    acc.add(model.object)?;
                    acc.add_many(widen(entries.len()), model.object_entry)?;
                    for (key, val) in entries.into_iter().rev() {
                        stack.push(val);
                        stack.push(key);
                    }
                    continue;
                }
            };
            let leaf = leaf.ok_or(EstimationOverflow {
                counted: acc.total(),
            })?;
            acc.add(leaf)?;
            largest_leaf = largest_leaf.max(leaf);
        }

        Ok(SizeEstimate {
            total: acc.total(),
            largest_leaf,
            composites,
        })
    }
}

/// Estimates with the default [`SizeModel`].
pub fn estimate(value: &Value) -> Result<SizeEstimate, EstimationOverflow> {
    SizeEstimator::new().estimate(value)
}
