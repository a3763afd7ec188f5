//! `SafeJsonEncoder` - `serde_json`-driven encoder with no size register.
//!
//! Slower than [`FastJsonEncoder`](super::FastJsonEncoder) but correct for
//! any payload that fits in memory. Produces the same bytes as the fast
//! encoder for the same value and options.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::io;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};

use super::text::{data_uri, key_text, opaque_text};
use crate::value::NodeId;
use crate::{EncodeError, EncodeOptions, Encoder, Value};

/// Reference JSON encoder backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeJsonEncoder;

impl SafeJsonEncoder {
    pub fn new() -> Self {
        SafeJsonEncoder
    }
}

impl Encoder for SafeJsonEncoder {
    fn name(&self) -> &'static str {
        "safe"
    }

    fn encode(&self, value: &Value, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
        let ctx = Context {
            options,
            active: RefCell::new(HashSet::new()),
            depth: Cell::new(0),
            failure: RefCell::new(None),
        };
        let root = Tracked { value, ctx: &ctx };
        let mut out = Vec::new();
        let indent = vec![b' '; options.indent];
        let result = match (options.indent > 0, options.ascii_only) {
            (false, false) => run(&mut out, CompactFormatter, &root),
            (false, true) => run(&mut out, AsciiOnly(CompactFormatter), &root),
            (true, false) => run(&mut out, PrettyFormatter::with_indent(&indent), &root),
            (true, true) => run(&mut out, AsciiOnly(PrettyFormatter::with_indent(&indent)), &root),
        };
        match result {
            Ok(()) => Ok(out),
            // Typed failures raised inside `Tracked` win over serde's text.
            Err(err) => Err(ctx
                .failure
                .into_inner()
                .unwrap_or_else(|| EncodeError::Io(err.to_string()))),
        }
    }
}

fn run<F: Formatter>(
    out: &mut Vec<u8>,
    formatter: F,
    root: &Tracked<'_>,
) -> serde_json::Result<()> {
    let mut ser = serde_json::Serializer::with_formatter(out, formatter);
    root.serialize(&mut ser)
}

struct Context<'a> {
    options: &'a EncodeOptions,
    /// Containers currently being written.
    active: RefCell<HashSet<NodeId>>,
    depth: Cell<usize>,
    failure: RefCell<Option<EncodeError>>,
}

impl Context<'_> {
    fn fail<E: serde::ser::Error>(&self, err: EncodeError) -> E {
        let e = E::custom(&err);
        self.failure.replace(Some(err));
        e
    }

    fn enter(&self, id: NodeId) -> Result<Entered<'_>, EncodeError> {
        if !self.active.borrow_mut().insert(id) {
            return Err(EncodeError::Cycle);
        }
        let entered = Entered { ctx: self, id };
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        self.options.check_depth(depth)?;
        Ok(entered)
    }
}

/// Marks a container as being written until dropped.
struct Entered<'a> {
    ctx: &'a Context<'a>,
    id: NodeId,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.ctx.active.borrow_mut().remove(&self.id);
        self.ctx.depth.set(self.ctx.depth.get() - 1);
    }
}

/// A value bound to the per-call encoding context.
struct Tracked<'a> {
    value: &'a Value,
    ctx: &'a Context<'a>,
}

impl Serialize for Tracked<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ctx = self.ctx;
        let mode = ctx.options.opaque_mode;
        match self.value {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::UInteger(u) => serializer.serialize_u64(*u),
            Value::Float(f) if !f.is_finite() => {
                Err(ctx.fail(EncodeError::NonFiniteFloat(f.to_string())))
            }
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_str(&data_uri(b)),
            Value::Opaque(o) => {
                let text = opaque_text(o.as_ref(), mode).map_err(|e| ctx.fail::<S::Error>(e))?;
                match text {
                    Some(text) => serializer.serialize_str(&text),
                    None => serializer.serialize_unit(),
                }
            }
            Value::Array(arr) => {
                let _entered = ctx.enter(arr.id()).map_err(|e| ctx.fail::<S::Error>(e))?;
                let items = arr.snapshot();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    seq.serialize_element(&Tracked { value: item, ctx })?;
                }
                seq.end()
            }
            Value::Object(obj) => {
                let _entered = ctx.enter(obj.id()).map_err(|e| ctx.fail::<S::Error>(e))?;
                let entries = obj.snapshot();
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, val) in &entries {
                    let key = key_text(key, mode).map_err(|e| ctx.fail::<S::Error>(e))?;
                    map.serialize_entry(&*key, &Tracked { value: val, ctx })?;
                }
                map.end()
            }
        }
    }
}

/// Formatter adapter that escapes every non-ASCII character as `\uXXXX`.
struct AsciiOnly<F>(F);

impl<F: Formatter> Formatter for AsciiOnly<F> {
    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}
