//! `FastJsonEncoder` - writes UTF-8 JSON straight into a register-bounded
//! [`Writer`].
//!
//! Every write goes through [`Writer::ensure_capacity`], so the payload
//! length is always checked against the register limit (a signed 32-bit
//! register by default). Callers that must never approach the limit route
//! oversized payloads elsewhere before calling in.

use std::collections::HashSet;

use sizeguard_buffers::{Writer, I32_REGISTER_LIMIT};

use super::text::{data_uri, format_float, key_text, opaque_text};
use crate::value::{Array, NodeId, Object};
use crate::{EncodeError, EncodeOptions, Encoder, Value};

const ALLOC_SIZE: usize = 64 * 1024;

/// Writer-backed JSON encoder with a fixed-width payload register.
#[derive(Debug, Clone, Copy)]
pub struct FastJsonEncoder {
    register_limit: usize,
}

impl Default for FastJsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FastJsonEncoder {
    pub fn new() -> Self {
        Self::with_register_limit(I32_REGISTER_LIMIT)
    }

    /// Narrows the size register, e.g. to exercise the limit in tests.
    pub fn with_register_limit(register_limit: usize) -> Self {
        Self { register_limit }
    }

    pub fn register_limit(&self) -> usize {
        self.register_limit
    }
}

impl Encoder for FastJsonEncoder {
    fn name(&self) -> &'static str {
        "fast"
    }

    fn encode(&self, value: &Value, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
        let mut state = EncodeState {
            writer: Writer::with_limit(ALLOC_SIZE, self.register_limit),
            options,
            active: HashSet::new(),
            depth: 0,
        };
        state.write_any(value)?;
        Ok(state.writer.flush())
    }
}

struct EncodeState<'a> {
    writer: Writer,
    options: &'a EncodeOptions,
    /// Containers currently being written.
    active: HashSet<NodeId>,
    depth: usize,
}

impl EncodeState<'_> {
    fn write_any(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Null => self.write_null(),
            Value::Bool(true) => Ok(self.writer.ascii("true")?),
            Value::Bool(false) => Ok(self.writer.ascii("false")?),
            Value::Integer(i) => Ok(self.writer.ascii(&i.to_string())?),
            Value::UInteger(u) => Ok(self.writer.ascii(&u.to_string())?),
            Value::Float(f) => {
                let text = format_float(*f)?;
                Ok(self.writer.ascii(&text)?)
            }
            Value::Str(s) => self.write_str(s),
            Value::Bytes(b) => self.write_str(&data_uri(b)),
            Value::Array(arr) => self.write_arr(arr),
            Value::Object(obj) => self.write_obj(obj),
            Value::Opaque(o) => match opaque_text(o.as_ref(), self.options.opaque_mode)? {
                Some(text) => self.write_str(&text),
                None => self.write_null(),
            },
        }
    }

    fn write_null(&mut self) -> Result<(), EncodeError> {
        Ok(self.writer.ascii("null")?)
    }

    /// Write a JSON-encoded string (with escaping).
    fn write_str(&mut self, s: &str) -> Result<(), EncodeError> {
        // Refuse up front when the raw text alone cannot fit.
        self.writer.ensure_capacity(s.len() + 2)?;
        self.writer.u8(b'"')?;
        let ascii_only = self.options.ascii_only;
        let bytes = s.as_bytes();
        let mut start = 0;
        for (i, ch) in s.char_indices() {
            let plain = ch >= ' ' && ch != '"' && ch != '\\' && (ch.is_ascii() || !ascii_only);
            if plain {
                continue;
            }
            self.writer.buf(&bytes[start..i])?;
            self.write_escape(ch)?;
            start = i + ch.len_utf8();
        }
        self.writer.buf(&bytes[start..])?;
        Ok(self.writer.u8(b'"')?)
    }

    fn write_escape(&mut self, ch: char) -> Result<(), EncodeError> {
        let short = match ch {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\u{0008}' => "\\b",
            '\u{000C}' => "\\f",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            _ => "",
        };
        if !short.is_empty() {
            return Ok(self.writer.ascii(short)?);
        }
        let mut units = [0u16; 2];
        for unit in ch.encode_utf16(&mut units) {
            self.writer.ascii(&format!("\\u{unit:04x}"))?;
        }
        Ok(())
    }

    fn enter(&mut self, id: NodeId) -> Result<(), EncodeError> {
        if !self.active.insert(id) {
            return Err(EncodeError::Cycle);
        }
        self.depth += 1;
        self.options.check_depth(self.depth)
    }

    fn leave(&mut self, id: NodeId) {
        self.active.remove(&id);
        self.depth -= 1;
    }

    /// Separator and line break before the element at `index`.
    fn write_element_prefix(&mut self, index: usize) -> Result<(), EncodeError> {
        if index > 0 {
            self.writer.u8(b',')?;
        }
        if self.options.indent > 0 {
            self.writer.u8(b'\n')?;
            self.writer.fill(b' ', self.options.indent * self.depth)?;
        }
        Ok(())
    }

    fn write_close(&mut self, close: u8) -> Result<(), EncodeError> {
        if self.options.indent > 0 {
            self.writer.u8(b'\n')?;
            self.writer.fill(b' ', self.options.indent * (self.depth - 1))?;
        }
        Ok(self.writer.u8(close)?)
    }

    fn write_arr(&mut self, arr: &Array) -> Result<(), EncodeError> {
        self.enter(arr.id())?;
        let items = arr.snapshot();
        if items.is_empty() {
            self.writer.ascii("[]")?;
        } else {
            self.writer.u8(b'[')?;
            for (i, item) in items.iter().enumerate() {
                self.write_element_prefix(i)?;
                self.write_any(item)?;
            }
            self.write_close(b']')?;
        }
        self.leave(arr.id());
        Ok(())
    }

    fn write_obj(&mut self, obj: &Object) -> Result<(), EncodeError> {
        self.enter(obj.id())?;
        let entries = obj.snapshot();
        if entries.is_empty() {
            self.writer.ascii("{}")?;
        } else {
            self.writer.u8(b'{')?;
            let key_separator = if self.options.indent > 0 { ": " } else { ":" };
            for (i, (key, val)) in entries.iter().enumerate() {
                self.write_element_prefix(i)?;
                let key = key_text(key, self.options.opaque_mode)?;
                self.write_str(&key)?;
                self.writer.ascii(key_separator)?;
                self.write_any(val)?;
            }
            self.write_close(b'}')?;
        }
        self.leave(obj.id());
        Ok(())
    }
}
